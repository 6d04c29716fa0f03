use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, ProductDetail, ProductImage, UpdateProduct};

/// Repository trait for Product persistence
///
/// Every method returns products with their image rows; flattening images to
/// URLs is left to the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a normalized product together with its images
    async fn create(&self, input: CreateProduct) -> ProductResult<ProductDetail>;

    /// One page ordered by creation time, then id
    async fn list(&self, offset: u64, limit: u64) -> ProductResult<Vec<ProductDetail>>;

    /// Look up by id when `term` is a UUID, otherwise by case-insensitive
    /// title or exact (lowercased) slug
    async fn find_by_term(&self, term: &str) -> ProductResult<Option<ProductDetail>>;

    /// Merge `input` into the product and, when `input.images` is set, replace
    /// all of its images. Either everything is applied or nothing is.
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductDetail>;

    /// Delete a product and its images; `false` when no such product exists
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;
}

#[derive(Debug, Default)]
struct Catalog {
    products: HashMap<Uuid, ProductDetail>,
    next_image_id: i32,
}

impl Catalog {
    /// Mirrors the unique indexes on `title` and `slug`.
    fn find_conflict(&self, title: &str, slug: &str, except: Option<Uuid>) -> Option<String> {
        self.products
            .values()
            .filter(|p| Some(p.id) != except)
            .find_map(|p| {
                if p.title == title {
                    Some(format!("Key (title)=({}) already exists.", title))
                } else if p.slug == slug {
                    Some(format!("Key (slug)=({}) already exists.", slug))
                } else {
                    None
                }
            })
    }

    fn new_images(&mut self, urls: Vec<String>) -> Vec<ProductImage> {
        urls.into_iter()
            .map(|url| {
                self.next_image_id += 1;
                ProductImage {
                    id: self.next_image_id,
                    url,
                }
            })
            .collect()
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<ProductDetail> {
        let mut catalog = self.catalog.write().await;

        let slug = input.effective_slug();
        if let Some(detail) = catalog.find_conflict(&input.title, &slug, None) {
            return Err(ProductError::Conflict(detail));
        }

        let now = Utc::now();
        let images = catalog.new_images(input.images);
        let product = ProductDetail {
            id: Uuid::now_v7(),
            title: input.title,
            price: input.price.unwrap_or_default(),
            description: input.description,
            slug,
            stock: input.stock.unwrap_or_default(),
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images,
            created_at: now,
            updated_at: now,
        };
        catalog.products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn list(&self, offset: u64, limit: u64) -> ProductResult<Vec<ProductDetail>> {
        let catalog = self.catalog.read().await;

        let mut products: Vec<ProductDetail> = catalog.products.values().cloned().collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(products
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_by_term(&self, term: &str) -> ProductResult<Option<ProductDetail>> {
        let catalog = self.catalog.read().await;

        let found = match Uuid::parse_str(term) {
            Ok(id) => catalog.products.get(&id),
            Err(_) => {
                let title = term.to_uppercase();
                let slug = term.to_lowercase();
                catalog
                    .products
                    .values()
                    .find(|p| p.title.to_uppercase() == title || p.slug == slug)
            }
        };

        Ok(found.cloned())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductDetail> {
        let mut catalog = self.catalog.write().await;

        // Work on a copy so a rejected update leaves the stored product intact
        let mut product = catalog
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;
        product.apply_update(&input);

        if let Some(detail) = catalog.find_conflict(&product.title, &product.slug, Some(id)) {
            return Err(ProductError::Conflict(detail));
        }

        if let Some(urls) = input.images {
            product.images = catalog.new_images(urls);
        }
        catalog.products.insert(id, product.clone());

        tracing::info!(product_id = %id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut catalog = self.catalog.write().await;

        if catalog.products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn new_product(title: &str, images: &[&str]) -> CreateProduct {
        CreateProduct {
            title: title.to_string(),
            price: Some(25.0),
            description: None,
            slug: None,
            stock: Some(3),
            sizes: vec!["S".to_string(), "M".to_string()],
            gender: Gender::Women,
            tags: vec!["shirt".to_string()],
            images: images.iter().map(|s| s.to_string()).collect(),
        }
        .normalize()
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_term() {
        let repo = InMemoryProductRepository::new();
        let created = repo
            .create(new_product("Blue Shirt", &["a.jpg", "b.jpg"]))
            .await
            .unwrap();

        assert_eq!(created.slug, "blue_shirt");
        assert_eq!(created.images.len(), 2);
        assert!(created.images[0].id < created.images[1].id);

        for term in [created.id.to_string(), "BLUE SHIRT".into(), "blue_shirt".into()] {
            let found = repo.find_by_term(&term).await.unwrap();
            assert_eq!(found.map(|p| p.id), Some(created.id), "term {term}");
        }

        assert!(repo.find_by_term("red_shirt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_title_or_slug_conflicts() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("Blue Shirt", &[])).await.unwrap();

        let same_title = repo.create(new_product("Blue Shirt", &[])).await;
        assert!(matches!(same_title, Err(ProductError::Conflict(_))));

        let mut same_slug = new_product("Blue  Shirt!", &[]);
        same_slug.slug = Some("blue_shirt".to_string());
        let result = repo.create(same_slug).await;
        assert!(matches!(result, Err(ProductError::Conflict(msg)) if msg.contains("slug")));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = InMemoryProductRepository::new();
        for title in ["First", "Second", "Third"] {
            repo.create(new_product(title, &[])).await.unwrap();
        }

        let page = repo.list(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "First");

        let rest = repo.list(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].title, "Third");

        assert!(repo.list(10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_images() {
        let repo = InMemoryProductRepository::new();
        let created = repo
            .create(new_product("Hoodie", &["old-1.jpg", "old-2.jpg"]))
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateProduct {
                    stock: Some(9),
                    images: Some(vec!["new.jpg".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stock, 9);
        assert_eq!(updated.images.len(), 1);
        assert_eq!(updated.images[0].url, "new.jpg");
    }

    #[tokio::test]
    async fn test_update_without_images_keeps_them() {
        let repo = InMemoryProductRepository::new();
        let created = repo
            .create(new_product("Beanie", &["beanie.jpg"]))
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateProduct {
                    price: Some(12.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.images, created.images);
    }

    #[tokio::test]
    async fn test_failed_update_changes_nothing() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("Taken", &[])).await.unwrap();
        let target = repo
            .create(new_product("Target", &["keep.jpg"]))
            .await
            .unwrap();

        let result = repo
            .update(
                target.id,
                UpdateProduct {
                    title: Some("Taken".to_string()),
                    images: Some(vec!["replacement.jpg".to_string()]),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ProductError::Conflict(_))));

        let stored = repo
            .find_by_term(&target.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Target");
        assert_eq!(stored.images, target.images);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = InMemoryProductRepository::new();
        let result = repo.update(Uuid::now_v7(), UpdateProduct::default()).await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(new_product("Cap", &["cap.jpg"])).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_term("cap").await.unwrap().is_none());
    }
}
