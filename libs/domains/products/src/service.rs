use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, DeleteResponse, PaginationQuery, Product, ProductDetail, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product and its images
    #[instrument(skip(self, input), fields(product_title = %input.title))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::BadInput(e.to_string()))?;
        let input = input.normalize()?;

        let product = self.repository.create(input).await?;
        Ok(product.into())
    }

    /// List one page of products
    #[instrument(skip(self))]
    pub async fn list_products(&self, pagination: PaginationQuery) -> ProductResult<Vec<Product>> {
        pagination
            .validate()
            .map_err(|e| ProductError::BadInput(e.to_string()))?;

        let products = self
            .repository
            .list(pagination.offset(), pagination.limit())
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    /// Find a product by id, title or slug, with its image rows
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> ProductResult<ProductDetail> {
        self.repository
            .find_by_term(term)
            .await?
            .ok_or_else(|| ProductError::NotFound(term.to_string()))
    }

    /// [`find_one`](Self::find_one) with images as URLs
    #[instrument(skip(self))]
    pub async fn find_one_plain(&self, term: &str) -> ProductResult<Product> {
        self.find_one(term).await.map(Product::from)
    }

    /// Update a product, replacing its images when `input.images` is given
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::BadInput(e.to_string()))?;
        let input = input.normalize()?;

        let product = self.repository.update(id, input).await?;
        Ok(product.into())
    }

    /// Delete a product and, through the cascade, its images
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: Uuid) -> ProductResult<DeleteResponse> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(ProductError::NotFound(id.to_string()));
        }

        Ok(DeleteResponse::for_product(id))
    }
}
