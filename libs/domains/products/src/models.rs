use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::slug::slugify;

/// Target audience of a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_gender")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "men")]
    Men,
    #[sea_orm(string_value = "women")]
    Women,
    #[sea_orm(string_value = "kid")]
    Kid,
    #[sea_orm(string_value = "unisex")]
    Unisex,
}

/// Image row attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub url: String,
}

/// Product with its image rows, as returned by `find_one`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    /// Ordered by image id (insertion order)
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with images flattened to their URLs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDetail> for Product {
    fn from(detail: ProductDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            price: detail.price,
            description: detail.description,
            slug: detail.slug,
            stock: detail.stock,
            sizes: detail.sizes,
            gender: detail.gender,
            tags: detail.tags,
            images: detail.images.into_iter().map(|image| image.url).collect(),
            created_at: detail.created_at,
            updated_at: detail.updated_at,
        }
    }
}

impl ProductDetail {
    /// Merge the fields present in `input`. Images are handled by the
    /// repository since replacing them needs new row ids.
    pub fn apply_update(&mut self, input: &UpdateProduct) {
        if let Some(ref title) = input.title {
            self.title = title.clone();
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if let Some(ref description) = input.description {
            self.description = Some(description.clone());
        }
        if let Some(ref slug) = input.slug {
            self.slug = slug.clone();
        }
        if let Some(stock) = input.stock {
            self.stock = stock;
        }
        if let Some(ref sizes) = input.sizes {
            self.sizes = sizes.clone();
        }
        if let Some(gender) = input.gender {
            self.gender = gender;
        }
        if let Some(ref tags) = input.tags {
            self.tags = tags.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Defaults to 0
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    pub description: Option<String>,

    /// Derived from the title when omitted
    pub slug: Option<String>,

    /// Defaults to 0
    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    pub sizes: Vec<String>,

    pub gender: Gender,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Image URLs, stored in the given order
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateProduct {
    /// Resolve the slug (seeding it from the title when none was given) and
    /// drop repeated sizes and tags.
    pub fn normalize(mut self) -> ProductResult<Self> {
        let source = self
            .slug
            .as_deref()
            .filter(|slug| !slug.trim().is_empty())
            .unwrap_or(&self.title);

        self.slug = Some(normalized_slug(source)?);
        self.sizes = dedup_preserving_order(self.sizes);
        self.tags = dedup_preserving_order(self.tags);
        Ok(self)
    }

    /// The slug to persist; already final after [`normalize`](Self::normalize).
    pub fn effective_slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.title))
    }
}

/// DTO for partially updating a product
///
/// `images`, when present, replaces every image of the product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    pub description: Option<String>,

    pub slug: Option<String>,

    #[validate(range(min = 0))]
    pub stock: Option<i32>,

    pub sizes: Option<Vec<String>>,

    pub gender: Option<Gender>,

    pub tags: Option<Vec<String>>,

    pub images: Option<Vec<String>>,
}

impl UpdateProduct {
    pub fn normalize(mut self) -> ProductResult<Self> {
        if let Some(slug) = self.slug.take() {
            self.slug = Some(normalized_slug(&slug)?);
        }
        self.sizes = self.sizes.map(dedup_preserving_order);
        self.tags = self.tags.map(dedup_preserving_order);
        Ok(self)
    }
}

fn normalized_slug(raw: &str) -> ProductResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(ProductError::BadInput(format!(
            "'{}' does not produce a valid slug",
            raw
        )));
    }
    Ok(slug)
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Postgres binds `OFFSET`/`LIMIT` as `bigint`.
const MAX_PAGINATION_VALUE: u64 = i64::MAX as u64;

/// Offset pagination for the product list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Rows to skip (default 0)
    #[validate(range(max = MAX_PAGINATION_VALUE))]
    pub offset: Option<u64>,

    /// Page size (default 10)
    #[validate(range(min = 1, max = MAX_PAGINATION_VALUE))]
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// Confirmation returned after a product is removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn for_product(id: Uuid) -> Self {
        Self {
            message: format!("Product {} deleted successfully", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(title: &str) -> CreateProduct {
        CreateProduct {
            title: title.to_string(),
            price: None,
            description: None,
            slug: None,
            stock: None,
            sizes: vec!["M".to_string()],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_gender_wire_format() {
        assert_eq!(serde_json::to_string(&Gender::Kid).unwrap(), "\"kid\"");
        assert_eq!("women".parse::<Gender>().unwrap(), Gender::Women);
        assert!(serde_json::from_str::<Gender>("\"other\"").is_err());
    }

    #[test]
    fn test_create_normalize_seeds_slug_from_title() {
        let input = create_input("Men's Chill Crew Neck Sweatshirt")
            .normalize()
            .unwrap();
        assert_eq!(input.slug.as_deref(), Some("mens_chill_crew_neck_sweatshirt"));
    }

    #[test]
    fn test_create_normalize_blank_slug_falls_back_to_title() {
        let mut input = create_input("Blue Shirt");
        input.slug = Some("   ".to_string());
        assert_eq!(input.normalize().unwrap().slug.as_deref(), Some("blue_shirt"));
    }

    #[test]
    fn test_create_normalize_explicit_slug() {
        let mut input = create_input("Blue Shirt");
        input.slug = Some("Summer Édition".to_string());
        let input = input.normalize().unwrap();
        assert_eq!(input.slug.as_deref(), Some("summer_edition"));
        assert_eq!(input.effective_slug(), "summer_edition");
    }

    #[test]
    fn test_create_normalize_rejects_empty_slug() {
        let result = create_input("!!!").normalize();
        assert!(matches!(result, Err(ProductError::BadInput(_))));
    }

    #[test]
    fn test_normalize_dedups_sizes_and_tags() {
        let mut input = create_input("Hoodie");
        input.sizes = vec!["S".into(), "M".into(), "S".into(), "XL".into()];
        input.tags = vec!["hoodie".into(), "winter".into(), "hoodie".into()];

        let input = input.normalize().unwrap();
        assert_eq!(input.sizes, vec!["S", "M", "XL"]);
        assert_eq!(input.tags, vec!["hoodie", "winter"]);
    }

    #[test]
    fn test_update_normalize_only_touches_given_slug() {
        let untouched = UpdateProduct::default().normalize().unwrap();
        assert!(untouched.slug.is_none());

        let update = UpdateProduct {
            slug: Some("New Slug".to_string()),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(update.slug.as_deref(), Some("new_slug"));
    }

    #[test]
    fn test_create_validation() {
        let mut input = create_input("");
        assert!(input.validate().is_err());

        input.title = "Valid".to_string();
        input.price = Some(-1.0);
        assert!(input.validate().is_err());

        input.price = Some(10.0);
        input.stock = Some(-5);
        assert!(input.validate().is_err());

        input.stock = Some(5);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_deserialize_defaults() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "title": "Plain Tee",
            "sizes": ["S"],
            "gender": "men"
        }))
        .unwrap();

        assert!(input.tags.is_empty());
        assert!(input.images.is_empty());
        assert!(input.price.is_none());
    }

    #[test]
    fn test_pagination_defaults_and_validation() {
        let query = PaginationQuery::default();
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), PaginationQuery::DEFAULT_LIMIT);
        assert!(query.validate().is_ok());

        assert!(PaginationQuery::new(0, 0).validate().is_err());
        assert!(PaginationQuery::new(5, 2).validate().is_ok());
    }

    #[test]
    fn test_pagination_rejects_values_beyond_bigint() {
        let max = i64::MAX as u64;
        assert!(PaginationQuery::new(max, max).validate().is_ok());
        assert!(PaginationQuery::new(0, max + 1).validate().is_err());
        assert!(PaginationQuery::new(max + 1, 10).validate().is_err());
    }

    #[test]
    fn test_product_from_detail_flattens_images() {
        let now = Utc::now();
        let detail = ProductDetail {
            id: Uuid::now_v7(),
            title: "Blue Shirt".into(),
            price: 0.0,
            description: None,
            slug: "blue_shirt".into(),
            stock: 0,
            sizes: vec![],
            gender: Gender::Men,
            tags: vec![],
            images: vec![
                ProductImage {
                    id: 1,
                    url: "a.jpg".into(),
                },
                ProductImage {
                    id: 2,
                    url: "b.jpg".into(),
                },
            ],
            created_at: now,
            updated_at: now,
        };

        let product = Product::from(detail);
        assert_eq!(product.images, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_delete_response_message() {
        let id = Uuid::nil();
        assert_eq!(
            DeleteResponse::for_product(id).message,
            "Product 00000000-0000-0000-0000-000000000000 deleted successfully"
        );
    }
}
