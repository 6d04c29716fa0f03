use crate::models::{CreateProduct, Gender, ProductDetail, UpdateProduct};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text", unique)]
    pub title: String,
    pub price: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,
    pub stock: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub sizes: Json, // JSON array of size codes
    pub gender: Gender,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Pair the row with its images, which must already be sorted by id.
    pub fn into_detail(self, images: Vec<super::product_image::Model>) -> ProductDetail {
        let sizes = string_list(self.id, "sizes", self.sizes);
        let tags = string_list(self.id, "tags", self.tags);

        ProductDetail {
            id: self.id,
            title: self.title,
            price: self.price,
            description: self.description,
            slug: self.slug,
            stock: self.stock,
            sizes,
            gender: self.gender,
            tags,
            images: images.into_iter().map(Into::into).collect(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// A malformed stored value reads as an empty list.
fn string_list(product_id: Uuid, column: &str, value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(%product_id, column, error = %e, "Stored value is not a string list");
        Vec::new()
    })
}

// Expects a normalized input; images are inserted separately.
impl From<&CreateProduct> for ActiveModel {
    fn from(input: &CreateProduct) -> Self {
        let now = chrono::Utc::now();

        ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(input.title.clone()),
            price: Set(input.price.unwrap_or_default()),
            description: Set(input.description.clone()),
            slug: Set(input.effective_slug()),
            stock: Set(input.stock.unwrap_or_default()),
            sizes: Set(Json::from(input.sizes.clone())),
            gender: Set(input.gender),
            tags: Set(Json::from(input.tags.clone())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

impl ActiveModel {
    /// Mark the fields present in `input` as changed and bump `updated_at`.
    pub fn merge(&mut self, input: &UpdateProduct) {
        if let Some(ref title) = input.title {
            self.title = Set(title.clone());
        }
        if let Some(price) = input.price {
            self.price = Set(price);
        }
        if let Some(ref description) = input.description {
            self.description = Set(Some(description.clone()));
        }
        if let Some(ref slug) = input.slug {
            self.slug = Set(slug.clone());
        }
        if let Some(stock) = input.stock {
            self.stock = Set(stock);
        }
        if let Some(ref sizes) = input.sizes {
            self.sizes = Set(Json::from(sizes.clone()));
        }
        if let Some(gender) = input.gender {
            self.gender = Set(gender);
        }
        if let Some(ref tags) = input.tags {
            self.tags = Set(Json::from(tags.clone()));
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
