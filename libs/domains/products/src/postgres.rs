use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    IntoActiveModel, ModelTrait, QueryOrder,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{product, product_image},
    error::{ProductError, ProductResult},
    models::{CreateProduct, ProductDetail, UpdateProduct},
    repository::ProductRepository,
};

/// SeaORM/PostgreSQL product storage.
///
/// Writes that touch both tables run in one explicit transaction which is
/// committed on success and rolled back before any error is classified.
pub struct PgProductRepository {
    products: BaseRepository<product::Entity>,
    images: BaseRepository<product_image::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            products: BaseRepository::new(db.clone()),
            images: BaseRepository::new(db),
        }
    }

    async fn insert_images<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
        urls: Vec<String>,
    ) -> Result<Vec<product_image::Model>, DbErr> {
        let mut inserted = Vec::with_capacity(urls.len());
        for image in product_image::new_images(product_id, urls) {
            inserted.push(self.images.insert_with(conn, image).await?);
        }
        Ok(inserted)
    }

    async fn load_images<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: &product::Model,
    ) -> Result<Vec<product_image::Model>, DbErr> {
        model
            .find_related(product_image::Entity)
            .order_by_asc(product_image::Column::Id)
            .all(conn)
            .await
    }

    async fn create_in(
        &self,
        txn: &DatabaseTransaction,
        input: CreateProduct,
    ) -> Result<ProductDetail, DbErr> {
        let active_model = product::ActiveModel::from(&input);
        let model = self.products.insert_with(txn, active_model).await?;
        let images = self.insert_images(txn, model.id, input.images).await?;
        Ok(model.into_detail(images))
    }

    /// `Ok(None)` when the product does not exist.
    async fn update_in(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
        input: UpdateProduct,
    ) -> Result<Option<ProductDetail>, DbErr> {
        let Some(model) = self.products.find_by_id_with(txn, id).await? else {
            return Ok(None);
        };

        let mut active_model = model.into_active_model();
        active_model.merge(&input);

        if input.images.is_some() {
            let removed = self
                .images
                .delete_where_with(txn, product_image::Column::ProductId, id)
                .await?;
            tracing::debug!(product_id = %id, removed, "Removed previous images");
        }

        let model = self.products.update_with(txn, active_model).await?;

        let images = match input.images {
            Some(urls) => self.insert_images(txn, id, urls).await?,
            None => self.load_images(txn, &model).await?,
        };

        Ok(Some(model.into_detail(images)))
    }
}

/// Errors are classified only after this has run.
async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "Transaction rollback failed");
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<ProductDetail> {
        let txn = self.products.begin().await?;

        match self.create_in(&txn, input).await {
            Ok(product) => {
                txn.commit().await?;
                tracing::info!(product_id = %product.id, "Created product");
                Ok(product)
            }
            Err(e) => {
                rollback(txn).await;
                Err(e.into())
            }
        }
    }

    async fn list(&self, offset: u64, limit: u64) -> ProductResult<Vec<ProductDetail>> {
        let models = self
            .products
            .find_page(
                offset,
                limit,
                &[product::Column::CreatedAt, product::Column::Id],
            )
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let images = self
            .images
            .find_where_with(
                self.images.db(),
                Condition::all().add(product_image::Column::ProductId.is_in(ids)),
                &[product_image::Column::Id],
            )
            .await?;

        let mut by_product: HashMap<Uuid, Vec<product_image::Model>> = HashMap::new();
        for image in images {
            by_product.entry(image.product_id).or_default().push(image);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let images = by_product.remove(&m.id).unwrap_or_default();
                m.into_detail(images)
            })
            .collect())
    }

    async fn find_by_term(&self, term: &str) -> ProductResult<Option<ProductDetail>> {
        let condition = match Uuid::parse_str(term) {
            Ok(id) => Condition::all().add(product::Column::Id.eq(id)),
            Err(_) => Condition::any()
                .add(Expr::cust_with_values(
                    r#"UPPER("products"."title") = ?"#,
                    [term.to_uppercase()],
                ))
                .add(product::Column::Slug.eq(term.to_lowercase())),
        };

        let Some(model) = self.products.find_one_where(condition).await? else {
            return Ok(None);
        };

        let images = self.load_images(self.products.db(), &model).await?;
        Ok(Some(model.into_detail(images)))
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductDetail> {
        let txn = self.products.begin().await?;

        match self.update_in(&txn, id, input).await {
            Ok(Some(product)) => {
                txn.commit().await?;
                tracing::info!(product_id = %id, "Updated product");
                Ok(product)
            }
            Ok(None) => {
                rollback(txn).await;
                Err(ProductError::NotFound(id.to_string()))
            }
            Err(e) => {
                rollback(txn).await;
                Err(e.into())
            }
        }
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        // product_images rows go with it through ON DELETE CASCADE
        let deleted = self.products.delete_by_id(id).await?;

        if deleted {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(deleted)
    }
}
