//! Generic SeaORM data access shared by the domain repositories.
//!
//! Reads run on the pool held by the repository. Operations that take part in
//! multi-table writes are `*_with` variants taking any [`ConnectionTrait`], so
//! the same code path can run inside a [`DatabaseTransaction`].

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, PrimaryKeyTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::marker::PhantomData;

/// Typed CRUD helpers for entity `E`.
pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> BaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Open a transaction on the underlying pool. Dropping it without
    /// committing rolls it back.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.db.begin().await
    }

    pub async fn find_by_id_with<C, K>(&self, conn: &C, id: K) -> Result<Option<E::Model>, DbErr>
    where
        C: ConnectionTrait,
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(conn).await
    }

    /// First row matching `condition`.
    pub async fn find_one_where(&self, condition: Condition) -> Result<Option<E::Model>, DbErr> {
        E::find().filter(condition).one(&self.db).await
    }

    /// All rows matching `condition`, sorted ascending by `order_by`.
    pub async fn find_where_with<C>(
        &self,
        conn: &C,
        condition: Condition,
        order_by: &[E::Column],
    ) -> Result<Vec<E::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = E::find().filter(condition);
        for column in order_by {
            query = query.order_by_asc(*column);
        }
        query.all(conn).await
    }

    /// One page of rows sorted ascending by `order_by`.
    pub async fn find_page(
        &self,
        offset: u64,
        limit: u64,
        order_by: &[E::Column],
    ) -> Result<Vec<E::Model>, DbErr> {
        let mut query = E::find();
        for column in order_by {
            query = query.order_by_asc(*column);
        }
        query.offset(offset).limit(limit).all(&self.db).await
    }

    pub async fn insert_with<C, A>(&self, conn: &C, model: A) -> Result<E::Model, DbErr>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(conn).await
    }

    pub async fn update_with<C, A>(&self, conn: &C, model: A) -> Result<E::Model, DbErr>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model.update(conn).await
    }

    /// Returns `true` when a row was deleted.
    pub async fn delete_by_id<K>(&self, id: K) -> Result<bool, DbErr>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Delete every row where `column = value`, returning the number removed.
    pub async fn delete_where_with<C, V>(
        &self,
        conn: &C,
        column: E::Column,
        value: V,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
        V: Into<sea_orm::Value>,
    {
        let result = E::delete_many()
            .filter(column.eq(value))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
