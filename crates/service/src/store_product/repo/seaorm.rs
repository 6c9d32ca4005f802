use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, Unchanged};
use uuid::Uuid;

use models::{product, store, store_product};

use crate::errors::ServiceError;
use crate::store_product::domain::{ListFilter, ProductFilter, StoreProductView};
use crate::store_product::query;
use crate::store_product::repository::StoreProductRepository;

pub struct SeaOrmStoreProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmStoreProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn products_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, product::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let found = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(found.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn stores_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, store::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let found = store::Entity::find()
            .filter(store::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(found.into_iter().map(|s| (s.id, s)).collect())
    }
}

fn distinct<I: IntoIterator<Item = Uuid>>(ids: I) -> Vec<Uuid> {
    let mut v: Vec<Uuid> = ids.into_iter().collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// A reference can vanish between the joined select and the batch load.
fn joined(views: Vec<StoreProductView>) -> Vec<StoreProductView> {
    views.into_iter().filter(StoreProductView::is_complete).collect()
}

#[async_trait::async_trait]
impl StoreProductRepository for SeaOrmStoreProductRepository {
    async fn product_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(product::exists(&self.db, id).await?)
    }

    async fn store_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(store::exists(&self.db, id).await?)
    }

    async fn insert(&self, new: store_product::NewStoreProduct) -> Result<store_product::Model, ServiceError> {
        Ok(store_product::create(&self.db, new).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<store_product::Model>, ServiceError> {
        Ok(store_product::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn save(&self, m: store_product::Model) -> Result<store_product::Model, ServiceError> {
        let am = store_product::ActiveModel {
            id: Unchanged(m.id),
            product_id: Set(m.product_id),
            store_id: Set(m.store_id),
            price: Set(m.price),
            stock: Set(m.stock),
            is_available: Set(m.is_available),
            recommended: Set(m.recommended),
            discount: Set(m.discount),
            store_specific_images: Set(m.store_specific_images),
            created_at: Unchanged(m.created_at),
            updated_at: Set(m.updated_at),
        };
        match am.update(&self.db).await {
            Ok(updated) => Ok(updated),
            Err(DbErr::RecordNotUpdated) => Err(ServiceError::not_found("Store product")),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = store_product::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn expand(&self, rows: Vec<store_product::Model>) -> Result<Vec<StoreProductView>, ServiceError> {
        let products = self.products_by_id(distinct(rows.iter().map(|r| r.product_id))).await?;
        let stores = self.stores_by_id(distinct(rows.iter().map(|r| r.store_id))).await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                let p = products.get(&r.product_id).cloned();
                let s = stores.get(&r.store_id).cloned();
                StoreProductView::expand(r, p, s)
            })
            .collect())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<StoreProductView>, ServiceError> {
        let rows = query::list(filter).all(&self.db).await?;
        Ok(joined(self.expand(rows).await?))
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<StoreProductView>, ServiceError> {
        let rows = query::store_options(product_id).all(&self.db).await?;
        Ok(joined(self.expand(rows).await?))
    }

    async fn available_with_products(&self, filter: &ProductFilter) -> Result<Vec<(store_product::Model, product::Model)>, ServiceError> {
        let rows = query::summary_rows(filter).all(&self.db).await?;
        let products = self.products_by_id(distinct(rows.iter().map(|r| r.product_id))).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| products.get(&r.product_id).cloned().map(|p| (r, p)))
            .collect())
    }
}
