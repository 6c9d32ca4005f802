use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use models::store_product;
use uuid::Uuid;

use super::domain::{
    parse_id, CreateStoreProductInput, ListFilter, ListStoreProductsQuery, ProductFilter, ProductSummary,
    StoreProductView, SummaryQuery, UpdateStoreProductInput,
};
use super::query;
use super::repository::StoreProductRepository;
use crate::errors::ServiceError;

/// Store-product business service, independent of the web framework.
///
/// Every identifier is parsed before the repository is touched, so malformed
/// input never costs a database round-trip.
pub struct StoreProductService<R: StoreProductRepository> {
    repo: Arc<R>,
}

impl<R: StoreProductRepository> StoreProductService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    async fn expand_one(&self, row: store_product::Model) -> Result<StoreProductView, ServiceError> {
        self.repo
            .expand(vec![row])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::Internal("expansion returned no row".into()))
    }

    /// Product first; the store is not looked up when the product is missing.
    async fn ensure_references(&self, product_id: Option<Uuid>, store_id: Option<Uuid>) -> Result<(), ServiceError> {
        if let Some(id) = product_id {
            if !self.repo.product_exists(id).await? {
                return Err(ServiceError::not_found("Product"));
            }
        }
        if let Some(id) = store_id {
            if !self.repo.store_exists(id).await? {
                return Err(ServiceError::not_found("Store"));
            }
        }
        Ok(())
    }

    /// Create a store product after confirming the product, then the store, exist.
    ///
    /// The checks are advisory: two concurrent creates for the same pair both
    /// pass them, and the unique index rejects the loser with `Conflict`.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateStoreProductInput) -> Result<StoreProductView, ServiceError> {
        let new = input.validate()?;
        self.ensure_references(Some(new.product_id), Some(new.store_id)).await?;
        let created = self.repo.insert(new).await?;
        info!(id = %created.id, product_id = %created.product_id, store_id = %created.store_id, "store_product_created");
        self.expand_one(created).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, q: ListStoreProductsQuery) -> Result<Vec<StoreProductView>, ServiceError> {
        let filter = ListFilter::try_from(q)?;
        let rows = self.repo.list(&filter).await?;
        debug!(count = rows.len(), "store_products_listed");
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<StoreProductView, ServiceError> {
        let id = parse_id(id, "store product")?;
        let row = self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("Store product"))?;
        self.expand_one(row).await
    }

    /// Partial update: supplied fields are validated, merged onto the stored
    /// record, and the merged record is validated again before saving.
    /// A supplied `productId`/`storeId` must point at an existing entity.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateStoreProductInput) -> Result<StoreProductView, ServiceError> {
        let id = parse_id(id, "store product")?;
        let changes = input.validate()?;
        let existing = self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("Store product"))?;
        self.ensure_references(changes.product_id, changes.store_id).await?;

        let mut merged = changes.apply(existing);
        store_product::validate(&merged)?;
        merged.updated_at = Utc::now().into();

        let saved = self.repo.save(merged).await?;
        info!(id = %saved.id, "store_product_updated");
        self.expand_one(saved).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id, "store product")?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("Store product"));
        }
        info!(id = %id, "store_product_deleted");
        Ok(())
    }

    /// One row per available product with its price range across stores.
    #[instrument(skip(self))]
    pub async fn search_summary(&self, q: SummaryQuery) -> Result<Vec<ProductSummary>, ServiceError> {
        let filter = ProductFilter::from(q);
        let rows = self.repo.available_with_products(&filter).await?;
        Ok(query::summarize(rows))
    }

    /// Every store carrying `product_id`.
    #[instrument(skip(self))]
    pub async fn store_options(&self, product_id: &str) -> Result<Vec<StoreProductView>, ServiceError> {
        let product_id = parse_id(product_id, "product")?;
        let rows = self.repo.list_for_product(product_id).await?;
        if rows.is_empty() {
            return Err(ServiceError::NotFound("No stores found for this product".into()));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_product::repository::mock::MockStoreProductRepository;

    fn svc() -> (Arc<MockStoreProductRepository>, StoreProductService<MockStoreProductRepository>) {
        let repo = Arc::new(MockStoreProductRepository::default());
        (repo.clone(), StoreProductService::new(repo))
    }

    fn create_input(product_id: Uuid, store_id: Uuid, price: f64) -> CreateStoreProductInput {
        CreateStoreProductInput {
            product_id: Some(product_id.to_string()),
            store_id: Some(store_id.to_string()),
            price: Some(price),
            stock: Some(3),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_repository() {
        let (repo, svc) = svc();
        assert!(matches!(svc.get("abc").await, Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(svc.update("abc", UpdateStoreProductInput::default()).await, Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(svc.delete("abc").await, Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(svc.store_options("abc").await, Err(ServiceError::InvalidArgument(_))));
        let q = ListStoreProductsQuery { store_id: Some("abc".into()), ..Default::default() };
        assert!(matches!(svc.list(q).await, Err(ServiceError::InvalidArgument(_))));
        let input = CreateStoreProductInput { product_id: Some("abc".into()), ..create_input(Uuid::new_v4(), Uuid::new_v4(), 1.0) };
        assert!(matches!(svc.create(input).await, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn create_checks_product_before_store() {
        let (repo, svc) = svc();
        let err = svc.create(create_input(Uuid::new_v4(), Uuid::new_v4(), 1.0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
        // only the product lookup ran
        assert_eq!(repo.calls(), 1);

        let p = repo.add_product("Milk", "dairy");
        let err = svc.create(create_input(p.id, Uuid::new_v4(), 1.0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Store not found");
    }

    #[tokio::test]
    async fn create_expands_and_rejects_duplicates() {
        let (repo, svc) = svc();
        let p = repo.add_product("Milk", "dairy");
        let s = repo.add_store("Corner");

        let view = svc.create(create_input(p.id, s.id, 1.2)).await.unwrap();
        assert_eq!(view.product, Some(p.clone()));
        assert_eq!(view.store, Some(s.clone()));
        assert!(view.is_available);

        let err = svc.create(create_input(p.id, s.id, 1.5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        let all = svc.list(ListStoreProductsQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn update_is_partial() {
        let (repo, svc) = svc();
        let p = repo.add_product("Milk", "dairy");
        let s = repo.add_store("Corner");
        let created = svc.create(create_input(p.id, s.id, 1.2)).await.unwrap();

        let updated = svc
            .update(&created.id.to_string(), UpdateStoreProductInput { stock: Some(99), discount: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.stock, 99);
        assert!(updated.discount);
        assert_eq!(updated.price, 1.2);
        assert!(updated.is_available);
        assert!(updated.updated_at >= created.updated_at);

        let err = svc.update(&Uuid::new_v4().to_string(), UpdateStoreProductInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_checks_new_references_before_saving() {
        let (repo, svc) = svc();
        let p = repo.add_product("Milk", "dairy");
        let s = repo.add_store("Corner");
        let created = svc.create(create_input(p.id, s.id, 1.2)).await.unwrap();
        let id = created.id.to_string();

        let err = svc
            .update(&id, UpdateStoreProductInput { store_id: Some(Uuid::new_v4().to_string()), price: Some(9.0), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Store not found");

        let err = svc
            .update(&id, UpdateStoreProductInput { product_id: Some(Uuid::new_v4().to_string()), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found");

        let after = svc.get(&id).await.unwrap();
        assert_eq!(after.store, Some(s.clone()));
        assert_eq!(after.price, 1.2);

        let other = repo.add_store("Market");
        let moved = svc
            .update(&id, UpdateStoreProductInput { store_id: Some(other.id.to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(moved.store, Some(other));
    }

    #[tokio::test]
    async fn dangling_reference_expands_to_none() {
        let (repo, svc) = svc();
        let p = repo.add_product("Milk", "dairy");
        let s = repo.add_store("Corner");
        let created = svc.create(create_input(p.id, s.id, 1.2)).await.unwrap();
        repo.stores.lock().unwrap().remove(&s.id);

        let found = svc.get(&created.id.to_string()).await.unwrap();
        assert_eq!(found.product, Some(p));
        assert_eq!(found.store, None);
        assert!(svc.list(ListStoreProductsQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_and_delete_missing_are_not_found() {
        let (_repo, svc) = svc();
        let id = Uuid::new_v4().to_string();
        assert!(matches!(svc.get(&id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn store_options_empty_is_not_found() {
        let (repo, svc) = svc();
        let p = repo.add_product("Milk", "dairy");
        let err = svc.store_options(&p.id.to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "No stores found for this product");
    }
}
