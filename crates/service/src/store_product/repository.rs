use async_trait::async_trait;
use uuid::Uuid;

use models::{product, store_product};

use super::domain::{ListFilter, ProductFilter, StoreProductView};
use crate::errors::ServiceError;

/// Persistence seam for store products.
///
/// Implementations map driver errors into [`ServiceError`]; a unique-index
/// violation on `(product_id, store_id)` must come back as `Conflict`.
#[async_trait]
pub trait StoreProductRepository: Send + Sync {
    async fn product_exists(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn store_exists(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn insert(&self, new: store_product::NewStoreProduct) -> Result<store_product::Model, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<store_product::Model>, ServiceError>;
    /// Persist every field of an existing record; `NotFound` if it vanished.
    async fn save(&self, model: store_product::Model) -> Result<store_product::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Attach product and store to each row, one view per row; a reference
    /// whose target is gone stays `None`.
    async fn expand(&self, rows: Vec<store_product::Model>) -> Result<Vec<StoreProductView>, ServiceError>;

    /// Joined rows only: records with a missing product or store are dropped.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<StoreProductView>, ServiceError>;
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<StoreProductView>, ServiceError>;
    /// Available rows paired with their product, oldest first.
    async fn available_with_products(&self, filter: &ProductFilter) -> Result<Vec<(store_product::Model, product::Model)>, ServiceError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;
    use models::store;

    #[derive(Default)]
    pub struct MockStoreProductRepository {
        pub products: Mutex<HashMap<Uuid, product::Model>>,
        pub stores: Mutex<HashMap<Uuid, store::Model>>,
        rows: Mutex<Vec<store_product::Model>>,
        calls: AtomicUsize,
    }

    impl MockStoreProductRepository {
        /// Number of repository calls made so far.
        pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

        fn touch(&self) { self.calls.fetch_add(1, Ordering::SeqCst); }

        pub fn add_product(&self, name: &str, category: &str) -> product::Model {
            let now = Utc::now().into();
            let p = product::Model {
                id: Uuid::new_v4(),
                name: name.into(),
                description: None,
                category: category.into(),
                images: serde_json::json!([]),
                created_at: now,
                updated_at: now,
            };
            self.products.lock().unwrap().insert(p.id, p.clone());
            p
        }

        pub fn add_store(&self, name: &str) -> store::Model {
            let now = Utc::now().into();
            let s = store::Model { id: Uuid::new_v4(), name: name.into(), address: None, created_at: now, updated_at: now };
            self.stores.lock().unwrap().insert(s.id, s.clone());
            s
        }

        fn expanded(&self, rows: Vec<store_product::Model>) -> Vec<StoreProductView> {
            let products = self.products.lock().unwrap();
            let stores = self.stores.lock().unwrap();
            rows.into_iter()
                .map(|r| {
                    let p = products.get(&r.product_id).cloned();
                    let s = stores.get(&r.store_id).cloned();
                    StoreProductView::expand(r, p, s)
                })
                .collect()
        }

        fn joined(&self, rows: Vec<store_product::Model>) -> Vec<StoreProductView> {
            self.expanded(rows).into_iter().filter(StoreProductView::is_complete).collect()
        }

        fn matches_product(filter: &ProductFilter, p: &product::Model) -> bool {
            filter.category.as_ref().map_or(true, |c| &p.category == c)
                && filter.search.as_ref().map_or(true, |t| p.name.to_lowercase().contains(&t.to_lowercase()))
        }
    }

    #[async_trait]
    impl StoreProductRepository for MockStoreProductRepository {
        async fn product_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.touch();
            Ok(self.products.lock().unwrap().contains_key(&id))
        }

        async fn store_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.touch();
            Ok(self.stores.lock().unwrap().contains_key(&id))
        }

        async fn insert(&self, new: store_product::NewStoreProduct) -> Result<store_product::Model, ServiceError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.product_id == new.product_id && r.store_id == new.store_id) {
                return Err(ServiceError::duplicate_store_product());
            }
            let now = Utc::now().into();
            let m = store_product::Model {
                id: Uuid::new_v4(),
                product_id: new.product_id,
                store_id: new.store_id,
                price: new.price,
                stock: new.stock,
                is_available: new.is_available,
                recommended: new.recommended,
                discount: new.discount,
                store_specific_images: store_product::images_to_json(&new.store_specific_images),
                created_at: now,
                updated_at: now,
            };
            rows.push(m.clone());
            Ok(m)
        }

        async fn find(&self, id: Uuid) -> Result<Option<store_product::Model>, ServiceError> {
            self.touch();
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn save(&self, model: store_product::Model) -> Result<store_product::Model, ServiceError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.id != model.id && r.product_id == model.product_id && r.store_id == model.store_id) {
                return Err(ServiceError::duplicate_store_product());
            }
            let slot = rows.iter_mut().find(|r| r.id == model.id).ok_or_else(|| ServiceError::not_found("Store product"))?;
            *slot = model.clone();
            Ok(model)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }

        async fn expand(&self, rows: Vec<store_product::Model>) -> Result<Vec<StoreProductView>, ServiceError> {
            self.touch();
            Ok(self.expanded(rows))
        }

        async fn list(&self, filter: &ListFilter) -> Result<Vec<StoreProductView>, ServiceError> {
            self.touch();
            let rows: Vec<_> = self.rows.lock().unwrap().iter()
                .filter(|r| filter.store_id.map_or(true, |s| r.store_id == s))
                .filter(|r| !filter.recommended_only || r.recommended)
                .filter(|r| !filter.discount_only || r.discount)
                .cloned()
                .collect();
            Ok(self.joined(rows).into_iter()
                .filter(|v| v.product.as_ref().map_or(false, |p| Self::matches_product(&filter.product, p)))
                .collect())
        }

        async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<StoreProductView>, ServiceError> {
            self.touch();
            let rows: Vec<_> = self.rows.lock().unwrap().iter().filter(|r| r.product_id == product_id).cloned().collect();
            Ok(self.joined(rows))
        }

        async fn available_with_products(&self, filter: &ProductFilter) -> Result<Vec<(store_product::Model, product::Model)>, ServiceError> {
            self.touch();
            let products = self.products.lock().unwrap();
            Ok(self.rows.lock().unwrap().iter()
                .filter(|r| r.is_available)
                .filter_map(|r| products.get(&r.product_id).map(|p| (r.clone(), p.clone())))
                .filter(|(_, p)| Self::matches_product(filter, p))
                .collect())
        }
    }
}
