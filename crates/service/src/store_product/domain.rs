use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{product, store, store_product};

use crate::errors::ServiceError;

/// Parse an entity reference; anything that is not a UUID is rejected.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::invalid_id(entity))
}

/// Query-string values follow form semantics: an empty value means "not given".
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Create input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreProductInput {
    pub product_id: Option<String>,
    pub store_id: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub recommended: Option<bool>,
    pub discount: Option<bool>,
    pub store_specific_images: Option<Vec<String>>,
}

impl CreateStoreProductInput {
    /// Required fields present, identifiers well formed, field rules hold.
    pub fn validate(self) -> Result<store_product::NewStoreProduct, ServiceError> {
        let (Some(product_id), Some(store_id), Some(price), Some(stock)) =
            (self.product_id, self.store_id, self.price, self.stock)
        else {
            return Err(ServiceError::InvalidArgument(
                "productId, storeId, price and stock are required".into(),
            ));
        };
        let product_id = parse_id(&product_id, "product")?;
        let store_id = parse_id(&store_id, "store")?;
        store_product::validate_price(price)?;
        store_product::validate_stock(stock)?;
        let images = self.store_specific_images.unwrap_or_default();
        store_product::validate_images(&images)?;

        Ok(store_product::NewStoreProduct {
            product_id,
            store_id,
            price,
            stock,
            is_available: self.is_available.unwrap_or(true),
            recommended: self.recommended.unwrap_or(false),
            discount: self.discount.unwrap_or(false),
            store_specific_images: images,
        })
    }
}

/// Partial update input; omitted fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreProductInput {
    pub product_id: Option<String>,
    pub store_id: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub recommended: Option<bool>,
    pub discount: Option<bool>,
    pub store_specific_images: Option<Vec<String>>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreProductChanges {
    pub product_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub recommended: Option<bool>,
    pub discount: Option<bool>,
    pub store_specific_images: Option<Vec<String>>,
}

impl UpdateStoreProductInput {
    pub fn validate(self) -> Result<StoreProductChanges, ServiceError> {
        let product_id = self.product_id.as_deref().map(|s| parse_id(s, "product")).transpose()?;
        let store_id = self.store_id.as_deref().map(|s| parse_id(s, "store")).transpose()?;
        if let Some(p) = self.price { store_product::validate_price(p)?; }
        if let Some(s) = self.stock { store_product::validate_stock(s)?; }
        if let Some(imgs) = &self.store_specific_images { store_product::validate_images(imgs)?; }
        Ok(StoreProductChanges {
            product_id,
            store_id,
            price: self.price,
            stock: self.stock,
            is_available: self.is_available,
            recommended: self.recommended,
            discount: self.discount,
            store_specific_images: self.store_specific_images,
        })
    }
}

impl StoreProductChanges {
    /// Merge onto the stored record. Timestamps are left to the caller.
    pub fn apply(self, mut m: store_product::Model) -> store_product::Model {
        if let Some(v) = self.product_id { m.product_id = v; }
        if let Some(v) = self.store_id { m.store_id = v; }
        if let Some(v) = self.price { m.price = v; }
        if let Some(v) = self.stock { m.stock = v; }
        if let Some(v) = self.is_available { m.is_available = v; }
        if let Some(v) = self.recommended { m.recommended = v; }
        if let Some(v) = self.discount { m.discount = v; }
        if let Some(v) = self.store_specific_images { m.store_specific_images = store_product::images_to_json(&v); }
        m
    }
}

/// Raw list query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoreProductsQuery {
    pub store_id: Option<String>,
    pub category: Option<String>,
    pub recommended: Option<String>,
    pub discount: Option<String>,
    pub search: Option<String>,
}

/// Raw summary query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Conditions on the joined product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// exact match on `product.category`
    pub category: Option<String>,
    /// case-insensitive substring of `product.name`
    pub search: Option<String>,
}

impl From<SummaryQuery> for ProductFilter {
    fn from(q: SummaryQuery) -> Self {
        Self { category: non_empty(q.category), search: non_empty(q.search) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub store_id: Option<Uuid>,
    pub recommended_only: bool,
    pub discount_only: bool,
    pub product: ProductFilter,
}

impl TryFrom<ListStoreProductsQuery> for ListFilter {
    type Error = ServiceError;

    fn try_from(q: ListStoreProductsQuery) -> Result<Self, Self::Error> {
        let store_id = non_empty(q.store_id).map(|s| parse_id(&s, "store")).transpose()?;
        Ok(Self {
            store_id,
            // only the literal "true" switches a flag filter on
            recommended_only: q.recommended.as_deref() == Some("true"),
            discount_only: q.discount.as_deref() == Some("true"),
            product: ProductFilter { category: non_empty(q.category), search: non_empty(q.search) },
        })
    }
}

/// Store product with its product and store expanded in place of the ids.
///
/// A reference whose target has since been deleted expands to `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProductView {
    pub id: Uuid,
    #[serde(rename = "productId")]
    pub product: Option<product::Model>,
    #[serde(rename = "storeId")]
    pub store: Option<store::Model>,
    pub price: f64,
    pub stock: i32,
    pub is_available: bool,
    pub recommended: bool,
    pub discount: bool,
    pub store_specific_images: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl StoreProductView {
    pub fn expand(row: store_product::Model, product: Option<product::Model>, store: Option<store::Model>) -> Self {
        Self {
            id: row.id,
            store_specific_images: store_product::images_from_json(&row.store_specific_images),
            product,
            store,
            price: row.price,
            stock: row.stock,
            is_available: row.is_available,
            recommended: row.recommended,
            discount: row.discount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Both references resolved.
    pub fn is_complete(&self) -> bool {
        self.product.is_some() && self.store.is_some()
    }
}

/// One row per distinct product across every store carrying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub store_product_id: Uuid,
}
