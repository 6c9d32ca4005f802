use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, product, store};

/// A product as sold by one store. `(product_id, store_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "store_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub price: f64,
    pub stock: i32,
    pub is_available: bool,
    pub recommended: bool,
    pub discount: bool,
    pub store_specific_images: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
    Store,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
            Relation::Store => Entity::belongs_to(store::Entity)
                .from(Column::StoreId)
                .to(store::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl Related<store::Entity> for Entity {
    fn to() -> RelationDef { Relation::Store.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields of a store product about to be inserted; references already checked.
#[derive(Clone, Debug)]
pub struct NewStoreProduct {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub price: f64,
    pub stock: i32,
    pub is_available: bool,
    pub recommended: bool,
    pub discount: bool,
    pub store_specific_images: Vec<String>,
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() {
        return Err(errors::ModelError::Validation("price must be a finite number".into()));
    }
    if price < 0.0 {
        return Err(errors::ModelError::Validation("price cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_stock(stock: i32) -> Result<(), errors::ModelError> {
    if stock < 0 {
        return Err(errors::ModelError::Validation("stock cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_images(images: &[String]) -> Result<(), errors::ModelError> {
    if images.iter().any(|i| i.trim().is_empty()) {
        return Err(errors::ModelError::Validation("storeSpecificImages cannot contain empty entries".into()));
    }
    Ok(())
}

/// Field rules checked on every persisted state, new or merged.
pub fn validate(model: &Model) -> Result<(), errors::ModelError> {
    validate_price(model.price)?;
    validate_stock(model.stock)?;
    validate_images(&images_from_json(&model.store_specific_images))
}

pub fn images_to_json(images: &[String]) -> Json {
    Json::Array(images.iter().cloned().map(Json::String).collect())
}

/// Image list stored in a JSON column; anything that is not a string array reads as empty.
pub fn images_from_json(value: &Json) -> Vec<String> {
    match value {
        Json::Array(items) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

pub async fn create(db: &DatabaseConnection, new: NewStoreProduct) -> Result<Model, errors::ModelError> {
    validate_price(new.price)?;
    validate_stock(new.stock)?;
    validate_images(&new.store_specific_images)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(new.product_id),
        store_id: Set(new.store_id),
        price: Set(new.price),
        stock: Set(new.stock),
        is_available: Set(new.is_available),
        recommended: Set(new.recommended),
        discount: Set(new.discount),
        store_specific_images: Set(images_to_json(&new.store_specific_images)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::from_db)
}
