use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "store")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, name: &str, address: Option<&str>) -> Result<Model, errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        address: Set(address.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::from_db)
}

pub async fn exists(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let found = Entity::find_by_id(id).one(db).await.map_err(errors::ModelError::from_db)?;
    Ok(found.is_some())
}
