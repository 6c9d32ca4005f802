use thiserror::Error;

use models::errors::ModelError;

/// Failure taxonomy shared by every store-product operation.
/// Messages are end-user readable; `Internal` carries the underlying cause.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid_id(entity: &str) -> Self { Self::InvalidArgument(format!("Invalid {} ID", entity)) }

    pub fn duplicate_store_product() -> Self {
        Self::Conflict("This product already exists in the store".into())
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::InvalidArgument(msg),
            ModelError::Duplicate(_) => ServiceError::duplicate_store_product(),
            ModelError::Db(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::from_db(e).into() }
}
