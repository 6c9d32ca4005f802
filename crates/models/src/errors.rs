use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Classify a raw database error; unique-index violations become `Duplicate`.
    pub fn from_db(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return ModelError::Duplicate(msg);
        }
        let msg = err.to_string();
        // drivers that do not surface a structured code still name the violation
        if msg.contains("duplicate key") || msg.contains("UNIQUE constraint failed") {
            return ModelError::Duplicate(msg);
        }
        ModelError::Db(msg)
    }
}
