use thiserror::Error;

use crate::models::RecordKind;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{kind} #{id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
