use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("invalid reputation bounds [{min}, {max}]")]
    InvalidBounds { min: u32, max: u32 },

    #[error("storage backend error: {0}")]
    Backend(String),
}
