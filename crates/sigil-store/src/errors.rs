//! Error types for sigil-store.
//!
//! Backends report their own failures with `StoreError`; at the
//! `ContentStore` trait boundary these map onto the core taxonomy
//! (`NotFound` stays typed, everything else becomes `Storage`).

use sigil_core::SigilError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object not found: {digest}")]
    NotFound { digest: String },

    #[error("corrupt store entry: {0}")]
    Corrupt(String),
}

impl From<StoreError> for SigilError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { digest } => SigilError::NotFound { digest },
            other => SigilError::storage(other.to_string()),
        }
    }
}
