use async_trait::async_trait;
use thiserror::Error;

use super::ApiKey;

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

/// Holder of the single processor secret.
///
/// The storage medium is up to the implementation; callers only ever see one
/// key at a time.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> StorageResult<Option<ApiKey>>;
    async fn set(&self, value: ApiKey) -> StorageResult<()>;
    async fn delete(&self) -> StorageResult<()>;
}
