use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{ApiKey, CredentialStore, StorageResult};

/// Process-local credential store for tests and environment-seeded runs.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    secret: RwLock<Option<ApiKey>>,
}

impl InMemoryCredentialStore {
    pub fn seeded(key: ApiKey) -> Self {
        Self {
            secret: RwLock::new(Some(key)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self) -> StorageResult<Option<ApiKey>> {
        let guard = self.secret.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    async fn set(&self, value: ApiKey) -> StorageResult<()> {
        let mut guard = self.secret.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(value);
        Ok(())
    }

    async fn delete(&self) -> StorageResult<()> {
        let mut guard = self.secret.write().unwrap_or_else(PoisonError::into_inner);
        guard.take();
        Ok(())
    }
}
