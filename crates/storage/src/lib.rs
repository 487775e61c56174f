//! SeaORM-backed credential persistence that keeps the database backend
//! swappable (SQLite by default, PostgreSQL via feature flag).

mod builder;
mod credential_store;
mod entity;
mod migration;

use std::sync::Arc;

use builder::StorageBuilder;
use migration::run_migrations;
use revenue_pulse_domain::config::BootstrapConfig;
use revenue_pulse_domain::storage::{
    CredentialStore, InMemoryCredentialStore, StorageError, StorageResult,
};
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

/// Shared storage handle used by the HTTP API and the engine binary.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

/// Picks the credential backend for this process. A key seeded through the
/// environment lives in memory only; otherwise the database holds it.
pub async fn open_credential_store(
    config: &BootstrapConfig,
) -> StorageResult<Arc<dyn CredentialStore>> {
    if let Some(key) = config.seed_api_key() {
        info!("using processor key from environment; credential changes are not persisted");
        return Ok(Arc::new(InMemoryCredentialStore::seeded(key.clone())));
    }

    let mut builder = SeaOrmStorage::builder();
    if let Some(url) = config.database_url() {
        builder = builder.database_url(url);
    }
    let storage = builder.build().await?;
    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_requires_database_url() {
        let err = SeaOrmStorage::builder().build().await.err();
        assert_eq!(
            err,
            Some(StorageError::Database("missing database url".into()))
        );
    }

    #[tokio::test]
    async fn builder_connects_and_migrates() {
        let storage = SeaOrmStorage::builder()
            .database_url("sqlite::memory:")
            .build()
            .await
            .expect("storage builds");
        assert_eq!(storage.get().await.unwrap(), None);
    }
}
