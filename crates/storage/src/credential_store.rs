use chrono::Utc;
use revenue_pulse_domain::storage::{
    ApiKey, CredentialStore, StorageError, StorageResult, CREDENTIAL_KEY,
};
use sea_orm::{sea_query::OnConflict, EntityTrait, Set};

use crate::entity::credentials;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl CredentialStore for SeaOrmStorage {
    async fn get(&self) -> StorageResult<Option<ApiKey>> {
        let maybe = credentials::Entity::find_by_id(CREDENTIAL_KEY.to_string())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe
            .map(|model| ApiKey::new(model.secret))
            .filter(|key| !key.is_empty()))
    }

    async fn set(&self, value: ApiKey) -> StorageResult<()> {
        let active = credentials::ActiveModel {
            key: Set(CREDENTIAL_KEY.to_string()),
            secret: Set(value.expose().to_string()),
            updated_at: Set(Utc::now()),
        };
        credentials::Entity::insert(active)
            .on_conflict(
                OnConflict::column(credentials::Column::Key)
                    .update_columns([credentials::Column::Secret, credentials::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }

    async fn delete(&self) -> StorageResult<()> {
        credentials::Entity::delete_by_id(CREDENTIAL_KEY.to_string())
            .exec(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::connect("sqlite::memory:")
            .await
            .expect("sqlite storage")
    }

    #[tokio::test]
    async fn starts_without_a_credential() {
        let storage = storage().await;
        assert_eq!(storage.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_secret() {
        let storage = storage().await;
        storage.set(ApiKey::new("sk_test_first")).await.unwrap();
        storage.set(ApiKey::new("sk_test_second")).await.unwrap();

        let stored = storage.get().await.unwrap().expect("key stored");
        assert_eq!(stored.expose(), "sk_test_second");
    }

    #[tokio::test]
    async fn delete_clears_and_is_idempotent() {
        let storage = storage().await;
        storage.set(ApiKey::new("sk_test_gone")).await.unwrap();
        storage.delete().await.unwrap();
        storage.delete().await.unwrap();
        assert_eq!(storage.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_stored_secret_reads_as_absent() {
        let storage = storage().await;
        storage.set(ApiKey::new("   ")).await.unwrap();
        assert_eq!(storage.get().await.unwrap(), None);
    }
}
