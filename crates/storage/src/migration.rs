use revenue_pulse_domain::storage::{StorageError, StorageResult};
use sea_orm::sea_query::{ColumnDef, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::credentials;

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let credentials_table = Table::create()
        .table(credentials::Entity)
        .col(
            ColumnDef::new(credentials::Column::Key)
                .string_len(128)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(credentials::Column::Secret).text().not_null())
        .col(
            ColumnDef::new(credentials::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, credentials_table).await
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}
