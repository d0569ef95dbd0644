use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a SeaORM connection pool. Every request borrows a connection from it
/// for the duration of one handler call.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.max_connections(20).sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending migration in `migrations/`.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    MIGRATOR.run(conn.get_postgres_connection_pool()).await?;
    Ok(())
}

/// Roll migrations back until `target` is the latest applied version.
/// `target = 0` reverts everything.
pub async fn revert_migrations(conn: &DatabaseConnection, target: i64) -> Result<()> {
    MIGRATOR
        .undo(conn.get_postgres_connection_pool(), target)
        .await?;
    Ok(())
}

/// Versions and descriptions of the embedded migrations, in order.
pub fn known_migrations() -> Vec<(i64, String)> {
    MIGRATOR
        .iter()
        .filter(|m| m.migration_type.is_up_migration())
        .map(|m| (m.version, m.description.to_string()))
        .collect()
}
