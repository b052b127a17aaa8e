use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Schema,
    Statement,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{department, department_member, organization};

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(config.max_connections)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);
    if config.db_type == "postgres" {
        opt.set_schema_search_path("public");
    }

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

/// Create the organization tables and their secondary indexes if missing
pub async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for organization entities...");

    create_table_if_not_exists(db, backend, schema.create_table_from_entity(department::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(department_member::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(organization::Entity)).await?;

    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("idx_org_department_parent")
            .table(department::Entity)
            .col(department::Column::ParentDepartmentId)
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("idx_org_department_member_department")
            .table(department_member::Entity)
            .col(department_member::Column::DepartmentId)
            .to_owned(),
    )
    .await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    let sql = backend.build(&stmt);
    db.execute(Statement::from_string(backend, sql.to_string())).await?;
    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    let sql = backend.build(&stmt);
    db.execute(Statement::from_string(backend, sql.to_string())).await?;
    Ok(())
}

/// In-memory SQLite database with the organization schema, for tests.
///
/// The pool is pinned to a single connection: every SQLite `:memory:`
/// connection is its own database.
#[cfg(test)]
pub async fn memory_database() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.expect("open sqlite memory database");
    auto_migrate(&db).await.expect("migrate sqlite memory database");
    db
}
