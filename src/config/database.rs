//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are created with `SeaORM`'s `Schema::create_table_from_entity`, so the
//! schema (columns, unique constraints and foreign keys) always matches the
//! entity definitions without hand-written SQL.

use crate::config::DatabaseSettings;
use crate::entities::{
    Account, Donation, DonationProof, Program, ProgramPeriod, Session, User, Verification,
};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema,
};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/donation_tracker.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection pool using `settings`.
///
/// The URL comes from `settings.url` when set, otherwise from [`get_database_url`].
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let url = settings.url.clone().unwrap_or_else(get_database_url);
    debug!("Connecting to database at {}", url);

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(settings.max_connections)
        .sqlx_logging(settings.sqlx_logging);

    Database::connect(options).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!("Ensured table {}", entity.table_name());
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Tables are created parents first so foreign keys always point at an
/// existing table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, Account).await?;
    create_table(db, &schema, Verification).await?;
    create_table(db, &schema, Program).await?;
    create_table(db, &schema, ProgramPeriod).await?;
    create_table(db, &schema, Donation).await?;
    create_table(db, &schema, DonationProof).await?;

    info!("Database tables ensured.");
    Ok(())
}
