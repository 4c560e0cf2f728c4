//! SQLite pool construction and schema bootstrap.
//!
//! The schema is created idempotently at startup: two tables, no
//! migration history. Tests call [`create_pool`] with `sqlite::memory:`
//! to get an isolated database per test.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Open the database (creating the file if needed) and ensure the schema
/// exists.
///
/// The pool is capped at a single connection: SQLite serialises writers
/// regardless, and a lone pooled connection keeps `sqlite::memory:`
/// databases alive between queries.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Create the `devices` and `readings` tables if they do not exist.
async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS devices (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             type TEXT NOT NULL,
             location TEXT NOT NULL,
             status TEXT NOT NULL,
             category TEXT NOT NULL DEFAULT 'General'
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS readings (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             device_id INTEGER NOT NULL,
             status TEXT NOT NULL,
             temperature REAL NOT NULL,
             timestamp TEXT NOT NULL,
             FOREIGN KEY (device_id) REFERENCES devices (id)
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
