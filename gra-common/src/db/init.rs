//! Database initialization
//!
//! Opens (or creates) the SQLite catalog and creates the schema idempotently.
//! Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        // WAL lets the award reads proceed while an import is writing
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Initialize a private in-memory database with the full schema
///
/// The pool is pinned to a single long-lived connection: the database only
/// exists while that connection is open.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every catalog table (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_movies_table(pool).await?;
    create_producers_table(pool).await?;
    create_studios_table(pool).await?;

    // Linking tables
    create_movie_producers_table(pool).await?;
    create_movie_studios_table(pool).await?;

    Ok(())
}

async fn create_movies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            year INTEGER NOT NULL,
            winner INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_winner_year ON movies(winner, year)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_producers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS producers (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_studios_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS studios (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_producers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_producers (
            movie_id TEXT NOT NULL REFERENCES movies(guid) ON DELETE CASCADE,
            producer_id TEXT NOT NULL REFERENCES producers(guid) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, producer_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_studios_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_studios (
            movie_id TEXT NOT NULL REFERENCES movies(guid) ON DELETE CASCADE,
            studio_id TEXT NOT NULL REFERENCES studios(guid) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, studio_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Check that the database answers a trivial query
pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
