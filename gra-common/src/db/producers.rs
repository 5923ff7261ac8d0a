//! Producer database operations
//!
//! Producers are unique by name; creation is lookup-or-create.

use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{normalize_name, parse_guid, Producer};
use crate::{Error, Result};

fn producer_from_row(row: &SqliteRow) -> Result<Producer> {
    let guid: String = row.get("guid");
    Ok(Producer {
        id: parse_guid(&guid)?,
        name: row.get("name"),
    })
}

/// Create a producer, or return the existing one with the same name
///
/// The name is trimmed first. The returned flag is `true` when a new row was
/// inserted.
pub async fn create_producer<'a, A>(db: A, name: &str) -> Result<(Producer, bool)>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let name = normalize_name("Producer", name)?;
    let mut conn = db.acquire().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO producers (guid, name, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&name)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        > 0;

    let producer = get_producer_by_name(&mut *conn, &name)
        .await?
        .ok_or_else(|| Error::Internal(format!("Producer '{}' vanished after insert", name)))?;

    if inserted {
        info!(name = %producer.name, "New producer stored");
    } else {
        debug!(name = %producer.name, "Producer already exists");
    }

    Ok((producer, inserted))
}

/// Lookup-or-create several producers at once
///
/// Duplicate names in the input are collapsed; the result follows the order
/// in which each name first appears.
pub async fn create_producers<'a, A>(db: A, names: &[String]) -> Result<Vec<Producer>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    let mut producers: Vec<Producer> = Vec::with_capacity(names.len());

    for name in names {
        let (producer, _) = create_producer(&mut *conn, name).await?;
        if !producers.iter().any(|p| p.id == producer.id) {
            producers.push(producer);
        }
    }

    Ok(producers)
}

/// Load producer by id
pub async fn get_producer(pool: &SqlitePool, id: Uuid) -> Result<Option<Producer>> {
    let row = sqlx::query("SELECT guid, name FROM producers WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(producer_from_row).transpose()
}

/// Load producer by exact name
pub async fn get_producer_by_name<'a, A>(db: A, name: &str) -> Result<Option<Producer>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    let row = sqlx::query("SELECT guid, name FROM producers WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(producer_from_row).transpose()
}

/// List all producers ordered by name
pub async fn list_producers(pool: &SqlitePool) -> Result<Vec<Producer>> {
    let rows = sqlx::query("SELECT guid, name FROM producers ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(producer_from_row).collect()
}

/// Delete producer by id; movie credits cascade
pub async fn delete_producer(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM producers WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?
        .rows_affected()
        > 0;

    if deleted {
        info!(producer_id = %id, "Producer removed");
    }

    Ok(deleted)
}
