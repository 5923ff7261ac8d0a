//! Studio database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::models::{normalize_name, parse_guid, Studio};
use crate::{Error, Result};

fn studio_from_row(row: &SqliteRow) -> Result<Studio> {
    let guid: String = row.get("guid");
    Ok(Studio {
        id: parse_guid(&guid)?,
        name: row.get("name"),
    })
}

/// Create a studio, or return the existing one with the same name
pub async fn create_studio<'a, A>(db: A, name: &str) -> Result<(Studio, bool)>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let name = normalize_name("Studio", name)?;
    let mut conn = db.acquire().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO studios (guid, name, created_at)
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

    let studio = get_studio_by_name(&mut *conn, &name)
        .await?
        .ok_or_else(|| Error::Internal(format!("Studio '{}' vanished after insert", name)))?;

    if inserted {
        info!(name = %studio.name, "New studio stored");
    }

    Ok((studio, inserted))
}

/// Lookup-or-create several studios, collapsing duplicate names
pub async fn create_studios<'a, A>(db: A, names: &[String]) -> Result<Vec<Studio>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    let mut studios: Vec<Studio> = Vec::with_capacity(names.len());

    for name in names {
        let (studio, _) = create_studio(&mut *conn, name).await?;
        if !studios.iter().any(|s| s.id == studio.id) {
            studios.push(studio);
        }
    }

    Ok(studios)
}

pub async fn get_studio(pool: &SqlitePool, id: Uuid) -> Result<Option<Studio>> {
    let row = sqlx::query("SELECT guid, name FROM studios WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(studio_from_row).transpose()
}

pub async fn get_studio_by_name<'a, A>(db: A, name: &str) -> Result<Option<Studio>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    let row = sqlx::query("SELECT guid, name FROM studios WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(studio_from_row).transpose()
}

/// List all studios ordered by name
pub async fn list_studios(pool: &SqlitePool) -> Result<Vec<Studio>> {
    let rows = sqlx::query("SELECT guid, name FROM studios ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(studio_from_row).collect()
}

pub async fn delete_studio(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM studios WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?
        .rows_affected()
        > 0;

    if deleted {
        info!(studio_id = %id, "Studio removed");
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_studio_lifecycle() {
        let pool = init_memory_database().await.unwrap();

        let (studio, created) = create_studio(&pool, "Columbia Pictures").await.unwrap();
        assert!(created);

        let (again, created) = create_studio(&pool, " Columbia Pictures").await.unwrap();
        assert!(!created);
        assert_eq!(again.id, studio.id);

        assert_eq!(get_studio(&pool, studio.id).await.unwrap(), Some(studio.clone()));
        assert_eq!(list_studios(&pool).await.unwrap(), vec![studio.clone()]);

        assert!(delete_studio(&pool, studio.id).await.unwrap());
        assert_eq!(get_studio_by_name(&pool, "Columbia Pictures").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_studios_order() {
        let pool = init_memory_database().await.unwrap();

        let names = vec![
            "Warner Bros.".to_string(),
            "Associated Film Distribution".to_string(),
            "Warner Bros.".to_string(),
        ];
        let studios = create_studios(&pool, &names).await.unwrap();

        assert_eq!(studios.len(), 2);
        assert_eq!(studios[0].name, "Warner Bros.");
        assert_eq!(studios[1].name, "Associated Film Distribution");
    }
}
