//! Movie database operations
//!
//! Movies are unique by title. Creation is lookup-or-create: inserting a title
//! that already exists returns the stored row untouched.
//!
//! Write functions accept anything that can hand out a connection (`&SqlitePool`,
//! `&mut SqliteConnection`, `&mut Transaction`), so a bulk import can run them
//! inside one transaction.

use sqlx::sqlite::SqliteRow;
use sqlx::{Acquire, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    normalize_name, parse_guid, Expand, Movie, MovieDetail, NewMovie, Producer, Studio,
    WinningMovie,
};
use crate::Result;

fn movie_from_row(row: &SqliteRow) -> Result<Movie> {
    let guid: String = row.get("guid");
    let winner: i64 = row.get("winner");

    Ok(Movie {
        id: parse_guid(&guid)?,
        title: row.get("title"),
        year: row.get("year"),
        winner: winner != 0,
    })
}

/// Create a movie, or return the existing one with the same title
///
/// The returned flag is `true` when a new row was inserted.
pub async fn create_movie<'a, A>(db: A, new_movie: &NewMovie) -> Result<(Movie, bool)>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let title = normalize_name("Movie", &new_movie.title)?;
    let guid = Uuid::new_v4();
    let mut conn = db.acquire().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO movies (guid, title, year, winner, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(title) DO NOTHING
        "#,
    )
    .bind(guid.to_string())
    .bind(&title)
    .bind(new_movie.year)
    .bind(new_movie.winner as i64)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        > 0;

    let movie = get_movie_by_title(&mut *conn, &title).await?.ok_or_else(|| {
        crate::Error::Internal(format!("Movie '{}' vanished after insert", title))
    })?;

    if inserted {
        info!(title = %movie.title, year = movie.year, winner = movie.winner, "New movie stored");
    } else {
        debug!(title = %movie.title, "Movie already exists, returning stored row");
    }

    Ok((movie, inserted))
}

/// Load movie by id
pub async fn get_movie(pool: &SqlitePool, id: Uuid) -> Result<Option<Movie>> {
    let row = sqlx::query("SELECT guid, title, year, winner FROM movies WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(movie_from_row).transpose()
}

/// Load movie by exact title
pub async fn get_movie_by_title<'a, A>(db: A, title: &str) -> Result<Option<Movie>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    let row = sqlx::query("SELECT guid, title, year, winner FROM movies WHERE title = ?")
        .bind(title)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(movie_from_row).transpose()
}

/// List all movies ordered by year, then title
pub async fn list_movies(pool: &SqlitePool) -> Result<Vec<Movie>> {
    let rows = sqlx::query("SELECT guid, title, year, winner FROM movies ORDER BY year, title")
        .fetch_all(pool)
        .await?;

    rows.iter().map(movie_from_row).collect()
}

/// List all movies, attaching the requested relations
pub async fn list_movies_expanded(pool: &SqlitePool, expand: Expand) -> Result<Vec<MovieDetail>> {
    let movies = list_movies(pool).await?;

    let mut producers_by_movie: HashMap<Uuid, Vec<Producer>> = HashMap::new();
    if expand.producers {
        let rows = sqlx::query(
            r#"
            SELECT mp.movie_id, p.guid, p.name
            FROM movie_producers mp
            JOIN producers p ON p.guid = mp.producer_id
            ORDER BY p.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        for row in &rows {
            let movie_id: String = row.get("movie_id");
            let guid: String = row.get("guid");
            producers_by_movie
                .entry(parse_guid(&movie_id)?)
                .or_default()
                .push(Producer {
                    id: parse_guid(&guid)?,
                    name: row.get("name"),
                });
        }
    }

    let mut studios_by_movie: HashMap<Uuid, Vec<Studio>> = HashMap::new();
    if expand.studios {
        let rows = sqlx::query(
            r#"
            SELECT ms.movie_id, s.guid, s.name
            FROM movie_studios ms
            JOIN studios s ON s.guid = ms.studio_id
            ORDER BY s.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        for row in &rows {
            let movie_id: String = row.get("movie_id");
            let guid: String = row.get("guid");
            studios_by_movie
                .entry(parse_guid(&movie_id)?)
                .or_default()
                .push(Studio {
                    id: parse_guid(&guid)?,
                    name: row.get("name"),
                });
        }
    }

    Ok(movies
        .into_iter()
        .map(|movie| {
            let producers = expand
                .producers
                .then(|| producers_by_movie.remove(&movie.id).unwrap_or_default());
            let studios = expand
                .studios
                .then(|| studios_by_movie.remove(&movie.id).unwrap_or_default());
            MovieDetail {
                movie,
                producers,
                studios,
            }
        })
        .collect())
}

/// Delete movie by id; associations cascade
///
/// Returns `false` when no such movie exists.
pub async fn delete_movie(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM movies WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?
        .rows_affected()
        > 0;

    if deleted {
        info!(movie_id = %id, "Movie removed");
    }

    Ok(deleted)
}

/// Credit producers on a movie (idempotent)
pub async fn link_producers<'a, A>(db: A, movie_id: Uuid, producers: &[Producer]) -> Result<()>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    for producer in producers {
        sqlx::query(
            r#"
            INSERT INTO movie_producers (movie_id, producer_id)
            VALUES (?, ?)
            ON CONFLICT(movie_id, producer_id) DO NOTHING
            "#,
        )
        .bind(movie_id.to_string())
        .bind(producer.id.to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Credit studios on a movie (idempotent)
pub async fn link_studios<'a, A>(db: A, movie_id: Uuid, studios: &[Studio]) -> Result<()>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut conn = db.acquire().await?;
    for studio in studios {
        sqlx::query(
            r#"
            INSERT INTO movie_studios (movie_id, studio_id)
            VALUES (?, ?)
            ON CONFLICT(movie_id, studio_id) DO NOTHING
            "#,
        )
        .bind(movie_id.to_string())
        .bind(studio.id.to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Load every winning movie with its producer names
///
/// Movies come back ordered by year, then title; producer names within a
/// movie are ordered by name. A winner with no credited producer is returned
/// with an empty list.
pub async fn get_winning_movies(pool: &SqlitePool) -> Result<Vec<WinningMovie>> {
    let rows = sqlx::query(
        r#"
        SELECT m.guid, m.title, m.year, p.name AS producer_name
        FROM movies m
        LEFT JOIN movie_producers mp ON mp.movie_id = m.guid
        LEFT JOIN producers p ON p.guid = mp.producer_id
        WHERE m.winner = 1
        ORDER BY m.year, m.title, p.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut movies: Vec<WinningMovie> = Vec::new();
    let mut current_guid: Option<String> = None;

    for row in &rows {
        let guid: String = row.get("guid");
        let producer_name: Option<String> = row.get("producer_name");

        if current_guid.as_deref() != Some(guid.as_str()) {
            movies.push(WinningMovie {
                title: row.get("title"),
                year: row.get("year"),
                producers: Vec::new(),
            });
            current_guid = Some(guid);
        }

        if let (Some(name), Some(movie)) = (producer_name, movies.last_mut()) {
            movie.producers.push(name);
        }
    }

    debug!(count = movies.len(), "Loaded winning movies");
    Ok(movies)
}
