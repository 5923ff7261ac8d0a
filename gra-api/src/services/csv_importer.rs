//! Bulk CSV import of award nominees
//!
//! Reads a delimited file with at least `year`, `producers` and `winner`
//! columns, stores every movie with its producers and studios, and
//! invalidates the award interval cache once the batch is written.
//!
//! Movies are unique by title: a row whose title is already stored is counted
//! as ignored and its producers/studios are not re-linked.

use csv::{ReaderBuilder, StringRecord};
use gra_common::db::{movies, producers, studios, NewMovie};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::award_engine::AwardIntervalEngine;

/// Columns every import file must carry (already lower-cased)
pub const REQUIRED_COLUMNS: [&str; 3] = ["producers", "winner", "year"];

/// Candidate field delimiters, in tie-break order
const DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Separators between names in the producers/studios cells
static NAME_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:, and |,| and )\s*").expect("Invalid name separator regex"));

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV, missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to store imported data: {0}")]
    Store(#[from] gra_common::Error),
}

/// One usable row of an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub title: String,
    pub year: i64,
    pub winner: bool,
    pub producers: Vec<String>,
    pub studios: Vec<String>,
}

/// Outcome of an import, returned by `POST /csv/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported_movies: usize,
    pub ignored_movies: usize,
}

/// Pick the delimiter occurring most often in the header line
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");

    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for delimiter in DELIMITERS {
        let count = header.bytes().filter(|b| *b == delimiter).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Split a producers/studios cell into trimmed, non-empty names
pub fn split_names(value: &str) -> Vec<String> {
    NAME_SEPARATOR
        .split(value)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_year(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn cell<'a>(record: &'a StringRecord, column: Option<usize>) -> &'a str {
    column.and_then(|i| record.get(i)).unwrap_or("")
}

/// Parse import file contents into movie records
///
/// Rows with a non-numeric year, a blank producers cell or a blank title are
/// skipped. The `title` and `studios` columns are optional.
pub fn parse_csv(content: &str) -> Result<Vec<MovieRecord>, ImportError> {
    let delimiter = sniff_delimiter(content);
    debug!(delimiter = %(delimiter as char).escape_default(), "Detected CSV delimiter");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| column(**name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(ImportError::MissingColumns(missing));
    }

    let title_col = column("title");
    let year_col = column("year");
    let winner_col = column("winner");
    let producers_col = column("producers");
    let studios_col = column("studios");

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let row = result?;

        let year = cell(&row, year_col).trim();
        let producers = cell(&row, producers_col);
        let title = cell(&row, title_col).trim();

        let year = match year.parse::<i64>() {
            Ok(parsed) if is_year(year) => parsed,
            _ => {
                skipped += 1;
                continue;
            }
        };
        if producers.trim().is_empty() || title.is_empty() {
            skipped += 1;
            continue;
        }

        records.push(MovieRecord {
            title: title.to_string(),
            year,
            winner: cell(&row, winner_col).trim().to_lowercase() == "yes",
            producers: split_names(producers),
            studios: split_names(cell(&row, studios_col)),
        });
    }

    if skipped > 0 {
        debug!(skipped, "Skipped unusable CSV rows");
    }

    Ok(records)
}

/// Parse and store a whole import file, then invalidate the award cache
///
/// The batch is written in one transaction: a failure on any record rolls
/// back every record, leaving the store and the cached result untouched.
pub async fn import_csv(
    pool: &SqlitePool,
    engine: &AwardIntervalEngine,
    content: &str,
) -> Result<ImportSummary, ImportError> {
    info!("Starting CSV import");

    let records = parse_csv(content)?;

    let mut imported_movies = 0usize;
    let mut ignored_movies = 0usize;

    let mut tx = pool.begin().await.map_err(gra_common::Error::from)?;

    for record in &records {
        let new_movie = NewMovie {
            title: record.title.clone(),
            year: record.year,
            winner: record.winner,
        };
        let (movie, created) = movies::create_movie(&mut *tx, &new_movie).await?;

        if !created {
            ignored_movies += 1;
            warn!(title = %record.title, year = record.year, "Movie already exists, ignored");
            continue;
        }

        let movie_producers = producers::create_producers(&mut *tx, &record.producers).await?;
        movies::link_producers(&mut *tx, movie.id, &movie_producers).await?;

        let movie_studios = studios::create_studios(&mut *tx, &record.studios).await?;
        movies::link_studios(&mut *tx, movie.id, &movie_studios).await?;

        imported_movies += 1;
    }

    tx.commit().await.map_err(gra_common::Error::from)?;

    engine.invalidate().await;

    info!(imported_movies, ignored_movies, "CSV import complete");

    Ok(ImportSummary {
        message: "CSV import completed successfully".to_string(),
        imported_movies,
        ignored_movies,
    })
}

/// Import the first `.csv` file (by name) found in `dir`
///
/// Returns `Ok(None)` when the directory does not exist or holds no CSV file.
pub async fn import_from_directory(
    pool: &SqlitePool,
    engine: &AwardIntervalEngine,
    dir: &Path,
) -> Result<Option<ImportSummary>, ImportError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "CSV directory not found, skipping startup import");
        return Ok(None);
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut csv_files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            csv_files.push(path);
        }
    }
    csv_files.sort();

    let Some(path) = csv_files.into_iter().next() else {
        info!(dir = %dir.display(), "No CSV file found for startup import");
        return Ok(None);
    };

    info!(file = %path.display(), "Importing CSV at startup");
    let content = tokio::fs::read_to_string(&path).await?;
    let summary = import_csv(pool, engine, &content).await?;

    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gra_common::db::init_memory_database;

    const SAMPLE: &str = "\
year;title;studios;producers;winner
1980;Can't Stop the Music;Associated Film Distribution;Allan Carr;yes
1980;Cruising;Lorimar Productions, United Artists;Jerry Weintraub;
1984;Bolero;Cannon Films;Bo Derek;yes
1986;Under the Cherry Moon;Warner Bros.;Bob Cavallo, Joe Ruffalo and Steve Fargnoli;Yes
";

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("year;title;producers"), b';');
        assert_eq!(sniff_delimiter("year,title,producers"), b',');
        assert_eq!(sniff_delimiter("year\ttitle\tproducers"), b'\t');
        assert_eq!(sniff_delimiter("year|title|producers"), b'|');
        assert_eq!(sniff_delimiter("year"), b';');
        assert_eq!(sniff_delimiter(""), b';');
    }

    #[test]
    fn test_split_names() {
        assert_eq!(
            split_names("Bob Cavallo, Joe Ruffalo and Steve Fargnoli"),
            vec!["Bob Cavallo", "Joe Ruffalo", "Steve Fargnoli"]
        );
        assert_eq!(
            split_names("Mitsuharu Ishii, Ryuzo Kato, and Terry Schreiber"),
            vec!["Mitsuharu Ishii", "Ryuzo Kato", "Terry Schreiber"]
        );
        assert_eq!(split_names(" Allan Carr "), vec!["Allan Carr"]);
        assert!(split_names("  ,  ").is_empty());
        assert!(split_names("").is_empty());
    }

    #[test]
    fn test_parse_csv_sample() {
        let records = parse_csv(SAMPLE).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(
            records[0],
            MovieRecord {
                title: "Can't Stop the Music".to_string(),
                year: 1980,
                winner: true,
                producers: vec!["Allan Carr".to_string()],
                studios: vec!["Associated Film Distribution".to_string()],
            }
        );
        assert!(!records[1].winner);
        assert_eq!(records[1].studios.len(), 2);
        assert!(records[3].winner, "winner match is case-insensitive");
        assert_eq!(records[3].producers.len(), 3);
    }

    #[test]
    fn test_parse_csv_normalizes_headers_and_skips_bad_rows() {
        let content = "\
 YEAR , Title , Producers , Winner
1990 , Ghosts Can't Do It , Bo Derek , yes
19x0 , Bad Year , Someone , yes
1991 , No Producers ,  , yes
2000 , , Nobody Titled , yes
";
        let records = parse_csv(content).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Ghosts Can't Do It");
        assert_eq!(records[0].year, 1990);
        assert!(records[0].winner);
        assert!(records[0].studios.is_empty());
    }

    #[test]
    fn test_parse_csv_missing_columns_sorted() {
        let result = parse_csv("title;year\nFoo;1990\n");

        match result {
            Err(ImportError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["producers", "winner"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_import_csv_counts_and_links() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());

        let summary = import_csv(&pool, &engine, SAMPLE).await.unwrap();

        assert_eq!(summary.imported_movies, 4);
        assert_eq!(summary.ignored_movies, 0);
        assert_eq!(movies::list_movies(&pool).await.unwrap().len(), 4);
        assert_eq!(producers::list_producers(&pool).await.unwrap().len(), 6);
        assert_eq!(studios::list_studios(&pool).await.unwrap().len(), 5);

        let winners = movies::get_winning_movies(&pool).await.unwrap();
        assert_eq!(winners.len(), 3);
        assert_eq!(
            winners[2].producers,
            vec!["Bob Cavallo", "Joe Ruffalo", "Steve Fargnoli"]
        );
    }

    #[tokio::test]
    async fn test_import_csv_twice_ignores_everything() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());

        import_csv(&pool, &engine, SAMPLE).await.unwrap();
        let summary = import_csv(&pool, &engine, SAMPLE).await.unwrap();

        assert_eq!(summary.imported_movies, 0);
        assert_eq!(summary.ignored_movies, 4);
        assert_eq!(movies::list_movies(&pool).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_import_csv_invalidates_cache() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());

        let before = engine.get_award_intervals().await.unwrap();
        assert!(before.min.is_empty());
        assert!(engine.is_cached().await);

        let content = "year;title;producers;winner\n1990;First;Pat;yes\n1994;Second;Pat;yes\n";
        import_csv(&pool, &engine, content).await.unwrap();
        assert!(!engine.is_cached().await);

        let after = engine.get_award_intervals().await.unwrap();
        assert_eq!(after.min.len(), 1);
        assert_eq!(after.min[0].producer, "Pat");
        assert_eq!(after.min[0].interval, 4);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_cache_alone() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());
        engine.get_award_intervals().await.unwrap();

        let result = import_csv(&pool, &engine, "title;year\nFoo;1990\n").await;

        assert!(matches!(result, Err(ImportError::MissingColumns(_))));
        assert!(engine.is_cached().await);
    }

    #[tokio::test]
    async fn test_store_failure_mid_batch_rolls_back_whole_import() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());
        assert!(engine.get_award_intervals().await.unwrap().min.is_empty());

        // Reject the second studio link, after the first record is fully written
        sqlx::query(
            r#"
            CREATE TRIGGER reject_second_studio_link
            BEFORE INSERT ON movie_studios
            WHEN (SELECT COUNT(*) FROM movie_studios) >= 1
            BEGIN
                SELECT RAISE(ABORT, 'studio link rejected');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let content = "year;title;producers;winner;studios\n\
                       1990;First;Pat;yes;S1\n\
                       1994;Second;Pat;yes;S2\n";

        let result = import_csv(&pool, &engine, content).await;
        assert!(matches!(result, Err(ImportError::Store(_))));

        // Nothing from the batch survives, so the cached result is still accurate
        assert!(movies::list_movies(&pool).await.unwrap().is_empty());
        assert!(producers::list_producers(&pool).await.unwrap().is_empty());
        assert!(engine.is_cached().await);
        assert!(engine.get_award_intervals().await.unwrap().min.is_empty());

        sqlx::query("DROP TRIGGER reject_second_studio_link")
            .execute(&pool)
            .await
            .unwrap();

        // Retry imports every record with all of its links
        let summary = import_csv(&pool, &engine, content).await.unwrap();
        assert_eq!(summary.imported_movies, 2);
        assert_eq!(summary.ignored_movies, 0);

        let studio_links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movie_studios")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(studio_links, 2);

        let result = engine.get_award_intervals().await.unwrap();
        assert_eq!(result.min.len(), 1);
        assert_eq!(result.min[0].producer, "Pat");
        assert_eq!(result.min[0].interval, 4);
    }

    #[tokio::test]
    async fn test_import_from_directory() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());
        let dir = tempfile::tempdir().unwrap();

        // Empty directory: nothing to do
        assert_eq!(
            import_from_directory(&pool, &engine, dir.path()).await.unwrap(),
            None
        );

        std::fs::write(dir.path().join("notes.txt"), "not a csv").unwrap();
        std::fs::write(
            dir.path().join("b.csv"),
            "year;title;producers;winner\n2001;From B;Someone;yes\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.csv"), SAMPLE).unwrap();

        let summary = import_from_directory(&pool, &engine, dir.path())
            .await
            .unwrap()
            .expect("CSV should be imported");
        assert_eq!(summary.imported_movies, 4);
        assert!(movies::get_movie_by_title(&pool, "From B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_from_missing_directory() {
        let pool = init_memory_database().await.unwrap();
        let engine = AwardIntervalEngine::from_pool(pool.clone());

        let result = import_from_directory(&pool, &engine, Path::new("/nonexistent/gra-data"))
            .await
            .unwrap();

        assert_eq!(result, None);
    }
}
