//! Award interval engine
//!
//! Owns the single-slot result cache in front of [`compute_award_intervals`].
//!
//! States: EMPTY (no cached result) and POPULATED. A read in EMPTY loads the
//! winning movies, computes, stores and returns; a read in POPULATED returns
//! the stored result without touching the store. [`AwardIntervalEngine::invalidate`]
//! always returns the engine to EMPTY.
//!
//! Concurrency: one async mutex guards the slot and is held across the whole
//! "check, else load + compute + store" sequence, so concurrent misses are
//! serialized and only the first one computes. The slot holds a whole
//! `Arc<AwardIntervalResult>` and is swapped in one assignment, never patched.
//! A failed store read leaves the slot EMPTY and returns the error.

use async_trait::async_trait;
use gra_common::db::{movies, WinningMovie};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::award_intervals::{compute_award_intervals, AwardIntervalResult};

/// Read side of the entity store that the engine depends on
#[async_trait]
pub trait WinningMovieSource: Send + Sync {
    /// All movies flagged as winners, each with its producer names
    async fn winning_movies(&self) -> gra_common::Result<Vec<WinningMovie>>;
}

#[async_trait]
impl WinningMovieSource for SqlitePool {
    async fn winning_movies(&self) -> gra_common::Result<Vec<WinningMovie>> {
        movies::get_winning_movies(self).await
    }
}

#[derive(Default)]
struct CacheSlot {
    cached: Option<Arc<AwardIntervalResult>>,
}

/// Award interval computation with a process-wide single-slot cache
pub struct AwardIntervalEngine {
    source: Arc<dyn WinningMovieSource>,
    slot: Mutex<CacheSlot>,
}

impl AwardIntervalEngine {
    /// Create an engine in the EMPTY state
    pub fn new(source: Arc<dyn WinningMovieSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    /// Engine reading winning movies straight from the catalog database
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(pool))
    }

    /// Cached result, or a freshly computed one on a miss
    pub async fn get_award_intervals(&self) -> gra_common::Result<Arc<AwardIntervalResult>> {
        let mut slot = self.slot.lock().await;

        if let Some(result) = &slot.cached {
            debug!("Award intervals served from cache");
            return Ok(Arc::clone(result));
        }

        let winners = self.source.winning_movies().await.map_err(|e| {
            warn!(error = %e, "Failed to load winning movies; cache left empty");
            e
        })?;

        let result = Arc::new(compute_award_intervals(&winners));
        info!(
            winning_movies = winners.len(),
            min_entries = result.min.len(),
            max_entries = result.max.len(),
            "Award intervals computed"
        );

        slot.cached = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Drop the cached result; a no-op when nothing is cached
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.cached.take().is_some() {
            info!("Award interval cache invalidated");
        } else {
            debug!("Award interval cache already empty");
        }
    }

    /// Whether a computed result is currently held
    pub async fn is_cached(&self) -> bool {
        self.slot.lock().await.cached.is_some()
    }
}
