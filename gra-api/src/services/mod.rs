//! Award interval engine and bulk importer

pub mod award_engine;
pub mod award_intervals;
pub mod csv_importer;

pub use award_engine::{AwardIntervalEngine, WinningMovieSource};
pub use award_intervals::{AwardInterval, AwardIntervalResult};
pub use csv_importer::{ImportError, ImportSummary};
