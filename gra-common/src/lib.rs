//! # GRA Common Library
//!
//! Shared code for the Golden Raspberry Awards catalog service:
//! - Entity store (movies, producers, studios and their associations)
//! - Database initialization
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
