//! Entity store: movies, producers, studios and their associations

pub mod init;
pub mod models;
pub mod movies;
pub mod producers;
pub mod studios;

pub use init::*;
pub use models::*;
