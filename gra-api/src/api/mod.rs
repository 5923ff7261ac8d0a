//! HTTP API handlers for gra-api

pub mod awards;
pub mod csv_import;
pub mod health;
pub mod movies;
pub mod producers;
pub mod studios;

pub use awards::award_routes;
pub use csv_import::csv_routes;
pub use health::health_routes;
pub use movies::movie_routes;
pub use producers::producer_routes;
pub use studios::studio_routes;
