// Library exports for the spare parts catalog and the movie page generator.
// Both binaries and the integration tests build on these modules.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod movies;
pub mod routes;
pub mod state;
