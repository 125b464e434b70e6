//! # Artpal Common Library
//!
//! Shared code for the artpal crawler:
//! - Error type used across the workspace
//! - Run configuration and its resolution order
//! - The persisted `ArtworkRecord` model
//! - The Postgres persistence gateway

pub mod config;
pub mod db;
pub mod error;

pub use config::{CrawlConfig, PaletteOptions};
pub use db::{ArtworkRecord, ArtworkStore, PgGateway};
pub use error::{Error, Result};
