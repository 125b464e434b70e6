//! Test Helper Utilities
//!
//! Shared utilities for testing artpal-crawl

pub mod catalog_server;
pub mod memory_store;

pub use catalog_server::{listing_html, png_bytes, serve, CatalogFixture};
pub use memory_store::MemoryStore;
