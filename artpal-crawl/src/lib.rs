//! artpal-crawl library
//!
//! Single-run crawler: picks one unseen artwork from a random catalog page,
//! downloads its image, extracts a colour palette and records it.

pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod orchestrator;
pub mod palette;
pub mod selection;

pub use crate::error::{CrawlError, CrawlResult, DecodeError, NavigationError, TransferError};
pub use crate::orchestrator::{Crawler, RunReport};
pub use crate::selection::{IndexPicker, RandomPicker, ScriptedPicker};
