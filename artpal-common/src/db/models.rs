//! Persisted entity for one crawled artwork

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Title or artist used when the catalog offers none
pub const ANONYMOUS: &str = "Anonymous";

/// One row of the `art` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkRecord {
    pub title: String,
    pub artist: String,
    /// Source URL of the image; duplicate-detection key
    pub image_link: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Stored in the `update_date` column
    pub created_at: DateTime<Utc>,
    /// Hex colours (`#rrggbb`), most prominent first
    pub palette: Vec<String>,
}

impl ArtworkRecord {
    /// Build a record stamped with the current time
    ///
    /// Absent or blank title/artist become [`ANONYMOUS`].
    pub fn new(
        title: Option<&str>,
        artist: Option<&str>,
        image_link: impl Into<String>,
        (image_width, image_height): (u32, u32),
        palette: Vec<String>,
    ) -> Self {
        Self {
            title: or_anonymous(title),
            artist: or_anonymous(artist),
            image_link: image_link.into(),
            image_width,
            image_height,
            created_at: Utc::now(),
            palette,
        }
    }
}

/// Trimmed text, or [`ANONYMOUS`] when missing or blank
pub fn or_anonymous(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}
