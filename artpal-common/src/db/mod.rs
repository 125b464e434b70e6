//! Persistence gateway for the `art` table
//!
//! Every call opens its own connection, runs exactly one parameterized
//! statement and closes the connection again. There is no pool: a run makes
//! a handful of calls and then exits.

use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use tracing::{debug, warn};

pub mod models;

pub use models::{or_anonymous, ArtworkRecord, ANONYMOUS};

/// Duplicate check and insert, the only two operations a run needs
#[async_trait]
pub trait ArtworkStore: Send + Sync {
    /// True if at least one stored record has this image link
    async fn exists(&self, image_link: &str) -> Result<bool>;

    /// Insert one record, returning the number of rows written
    async fn insert(&self, record: &ArtworkRecord) -> Result<u64>;
}

/// Postgres-backed store with per-call connections
#[derive(Debug, Clone)]
pub struct PgGateway {
    connection_string: String,
}

impl PgGateway {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        let conn = PgConnection::connect(&self.connection_string).await?;
        debug!("Database connection opened");
        Ok(conn)
    }
}

/// Close the connection whatever the statement returned
///
/// The statement's own error takes precedence over a close failure.
async fn release<T>(conn: PgConnection, outcome: std::result::Result<T, sqlx::Error>) -> Result<T> {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    outcome.map_err(Error::from)
}

#[async_trait]
impl ArtworkStore for PgGateway {
    async fn exists(&self, image_link: &str) -> Result<bool> {
        let mut conn = self.connect().await?;
        let outcome = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM art WHERE image_link = $1)",
        )
        .bind(image_link)
        .fetch_one(&mut conn)
        .await;

        release(conn, outcome).await
    }

    async fn insert(&self, record: &ArtworkRecord) -> Result<u64> {
        let width = i32::try_from(record.image_width)
            .map_err(|_| Error::InvalidInput(format!("image width {} out of range", record.image_width)))?;
        let height = i32::try_from(record.image_height)
            .map_err(|_| Error::InvalidInput(format!("image height {} out of range", record.image_height)))?;

        let mut conn = self.connect().await?;
        let outcome = sqlx::query(
            "INSERT INTO art (title, artist, image_link, image_width, image_height, update_date, color_hex_codes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.title)
        .bind(&record.artist)
        .bind(&record.image_link)
        .bind(width)
        .bind(height)
        .bind(record.created_at)
        .bind(&record.palette)
        .execute(&mut conn)
        .await
        .map(|done| done.rows_affected());

        release(conn, outcome).await
    }
}
