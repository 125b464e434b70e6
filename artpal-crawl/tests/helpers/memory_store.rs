//! In-memory ArtworkStore

use artpal_common::{ArtworkRecord, ArtworkStore, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records kept in a Vec; `exists` scans it
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ArtworkRecord>>,
    checks: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Store that already holds a record for each link
    pub fn with_links(links: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut records = store.records.lock().unwrap();
            for link in links {
                records.push(ArtworkRecord::new(None, None, *link, (1, 1), Vec::new()));
            }
        }
        store
    }

    pub fn records(&self) -> Vec<ArtworkRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Links passed to `exists`, in call order
    pub fn checks(&self) -> Vec<String> {
        self.checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtworkStore for MemoryStore {
    async fn exists(&self, image_link: &str) -> Result<bool> {
        self.checks.lock().unwrap().push(image_link.to_string());
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.image_link == image_link))
    }

    async fn insert(&self, record: &ArtworkRecord) -> Result<u64> {
        self.records.lock().unwrap().push(record.clone());
        Ok(1)
    }
}
