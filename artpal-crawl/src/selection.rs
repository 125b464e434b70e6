//! Selection Loop
//!
//! Draws entries of the sampled page at random, without replacement, and
//! accepts the first one whose image link is not yet stored. Each existence
//! check completes before the next draw.

use crate::catalog::CatalogEntry;
use crate::error::{CrawlError, CrawlResult};
use artpal_common::ArtworkStore;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Source of uniform draws in `0..bound`
pub trait IndexPicker: Send {
    /// `bound` is always at least 1
    fn pick(&mut self, bound: usize) -> usize;
}

/// `rand`-backed picker; seed the RNG for reproducible runs
pub struct RandomPicker<R>(pub R);

impl<R: Rng + Send> IndexPicker for RandomPicker<R> {
    fn pick(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }
}

/// Replays a fixed sequence of draws, each clamped into range
///
/// Once the sequence is used up every further draw is 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    draws: VecDeque<usize>,
}

impl ScriptedPicker {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl IndexPicker for ScriptedPicker {
    fn pick(&mut self, bound: usize) -> usize {
        self.draws.pop_front().unwrap_or(0).min(bound.saturating_sub(1))
    }
}

/// Index of the first drawn entry with no stored record
///
/// Every draw indexes the full entry list. A draw that lands on an entry
/// already rejected moves forward (wrapping) to the next entry not yet
/// checked, so no link is checked twice. Once every entry is rejected the
/// loop fails with [`CrawlError::NoUnseenEntries`].
pub async fn select_unseen<St, P>(
    entries: &[CatalogEntry],
    page: u32,
    store: &St,
    picker: &mut P,
) -> CrawlResult<usize>
where
    St: ArtworkStore + ?Sized,
    P: IndexPicker + ?Sized,
{
    let mut rejected = vec![false; entries.len()];
    let mut remaining = entries.len();

    while remaining > 0 {
        let drawn = picker.pick(entries.len()).min(entries.len() - 1);
        let index = (drawn..entries.len())
            .chain(0..drawn)
            .find(|&i| !rejected[i])
            .unwrap_or(drawn);
        let link = &entries[index].image_link;

        if store.exists(link).await? {
            debug!(drawn, index, image_link = %link, "Already recorded, drawing again");
            rejected[index] = true;
            remaining -= 1;
            continue;
        }

        info!(index, image_link = %link, "Selected unseen artwork");
        return Ok(index);
    }

    Err(CrawlError::NoUnseenEntries {
        page,
        candidates: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use artpal_common::{ArtworkRecord, Result};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Known links plus a log of every existence check
    struct KnownLinks {
        known: HashSet<String>,
        checked: Mutex<Vec<String>>,
    }

    impl KnownLinks {
        fn new(known: &[&str]) -> Self {
            Self {
                known: known.iter().map(|s| s.to_string()).collect(),
                checked: Mutex::new(Vec::new()),
            }
        }

        fn checked(&self) -> Vec<String> {
            self.checked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtworkStore for KnownLinks {
        async fn exists(&self, image_link: &str) -> Result<bool> {
            self.checked.lock().unwrap().push(image_link.to_string());
            Ok(self.known.contains(image_link))
        }

        async fn insert(&self, _record: &ArtworkRecord) -> Result<u64> {
            Ok(1)
        }
    }

    fn entries(links: &[&str]) -> Vec<CatalogEntry> {
        links
            .iter()
            .map(|l| CatalogEntry {
                image_link: l.to_string(),
                title: format!("title {}", l),
                artist: "Anonymous".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_rejects_recorded_link_then_accepts_next() {
        let store = KnownLinks::new(&["A"]);
        // Draw A, then A again, which moves on to B
        let mut picker = ScriptedPicker::new([0, 0]);

        let index = select_unseen(&entries(&["A", "B", "C"]), 1, &store, &mut picker)
            .await
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(store.checked(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_draw_indexes_original_entries() {
        let store = KnownLinks::new(&["A"]);
        let mut picker = ScriptedPicker::new([0, 1]);

        let index = select_unseen(&entries(&["A", "B", "C"]), 1, &store, &mut picker)
            .await
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(store.checked(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_draw_on_rejected_entry_moves_to_next_unchecked() {
        let store = KnownLinks::new(&["A", "C"]);
        // C drawn twice: the repeat wraps to A, and a draw of A moves on to B
        let mut picker = ScriptedPicker::new([2, 2, 0]);

        let index = select_unseen(&entries(&["A", "B", "C"]), 1, &store, &mut picker)
            .await
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(store.checked(), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_never_redraws_rejected_entry() {
        let store = KnownLinks::new(&["A", "B"]);
        let mut picker = ScriptedPicker::new([0, 0, 0]);

        let index = select_unseen(&entries(&["A", "B", "C"]), 1, &store, &mut picker)
            .await
            .unwrap();

        assert_eq!(index, 2);
        assert_eq!(store.checked().len(), 3);
    }

    #[tokio::test]
    async fn test_all_recorded_is_no_unseen_entries() {
        let store = KnownLinks::new(&["A", "B", "C"]);
        let mut picker = RandomPicker(StdRng::seed_from_u64(7));

        let result = select_unseen(&entries(&["A", "B", "C"]), 42, &store, &mut picker).await;

        match result {
            Err(CrawlError::NoUnseenEntries { page, candidates }) => {
                assert_eq!(page, 42);
                assert_eq!(candidates, 3);
            }
            other => panic!("Expected NoUnseenEntries, got {:?}", other),
        }
        assert_eq!(store.checked().len(), 3);
    }

    #[tokio::test]
    async fn test_same_seed_same_choice() {
        let links = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let store = KnownLinks::new(&["B", "E"]);

        let mut first = RandomPicker(StdRng::seed_from_u64(2024));
        let mut second = RandomPicker(StdRng::seed_from_u64(2024));
        let a = select_unseen(&entries(&links), 1, &store, &mut first).await.unwrap();
        let b = select_unseen(&entries(&links), 1, &store, &mut second).await.unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_accepted_index_never_recorded() {
        let links = ["A", "B", "C", "D", "E"];
        let store = KnownLinks::new(&["A", "C", "D"]);

        for seed in 0..32 {
            let mut picker = RandomPicker(StdRng::seed_from_u64(seed));
            let index = select_unseen(&entries(&links), 1, &store, &mut picker)
                .await
                .unwrap();
            assert!(["B", "E"].contains(&links[index]));
        }
    }

    #[test]
    fn test_scripted_picker_clamps_into_range() {
        let mut picker = ScriptedPicker::new([9]);
        assert_eq!(picker.pick(3), 2);
        assert_eq!(picker.pick(3), 0);
    }
}
