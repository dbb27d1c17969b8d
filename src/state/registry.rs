//! Visited registry shared by all crawl tasks
//!
//! The registry maps normalized keys to page outcomes and is the single
//! source of truth for "has this page been handled". Checking and inserting
//! happen in one critical section through [`VisitedRegistry::claim_or_join`],
//! so for any key exactly one caller ever becomes its owner.

use crate::state::PageOutcome;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The caller holds the key and must eventually record its outcome
    Owner,

    /// Another task already claimed or recorded the key
    Joined,
}

#[derive(Debug)]
enum Entry {
    Claimed,
    Recorded(PageOutcome),
}

/// Concurrency-safe map from normalized key to page outcome
///
/// Keys are only ever added. A claimed key is recorded once by its owner and
/// never overwritten afterwards.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    recorded: AtomicUsize,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked: every mutation is a single insert.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claims `key` or joins an existing claim
    ///
    /// # Returns
    ///
    /// * `Claim::Owner` - The key was absent and now belongs to the caller
    /// * `Claim::Joined` - The key was already claimed or recorded
    pub fn claim_or_join(&self, key: &str) -> Claim {
        let mut entries = self.entries();

        if entries.contains_key(key) {
            return Claim::Joined;
        }

        entries.insert(key.to_string(), Entry::Claimed);
        Claim::Owner
    }

    /// Records the outcome for a key the caller owns
    ///
    /// A second record for the same key is ignored; the first outcome wins.
    pub fn record(&self, key: &str, outcome: PageOutcome) {
        let mut entries = self.entries();

        match entries.get(key) {
            Some(Entry::Recorded(existing)) => {
                tracing::warn!(
                    "Ignoring second outcome for {} (already recorded from {})",
                    outcome.url,
                    existing.url
                );
            }
            _ => {
                entries.insert(key.to_string(), Entry::Recorded(outcome));
                self.recorded.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Returns the number of recorded outcomes
    ///
    /// This does not take the lock; under concurrency the value may already
    /// be stale when it is read.
    pub fn recorded_count(&self) -> usize {
        self.recorded.load(Ordering::SeqCst)
    }

    /// Returns the recorded outcome for a key, if any
    pub fn outcome(&self, key: &str) -> Option<PageOutcome> {
        match self.entries().get(key) {
            Some(Entry::Recorded(outcome)) => Some(outcome.clone()),
            _ => None,
        }
    }

    /// Returns every recorded outcome
    ///
    /// Claimed keys whose owner never recorded (a cancelled fetch) are left
    /// out.
    pub fn snapshot_outcomes(&self) -> Vec<PageOutcome> {
        self.entries()
            .values()
            .filter_map(|entry| match entry {
                Entry::Recorded(outcome) => Some(outcome.clone()),
                Entry::Claimed => None,
            })
            .collect()
    }
}
