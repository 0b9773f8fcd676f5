//! Bounded history of generated commentaries
//!
//! The store remembers, per file, the content that was sent and the
//! response that came back, so switching back to a file can show the old
//! commentary instead of asking again.
//!
//! Eviction is FIFO by insertion, not LRU: reading an entry never changes
//! its position, but re-inserting an identity moves it to the newest slot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diff::count_changed_lines;
use crate::types::identifiers::{FileIdentity, PersonaId};
use crate::types::options::DEFAULT_HISTORY_CAPACITY;
use crate::types::snapshot::DocumentSnapshot;

/// One completed generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// File the commentary is about
    pub identity: FileIdentity,
    /// Content that was sent to the model
    pub content: String,
    /// Full generated response
    pub response: String,
    /// Persona that produced it
    pub persona_id: PersonaId,
    /// When the generation completed
    pub generated_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record a generation for `snapshot`, stamped now
    pub fn new(snapshot: &DocumentSnapshot, response: impl Into<String>, persona_id: PersonaId) -> Self {
        Self {
            identity: snapshot.identity.clone(),
            content: snapshot.content.clone(),
            response: response.into(),
            persona_id,
            generated_at: Utc::now(),
        }
    }

    /// Override the generation timestamp
    #[must_use]
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }
}

/// Why a cached entry can no longer be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Nothing cached for this file
    Missing,
    /// Cached under a different persona
    PersonaChanged,
    /// More lines changed than the large-edit threshold
    LargeChange {
        /// Changed-line count
        changed: usize,
    },
    /// Some lines changed and the cooldown has passed
    CooldownElapsed {
        /// Changed-line count
        changed: usize,
    },
}

/// Thresholds for [`HistoryStore::staleness`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Cooldown before small edits count
    pub min_interval: Duration,
    /// Changed-line count above which the entry is stale immediately
    pub min_line_changes: usize,
}

/// Insertion-ordered, capacity-bounded map from file to its last commentary
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: IndexMap<FileIdentity, HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` files
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entry for `identity`
    #[must_use]
    pub fn get(&self, identity: &FileIdentity) -> Option<&HistoryEntry> {
        self.entries.get(identity)
    }

    /// Identities from oldest to newest insertion
    pub fn identities(&self) -> impl Iterator<Item = &FileIdentity> {
        self.entries.keys()
    }

    /// Insert or replace the entry for `identity`
    ///
    /// Replacing moves the identity to the newest position. Inserting a new
    /// identity into a full store first evicts the oldest one, which is
    /// returned.
    pub fn put(&mut self, identity: FileIdentity, entry: HistoryEntry) -> Option<HistoryEntry> {
        if self.entries.shift_remove(&identity).is_some() {
            self.entries.insert(identity, entry);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0).map(|(_, old)| old)
        } else {
            None
        };
        if let Some(old) = &evicted {
            log::debug!("History full, evicting {}", old.identity);
        }
        self.entries.insert(identity, entry);
        evicted
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Why the cached entry for `snapshot` must be regenerated, if it must
    ///
    /// Elapsed time is measured from the entry's generation to the
    /// snapshot's capture time. Checks run cheapest first: missing entry,
    /// persona switch, then the line diff.
    #[must_use]
    pub fn staleness(
        &self,
        snapshot: &DocumentSnapshot,
        persona_id: &PersonaId,
        policy: StalenessPolicy,
    ) -> Option<StaleReason> {
        let Some(entry) = self.entries.get(&snapshot.identity) else {
            return Some(StaleReason::Missing);
        };
        if &entry.persona_id != persona_id {
            return Some(StaleReason::PersonaChanged);
        }

        let changed = count_changed_lines(&entry.content, &snapshot.content);
        if changed > policy.min_line_changes {
            return Some(StaleReason::LargeChange { changed });
        }

        let elapsed = snapshot
            .captured_at
            .signed_duration_since(entry.generated_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed >= policy.min_interval && changed > 0 {
            return Some(StaleReason::CooldownElapsed { changed });
        }

        None
    }

    /// Whether the cached entry for `snapshot` must be regenerated
    #[must_use]
    pub fn is_stale(
        &self,
        snapshot: &DocumentSnapshot,
        persona_id: &PersonaId,
        min_interval: Duration,
        min_line_changes: usize,
    ) -> bool {
        self.staleness(
            snapshot,
            persona_id,
            StalenessPolicy {
                min_interval,
                min_line_changes,
            },
        )
        .is_some()
    }
}
