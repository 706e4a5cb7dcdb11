//! Bounded, loss-sorted memory of the best candidates seen so far.

use crate::candidate::Candidate;
use sciforge_error::{Error, Result};

/// Top-k archive: at most `capacity` candidates, ascending by loss.
///
/// Insertion appends, stable-sorts by loss, and truncates, so candidates
/// with equal loss keep their insertion order and the worst entry is the
/// one evicted. Only the loop controller mutates the archive.
#[derive(Debug, Default)]
pub struct TopKArchive {
    entries: Vec<Candidate>,
    capacity: usize,
}

/// One archive entry rendered for prompt feedback
#[derive(Debug, Clone, Copy)]
pub struct FeedbackEntry<'a> {
    pub index: usize,
    pub source: &'a str,
    pub loss: f64,
}

impl TopKArchive {
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), capacity }
    }

    /// Insert a scored candidate, keeping the best `capacity` entries.
    ///
    /// Uses `total_cmp` so a NaN loss sorts last instead of poisoning the
    /// order.
    pub fn insert(&mut self, candidate: Candidate) {
        self.entries.push(candidate);
        self.entries
            .sort_by(|a, b| a.sort_loss().total_cmp(&b.sort_loss()));
        self.entries.truncate(self.capacity);
    }

    /// Current entries in ascending-loss order, for prompt rendering.
    ///
    /// Restartable and non-mutating: two calls without an intervening
    /// `insert` yield identical sequences.
    pub fn feedback_entries(&self) -> impl Iterator<Item = FeedbackEntry<'_>> {
        self.entries.iter().enumerate().map(|(index, c)| FeedbackEntry {
            index,
            source: &c.source,
            loss: c.sort_loss(),
        })
    }

    /// The lowest-loss candidate
    pub fn best(&self) -> Result<&Candidate> {
        self.entries
            .first()
            .ok_or_else(|| Error::archive_empty().with_operation("archive::best"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
