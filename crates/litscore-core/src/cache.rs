//! Memoization in front of the pure scorer.
//!
//! Scoring is deterministic for a fixed bank, so entries never need
//! invalidation. Rejected answer sets are not cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::ValidationError;
use crate::model::AnswerSet;
use crate::scoring::{Scorecard, Scorer};

/// A `Scorer` that remembers results keyed on the full answer set.
#[derive(Debug)]
pub struct CachedScorer {
    inner: Scorer,
    entries: Mutex<HashMap<AnswerSet, Arc<Scorecard>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedScorer {
    pub fn new(inner: Scorer) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.inner
    }

    pub fn score(&self, answers: &AnswerSet) -> Result<Arc<Scorecard>, ValidationError> {
        if let Some(card) = self.lookup(answers) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("scorecard cache hit");
            return Ok(card);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("scorecard cache miss");
        let card = Arc::new(self.inner.score(answers)?);

        // Poisoned lock: skip memoization.
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(answers.clone(), Arc::clone(&card));
        }
        Ok(card)
    }

    fn lookup(&self, answers: &AnswerSet) -> Option<Arc<Scorecard>> {
        self.entries.lock().ok()?.get(answers).cloned()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
