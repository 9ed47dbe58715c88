use std::time::{Duration, Instant};

use dashmap::DashMap;
use property_core::{AnalysisResult, SignalSet};

struct CachedAnalysis {
    signals: SignalSet,
    analysis: AnalysisResult,
    stored_at: Instant,
}

/// Per-property analysis cache. An entry is served only while it is younger
/// than the TTL and the freshly derived signals are identical to the ones it
/// was computed from, so edited records are always re-analyzed.
pub struct AnalysisCache {
    entries: DashMap<String, CachedAnalysis>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, signals: &SignalSet) -> Option<AnalysisResult> {
        let hit = self.entries.get(&signals.property_id).map(|entry| {
            (entry.stored_at.elapsed() <= self.ttl && entry.signals == *signals)
                .then(|| entry.analysis.clone())
        })?;

        if hit.is_none() {
            self.entries.remove(&signals.property_id);
        }
        hit
    }

    pub fn insert(&self, signals: &SignalSet, analysis: &AnalysisResult) {
        if signals.property_id.is_empty() {
            return;
        }
        self.entries.insert(
            signals.property_id.clone(),
            CachedAnalysis {
                signals: signals.clone(),
                analysis: analysis.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
