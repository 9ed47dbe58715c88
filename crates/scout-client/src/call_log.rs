use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

pub const DEFAULT_CALL_LOG_CAPACITY: usize = 500;

/// Label recorded for calls that produced no usable answer.
pub const FAILED_CLASSIFICATION: &str = "Error";

/// One ScoutGPT round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_id: Option<String>,
    pub county: Option<String>,
    /// Set when the call covered exactly one property
    pub property_id: Option<String>,
    pub properties: usize,
    pub classification: String,
    pub confidence: f64,
    pub processing_time_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

/// What the client knows about a call once it has finished.
#[derive(Debug, Clone, Default)]
pub struct CallOutcome {
    pub endpoint: String,
    pub request_id: Option<String>,
    pub county: Option<String>,
    pub property_ids: Vec<String>,
    pub classification: Option<String>,
    pub confidence: f64,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallStatistics {
    pub total_calls: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub average_processing_time_ms: f64,
    pub classification_breakdown: BTreeMap<String, usize>,
}

struct Inner {
    entries: VecDeque<CallRecord>,
    next_id: u64,
}

/// Bounded in-memory history of ScoutGPT calls. Oldest entries are dropped
/// once `capacity` is reached. Clones share the same history.
#[derive(Clone)]
pub struct CallLog {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
}

impl Default for CallLog {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_LOG_CAPACITY)
    }
}

impl CallLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_CALL_LOG_CAPACITY)),
                next_id: 1,
            })),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn record(&self, outcome: CallOutcome) -> CallRecord {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let success = outcome.error.is_none();
        let property_id = match outcome.property_ids.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        let record = CallRecord {
            id,
            timestamp: Utc::now(),
            endpoint: outcome.endpoint,
            request_id: outcome.request_id,
            county: outcome.county,
            property_id,
            properties: outcome.property_ids.len(),
            classification: match (success, outcome.classification) {
                (true, Some(label)) if !label.is_empty() => label,
                (true, _) => "Unknown".to_string(),
                (false, _) => FAILED_CLASSIFICATION.to_string(),
            },
            confidence: if success { outcome.confidence } else { 0.0 },
            processing_time_ms: outcome.processing_time_ms,
            success,
            error: outcome.error,
        };

        inner.entries.push_back(record.clone());
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
        }
        record
    }

    /// Newest first, optionally limited to one property.
    pub async fn recent(&self, property_id: Option<&str>, limit: usize) -> Vec<CallRecord> {
        let inner = self.inner.lock().await;
        inner
            .entries
            .iter()
            .rev()
            .filter(|r| property_id.map_or(true, |id| r.property_id.as_deref() == Some(id)))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn statistics(&self) -> CallStatistics {
        let inner = self.inner.lock().await;
        let total_calls = inner.entries.len();
        let successful_calls = inner.entries.iter().filter(|r| r.success).count();

        let mut classification_breakdown = BTreeMap::new();
        for record in &inner.entries {
            *classification_breakdown
                .entry(record.classification.clone())
                .or_insert(0) += 1;
        }

        let average_processing_time_ms = if total_calls == 0 {
            0.0
        } else {
            inner
                .entries
                .iter()
                .map(|r| r.processing_time_ms as f64)
                .sum::<f64>()
                / total_calls as f64
        };

        CallStatistics {
            total_calls,
            successful_calls,
            failed_calls: total_calls - successful_calls,
            average_processing_time_ms,
            classification_breakdown,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(id: &str, label: &str, ms: u64) -> CallOutcome {
        CallOutcome {
            endpoint: "http://scout/api/analyze".to_string(),
            property_ids: vec![id.to_string()],
            classification: Some(label.to_string()),
            confidence: 0.8,
            processing_time_ms: ms,
            ..Default::default()
        }
    }

    fn failed(id: &str, ms: u64) -> CallOutcome {
        CallOutcome {
            property_ids: vec![id.to_string()],
            processing_time_ms: ms,
            confidence: 0.7,
            error: Some("connection refused".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_record_assigns_ids_and_labels_failures() {
        let log = CallLog::new(10);
        let first = log.record(ok("P-1", "Buy", 100)).await;
        let second = log.record(failed("P-2", 50)).await;

        assert_eq!(first.id, 1);
        assert_eq!(first.property_id.as_deref(), Some("P-1"));
        assert!(first.success);
        assert_eq!(second.id, 2);
        assert_eq!(second.classification, FAILED_CLASSIFICATION);
        assert_eq!(second.confidence, 0.0);
        assert!(!second.success);
    }

    #[tokio::test]
    async fn test_batch_calls_have_no_single_property() {
        let log = CallLog::new(10);
        let mut outcome = ok("A", "Hold", 10);
        outcome.property_ids.push("B".to_string());
        let record = log.record(outcome).await;
        assert_eq!(record.property_id, None);
        assert_eq!(record.properties, 2);
    }

    #[tokio::test]
    async fn test_capacity_drops_oldest() {
        let log = CallLog::new(2);
        for id in ["A", "B", "C"] {
            log.record(ok(id, "Hold", 1)).await;
        }
        let recent = log.recent(None, 10).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].property_id.as_deref(), Some("C"));
        assert_eq!(recent[1].property_id.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_recent_filters_by_property() {
        let log = CallLog::default();
        log.record(ok("A", "Buy", 1)).await;
        log.record(ok("B", "Hold", 1)).await;
        log.record(ok("A", "Watch", 1)).await;

        let for_a = log.recent(Some("A"), 10).await;
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].classification, "Watch");
        assert_eq!(log.recent(Some("A"), 1).await.len(), 1);
        assert!(log.recent(Some("Z"), 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_statistics() {
        let log = CallLog::default();
        assert_eq!(log.statistics().await, CallStatistics::default());

        log.record(ok("A", "Buy", 100)).await;
        log.record(ok("B", "Buy", 200)).await;
        log.record(failed("C", 300)).await;

        let stats = log.statistics().await;
        assert_eq!(stats.total_calls, 3);
        assert_eq!(stats.successful_calls, 2);
        assert_eq!(stats.failed_calls, 1);
        assert_eq!(stats.average_processing_time_ms, 200.0);
        assert_eq!(stats.classification_breakdown["Buy"], 2);
        assert_eq!(stats.classification_breakdown["Error"], 1);
    }
}
