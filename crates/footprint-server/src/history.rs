//! Search-history sink.
//!
//! The engine's only persistence need is a "record completed search" seam;
//! the storage schema belongs to whoever implements the sink. The in-memory
//! implementation backs tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Compact record of one completed search.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub id: Uuid,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub platforms_found: usize,
    pub exposure_score: f64,
}

/// Archive sink for completed searches. Implementations must tolerate being
/// called concurrently; recording failures are theirs to log, not to raise.
#[async_trait]
pub trait SearchHistorySink: Send + Sync {
    async fn record(&self, record: SearchRecord);
}

/// Keeps records in process memory, newest last.
#[derive(Default)]
pub struct InMemoryHistory {
    records: Mutex<Vec<SearchRecord>>,
}

impl InMemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SearchRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl SearchHistorySink for InMemoryHistory {
    async fn record(&self, record: SearchRecord) {
        self.records.lock().await.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_accumulate_in_order() {
        let history = InMemoryHistory::new();
        for (i, name) in ["first", "second"].iter().enumerate() {
            history
                .record(SearchRecord {
                    id: Uuid::new_v4(),
                    username: (*name).to_owned(),
                    timestamp: Utc::now(),
                    platforms_found: i,
                    exposure_score: 0.0,
                })
                .await;
        }
        let records = history.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].username, "first");
        assert_eq!(records[1].username, "second");
    }
}
