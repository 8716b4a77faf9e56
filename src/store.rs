//! Analysis history
//!
//! Append-only store of conversation analyses. Each record keeps the summary
//! and the submitted payload so both can be reconstructed exactly. The store
//! snapshots to JSON for persistence between runs.

use crate::conversation::types::ConversationSummary;
use crate::error::{ComputeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// File name recorded when the caller supplies none
pub const DEFAULT_FILE_NAME: &str = "messages.json";

/// Default number of records returned by `list_recent`
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// A stored analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: u64,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub summary: ConversationSummary,
    pub conversation: Value,
}

/// A stored analysis without its conversation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisListing {
    pub id: u64,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub summary: ConversationSummary,
}

impl From<&AnalysisRecord> for AnalysisListing {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id,
            file_name: record.file_name.clone(),
            created_at: record.created_at,
            summary: record.summary.clone(),
        }
    }
}

/// Append-only analysis store with auto-incrementing ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStore {
    records: Vec<AnalysisRecord>,
    /// Id handed to the next insert; never reused
    next_id: u64,
    #[serde(default = "default_list_limit")]
    list_limit: usize,
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for AnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisStore {
    /// Create an empty store; the first record gets id 1
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Change how many records `list_recent` returns
    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    /// Append an analysis and return the stored record
    pub fn insert(
        &mut self,
        file_name: Option<&str>,
        summary: ConversationSummary,
        conversation: Value,
    ) -> &AnalysisRecord {
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        let id = self.next_id;
        self.next_id += 1;

        debug!(id, file_name = %file_name, "storing analysis");
        self.records.push(AnalysisRecord {
            id,
            file_name,
            created_at: Utc::now(),
            summary,
            conversation,
        });

        &self.records[self.records.len() - 1]
    }

    /// Look up a record by id
    pub fn get(&self, id: u64) -> Result<&AnalysisRecord> {
        // Ids are assigned in insertion order
        self.records
            .binary_search_by_key(&id, |record| record.id)
            .map(|index| &self.records[index])
            .map_err(|_| ComputeError::NotFound(id))
    }

    /// Most recent analyses first, up to the list limit
    pub fn list_recent(&self) -> Vec<AnalysisListing> {
        self.records
            .iter()
            .rev()
            .take(self.list_limit)
            .map(AnalysisListing::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restore a store from a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let store: Self = serde_json::from_str(json)
            .map_err(|e| ComputeError::StoreError(format!("Failed to load analyses: {}", e)))?;

        let max_id = store.records.iter().map(|record| record.id).max().unwrap_or(0);
        let ordered = store.records.windows(2).all(|pair| pair[0].id < pair[1].id);
        if !ordered || store.next_id <= max_id {
            return Err(ComputeError::StoreError(
                "Snapshot ids are not strictly increasing".to_string(),
            ));
        }

        debug!(records = store.records.len(), "loaded analysis store");
        Ok(store)
    }

    /// Snapshot the store to JSON
    pub fn to_json(&self) -> Result<String> {
        debug!(records = self.records.len(), "saving analysis store");
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::types::{ConversationTotals, ParticipantMetrics, ParticipantPair};
    use crate::conversation::ConversationAnalyzer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn make_summary(total: u64) -> ConversationSummary {
        let names = ["A".to_string(), "B".to_string()];
        ConversationSummary {
            participants: names.clone(),
            totals: ConversationTotals {
                total_messages: total,
            },
            metrics: ParticipantMetrics {
                message_counts: ParticipantPair::filled(&names, total / 2),
                average_response_minutes: ParticipantPair::filled(&names, 1.0 / 3.0),
                average_sentiment: ParticipantPair::filled(&names, -2.5),
            },
        }
    }

    #[test]
    fn test_ids_auto_increment() {
        let mut store = AnalysisStore::new();
        assert_eq!(store.insert(None, make_summary(2), json!({})).id, 1);
        assert_eq!(store.insert(None, make_summary(4), json!({})).id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_file_name_defaults_and_trims() {
        let mut store = AnalysisStore::new();
        let mut stored_name = |name: Option<&str>| {
            store.insert(name, make_summary(1), json!({})).file_name.clone()
        };
        assert_eq!(stored_name(None), DEFAULT_FILE_NAME);
        assert_eq!(stored_name(Some("   ")), DEFAULT_FILE_NAME);
        assert_eq!(stored_name(Some(" chat.json ")), "chat.json");
    }

    #[test]
    fn test_get_and_not_found() {
        let mut store = AnalysisStore::new();
        store.insert(Some("a.json"), make_summary(2), json!({ "k": 1 }));
        store.insert(Some("b.json"), make_summary(4), json!({ "k": 2 }));

        assert_eq!(store.get(2).unwrap().file_name, "b.json");
        assert!(matches!(store.get(3), Err(ComputeError::NotFound(3))));
        assert!(matches!(store.get(0), Err(ComputeError::NotFound(0))));
    }

    #[test]
    fn test_list_recent_newest_first_with_limit() {
        let mut store = AnalysisStore::new().with_list_limit(2);
        for total in 1..=3 {
            store.insert(None, make_summary(total), json!({}));
        }

        let ids: Vec<u64> = store.list_recent().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_snapshot_roundtrip_is_lossless() {
        let mut store = AnalysisStore::new();
        let conversation = json!({
            "participants": [{ "name": "A" }, { "name": "B" }],
            "messages": [{ "sender_name": "A", "timestamp_ms": 1700000000123u64, "content": "hi" }],
            "ratio": 0.1
        });
        store.insert(Some("chat.json"), make_summary(7), conversation.clone());

        let restored = AnalysisStore::from_json(&store.to_json().unwrap()).unwrap();
        let record = restored.get(1).unwrap();
        assert_eq!(record, store.get(1).unwrap());
        assert_eq!(record.conversation, conversation);
        assert_eq!(
            record.summary.metrics.average_response_minutes.get("A"),
            Some(&(1.0 / 3.0))
        );
    }

    #[test]
    fn test_snapshot_keeps_float_bits() {
        let conversation = json!({
            "participants": [{ "name": "A" }, { "name": "B" }],
            "messages": [
                { "sender_name": "A", "timestamp_ms": 0 },
                { "sender_name": "B", "timestamp_ms": 1994 },
                { "sender_name": "A", "timestamp_ms": 1995 },
                { "sender_name": "B", "timestamp_ms": 2070 },
                { "sender_name": "A", "timestamp_ms": 4000 },
                { "sender_name": "B", "timestamp_ms": 4107 }
            ]
        });
        let mut store = AnalysisStore::new();
        ConversationAnalyzer::new()
            .analyze_and_record(&mut store, None, conversation)
            .unwrap();

        let restored = AnalysisStore::from_json(&store.to_json().unwrap()).unwrap();
        let before = &store.get(1).unwrap().summary.metrics;
        let after = &restored.get(1).unwrap().summary.metrics;
        for name in ["A", "B"] {
            assert_eq!(
                after.average_response_minutes.get(name).unwrap().to_bits(),
                before.average_response_minutes.get(name).unwrap().to_bits()
            );
        }
        assert_eq!(restored.get(1).unwrap(), store.get(1).unwrap());

        for value in [110253.83825833937_f64, 0.012088888888888887, 1e-300, 0.1 + 0.2] {
            let text = serde_json::to_string(&value).unwrap();
            assert_eq!(serde_json::from_str::<f64>(&text).unwrap().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_ids_not_reused_after_reload() {
        let mut store = AnalysisStore::new();
        store.insert(None, make_summary(1), json!({}));
        store.insert(None, make_summary(1), json!({}));

        let mut restored = AnalysisStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored.insert(None, make_summary(1), json!({})).id, 3);
    }

    #[test]
    fn test_corrupt_snapshot_rejected() {
        assert!(matches!(
            AnalysisStore::from_json("not json"),
            Err(ComputeError::StoreError(_))
        ));

        let mut store = AnalysisStore::new();
        store.insert(None, make_summary(1), json!({}));
        let mut snapshot: Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        snapshot["next_id"] = json!(1);

        assert!(matches!(
            AnalysisStore::from_json(&snapshot.to_string()),
            Err(ComputeError::StoreError(_))
        ));
    }
}
