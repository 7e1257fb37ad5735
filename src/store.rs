use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{FinancialProfile, RiskResult};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Records kept per owner before the oldest are evicted.
pub const DEFAULT_RETENTION_PER_OWNER: usize = 100;

/// A scored questionnaire as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub owner: String,
    pub assessment_data: FinancialProfile,
    #[serde(flatten)]
    pub result: RiskResult,
    pub created_at: DateTime<Utc>,
}

/// In-memory assessment documents, visible only to the owner that created them.
///
/// Nothing is persisted across restarts. Each owner keeps at most `retention`
/// records; inserting past that evicts their oldest.
#[derive(Debug)]
pub struct AssessmentStore {
    records: RwLock<HashMap<Uuid, AssessmentRecord>>,
    retention: usize,
}

impl Default for AssessmentStore {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION_PER_OWNER)
    }
}

impl AssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `retention` is clamped to at least one record per owner.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            retention: retention.max(1),
        }
    }

    pub async fn insert(
        &self,
        owner: &str,
        profile: FinancialProfile,
        result: RiskResult,
    ) -> AssessmentRecord {
        let record = AssessmentRecord {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            assessment_data: profile,
            result,
            created_at: Utc::now(),
        };
        let mut records = self.records.write().await;
        let mut older: Vec<(DateTime<Utc>, Uuid)> = records
            .values()
            .filter(|existing| existing.owner == owner)
            .map(|existing| (existing.created_at, existing.id))
            .collect();
        if older.len() >= self.retention {
            older.sort();
            let excess = older.len() + 1 - self.retention;
            for (_, id) in older.into_iter().take(excess) {
                records.remove(&id);
            }
        }
        records.insert(record.id, record.clone());
        record
    }

    /// Newest first, at most `limit` records.
    pub async fn history(&self, owner: &str, limit: usize) -> Vec<AssessmentRecord> {
        let records = self.records.read().await;
        let mut owned: Vec<AssessmentRecord> = records
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        owned.truncate(limit);
        owned
    }

    pub async fn get(&self, owner: &str, id: Uuid) -> Option<AssessmentRecord> {
        self.records
            .read()
            .await
            .get(&id)
            .filter(|record| record.owner == owner)
            .cloned()
    }

    /// Returns whether a record owned by `owner` was removed.
    pub async fn delete(&self, owner: &str, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(record) if record.owner == owner => {
                records.remove(&id);
                true
            }
            _ => false,
        }
    }
}
