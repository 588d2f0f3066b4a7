use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counters for one page load. Nothing here outlives the page.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub started_at: DateTime<Utc>,
    started_at_ms: u64,
    block_count: u32,
}

impl SessionState {
    pub fn begin(now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            started_at_ms: now_ms,
            block_count: 0,
        }
    }

    /// Whole seconds since the script started, floored.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms) / 1000
    }

    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Count a new block and return its occurrence number.
    pub fn record_block(&mut self) -> u32 {
        self.block_count = self.block_count.saturating_add(1);
        self.block_count
    }

    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            started_at: self.started_at,
            elapsed_secs: self.elapsed_secs(now_ms),
            block_count: self.block_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
    pub block_count: u32,
}
