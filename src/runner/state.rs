use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of a single probe check. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub details: Option<serde_json::Value>,
    /// Status code observed, when a response was received at all
    pub http_status: Option<u16>,
    pub timestamp: DateTime<Local>,
}

impl CheckRecord {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, true, message.into())
    }

    pub fn fail(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, false, message.into())
    }

    fn new(name: &str, success: bool, message: String) -> Self {
        Self {
            name: name.to_string(),
            success,
            message,
            details: None,
            http_status: None,
            timestamp: Local::now(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Ordered, append-only log of check outcomes for one run
#[derive(Debug)]
pub struct ResultLog {
    pub session_id: String,
    records: Vec<CheckRecord>,
    started_at: Instant,
}

impl ResultLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            records: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn push(&mut self, record: CheckRecord) -> &CheckRecord {
        self.records.push(record);
        // push above guarantees a last element
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    pub fn into_records(self) -> Vec<CheckRecord> {
        self.records
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Critical results plus pass/fail counts for the summary block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub authenticated: bool,
    pub retrieval_working: bool,
    pub update_working: bool,
    /// No check observed an HTTP 500
    pub route_order_clean: bool,
    /// Health check failed and nothing else ran
    pub aborted: bool,
    pub total_duration_ms: Option<u64>,
}

impl RunSummary {
    pub fn from_records(records: &[CheckRecord]) -> Self {
        let passed = records.iter().filter(|r| r.success).count() as u32;
        let total = records.len() as u32;

        Self {
            total,
            passed,
            failed: total - passed,
            authenticated: false,
            retrieval_working: false,
            update_working: false,
            route_order_clean: !records.iter().any(|r| r.http_status == Some(500)),
            aborted: false,
            total_duration_ms: None,
        }
    }

    /// Retrieval must work; updates must work only when authentication did.
    /// The wildcard routing check never gates the result.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.retrieval_working && (!self.authenticated || self.update_working)
    }
}
