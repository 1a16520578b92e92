use crate::runner::state::{CheckRecord, RunSummary};
use serde::{Deserialize, Serialize};

/// Probe results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub session_id: String,
    pub backend_url: String,
    pub records: Vec<CheckRecord>,
    pub summary: RunSummary,
    pub generated_at: String,
}

impl ProbeReport {
    pub fn new(
        session_id: String,
        backend_url: String,
        records: Vec<CheckRecord>,
        summary: RunSummary,
    ) -> Self {
        Self {
            session_id,
            backend_url,
            records,
            summary,
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }

    /// First record produced by the named check
    pub fn record(&self, name: &str) -> Option<&CheckRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }
}
