pub mod console;
pub mod state;

use crate::probe::BackendProbe;
use crate::report::{self, types::ProbeReport};
use crate::utils::config::ProbeConfig;
use anyhow::{Context, Result};
use std::path::Path;

pub use state::*;

/// Run the endpoint probe, optionally writing JSON and JUnit reports
pub async fn run_probe(config: ProbeConfig, output: &Path, write_reports: bool) -> Result<ProbeReport> {
    let probe = BackendProbe::new(config).context("Failed to create HTTP client")?;
    let report = probe.run().await;

    if write_reports {
        report::write_all(&report, output)
            .with_context(|| format!("Failed to write reports to {}", output.display()))?;
    }

    Ok(report)
}
