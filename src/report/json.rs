use super::types::ProbeReport;
use super::ReportError;
use std::path::Path;

/// Render the report as pretty JSON to a file or stdout
pub fn generate(report: &ProbeReport, output: Option<&Path>) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        super::write_file(path, &json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
