pub mod json;
pub mod junit;
pub mod types;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a saved `results.json`
pub fn load(results_path: &Path) -> Result<types::ProbeReport, ReportError> {
    let raw = std::fs::read_to_string(results_path).map_err(|source| ReportError::Io {
        path: results_path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Generate report from saved probe results
pub fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<(), ReportError> {
    let report = load(results_path)?;

    match format {
        "json" => json::generate(&report, output),
        "junit" | "xml" => {
            let xml = junit::generate_junit_xml(&report)?;
            if let Some(path) = output {
                write_file(path, &xml)?;
                println!("JUnit report saved to: {}", path.display());
            } else {
                println!("{}", xml);
            }
            Ok(())
        }
        other => Err(ReportError::UnknownFormat(other.to_string())),
    }
}

/// Write `results.json` and `junit.xml` into `output_dir`, creating it
pub fn write_all(report: &types::ProbeReport, output_dir: &Path) -> Result<(), ReportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let json_path = output_dir.join("results.json");
    json::generate(report, Some(&json_path))?;
    junit::write_report(report, output_dir)
}
