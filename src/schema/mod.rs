//! Schema verification against the hosted PostgREST backend
//!
//! Each expected table is read with a bounded query. Presence is reported as
//! an explicit [`TableProbe`] rather than through errors; the first missing
//! table stops the scan.

use crate::utils::config::SchemaConfig;
use colored::Colorize;

/// Tables the POS backend relies on, in the order they are checked
pub const EXPECTED_TABLES: [&str; 3] = ["profiles", "categories", "products"];

pub const DEFAULT_LOGIN_EMAIL: &str = "superadmin@pos.com";
pub const DEFAULT_LOGIN_PASSWORD: &str = "admin123";
pub const SCHEMA_FILE: &str = "database_schema.sql";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableProbe {
    Present { rows: usize },
    Missing { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    Ready { counts: Vec<TableCount> },
    NeedsSetup { table: &'static str, reason: String },
}

pub struct SchemaVerifier {
    config: SchemaConfig,
    client: reqwest::Client,
}

impl SchemaVerifier {
    pub fn new(config: SchemaConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Bounded read of one table. Never returns an error: every failure is a
    /// `Missing` with the reason.
    pub async fn probe_table(&self, table: &str, limit: usize) -> TableProbe {
        // profiles only needs to exist; the catalogue tables need a count
        let select = if table == "profiles" { "id" } else { "*" };
        let url = format!("{}/rest/v1/{}", self.config.service_url, table);
        let limit = limit.to_string();
        log::debug!("GET {} (select={}, limit={})", url, select, limit);

        let res = match self
            .client
            .get(&url)
            .query(&[("select", select), ("limit", limit.as_str())])
            .header("apikey", self.config.access_key.as_str())
            .bearer_auth(&self.config.access_key)
            .header("Prefer", "count=exact")
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                return TableProbe::Missing {
                    reason: format!("request to {} failed: {}", table, e),
                }
            }
        };

        let status = res.status();
        let total = res
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => {
                return TableProbe::Missing {
                    reason: format!("failed to read {} response: {}", table, e),
                }
            }
        };

        if !status.is_success() {
            log::debug!("{} -> {}: {}", url, status, body);
            return TableProbe::Missing {
                reason: format!("{} returned {}: {}", table, status.as_u16(), body.trim()),
            };
        }

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(serde_json::Value::Array(rows)) => TableProbe::Present {
                rows: total.unwrap_or(rows.len()),
            },
            _ => TableProbe::Missing {
                reason: format!("{} did not return a row array", table),
            },
        }
    }

    /// Check every expected table, stopping at the first missing one
    pub async fn verify(&self) -> SchemaStatus {
        let mut counts = Vec::with_capacity(EXPECTED_TABLES.len());

        for table in EXPECTED_TABLES {
            let limit = if table == "profiles" {
                1
            } else {
                self.config.row_cap
            };
            match self.probe_table(table, limit).await {
                TableProbe::Present { rows } => counts.push(TableCount { table, rows }),
                TableProbe::Missing { reason } => {
                    log::warn!("table {} unavailable: {}", table, reason);
                    return SchemaStatus::NeedsSetup { table, reason };
                }
            }
        }

        SchemaStatus::Ready { counts }
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-24/3573` or `*/0`
pub fn parse_content_range(value: &str) -> Option<usize> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// Console lines for a verification outcome
pub fn render_status(status: &SchemaStatus) -> Vec<String> {
    match status {
        SchemaStatus::Ready { counts } => {
            let mut lines = vec!["✓ Database tables exist!".to_string()];
            for count in counts {
                lines.push(format!("  - Found {} {}", count.rows, count.table));
            }
            lines.push(String::new());
            lines.push("✓ Database is ready!".to_string());
            lines.push(String::new());
            lines.push("--- Default Login ---".to_string());
            lines.push(format!("Email: {}", DEFAULT_LOGIN_EMAIL));
            lines.push(format!("Password: {}", DEFAULT_LOGIN_PASSWORD));
            lines.push(String::new());
            lines.push(format!(
                "To setup database, run the SQL in {} in Supabase SQL Editor",
                SCHEMA_FILE
            ));
            lines
        }
        SchemaStatus::NeedsSetup { table, reason } => vec![
            String::new(),
            "⚠ Database tables may not exist yet.".to_string(),
            format!("Unreadable table: {}", table),
            format!("Error: {}", reason),
            String::new(),
            "--- SETUP INSTRUCTIONS ---".to_string(),
            "1. Go to Supabase Dashboard: https://supabase.com/dashboard".to_string(),
            "2. Select your project".to_string(),
            "3. Go to SQL Editor (left sidebar)".to_string(),
            format!("4. Copy the contents of '{}' file", SCHEMA_FILE),
            "5. Paste and run in SQL Editor".to_string(),
            "6. Run this script again to verify".to_string(),
        ],
    }
}

pub fn print_status(status: &SchemaStatus) {
    let ready = matches!(status, SchemaStatus::Ready { .. });
    for line in render_status(status) {
        if line.starts_with('✓') {
            println!("{}", line.green());
        } else if line.starts_with('⚠') {
            println!("{}", line.yellow());
        } else if !ready && line.starts_with("Error:") {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}
