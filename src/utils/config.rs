use std::time::Duration;
use thiserror::Error;

/// Deployment the probe targets when no `--base-url` is given
pub const DEFAULT_BACKEND_URL: &str = "https://reload-resolver.preview.emergentagent.com";

/// Timeout applied to every HTTP call
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Upper bound on rows fetched per catalogue table
pub const DEFAULT_ROW_CAP: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Fixed account the probe registers (or logs in with) on every run
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub role: String,
}

impl Default for TestAccount {
    fn default() -> Self {
        Self {
            email: "gps.tester@posrider.com".to_string(),
            password: "TestPass123!".to_string(),
            full_name: "GPS Test User".to_string(),
            phone: "+6281234567890".to_string(),
            // GPS listing endpoints require an elevated role
            role: "admin".to_string(),
        }
    }
}

/// Endpoint probe configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Backend root, without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub account: TestAccount,

    /// Coordinates posted to the update endpoints (Jakarta)
    pub latitude: f64,
    pub longitude: f64,

    /// Identifier that matches no real rider, used against `/api/gps/{id}`
    pub synthetic_rider_id: String,
}

impl ProbeConfig {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_url("base URL", base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            ..Self::default()
        })
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            account: TestAccount::default(),
            latitude: -6.2088,
            longitude: 106.8456,
            synthetic_rider_id: "test-rider-123".to_string(),
        }
    }
}

/// Schema verifier configuration
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    pub service_url: String,
    pub access_key: String,
    pub row_cap: usize,
    pub timeout: Duration,
}

impl SchemaConfig {
    /// Both values are required; absence or emptiness is a configuration error.
    pub fn new(service_url: Option<String>, access_key: Option<String>) -> Result<Self, ConfigError> {
        let service_url = required("SUPABASE_URL", service_url)?;
        let access_key = required("SUPABASE_ANON_KEY", access_key)?;

        Ok(Self {
            service_url: normalize_url("SUPABASE_URL", &service_url)?,
            access_key,
            row_cap: DEFAULT_ROW_CAP,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = row_cap.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn normalize_url(name: &'static str, url: &str) -> Result<String, ConfigError> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("expected an http(s) URL, got '{}'", url),
        });
    }
    Ok(url.to_string())
}
