//! GPS endpoint probe
//!
//! Runs a fixed sequence of checks against a deployed backend and records the
//! outcome of each. Checks are awaited one after another; nothing is retried.

pub mod checks;

use crate::report::types::ProbeReport;
use crate::runner::console;
use crate::runner::state::{CheckRecord, ResultLog, RunSummary};
use crate::utils::config::ProbeConfig;
use checks::Registration;
use serde_json::json;
use thiserror::Error;

pub const HEALTH_CHECK: &str = "Health Check";
pub const USER_REGISTRATION: &str = "User Registration";
pub const USER_LOGIN: &str = "User Login";
pub const GPS_ALL: &str = "GPS All Endpoint";
pub const GPS_LOCATIONS: &str = "GPS Locations Endpoint";
pub const GPS_POST: &str = "GPS POST Endpoint";
pub const GPS_UPDATE: &str = "GPS Update Endpoint";
pub const WILDCARD_ROUTE: &str = "Wildcard Route Test";

/// Status code and body text of a completed request
type Reply = (u16, String);

/// Why a request produced no usable reply
#[derive(Debug, Error)]
pub enum RequestError {
    /// No response arrived (timeout, DNS, refused connection)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Headers arrived but the body could not be read
    #[error("HTTP {status}: {source}")]
    Body {
        status: u16,
        #[source]
        source: reqwest::Error,
    },
}

/// Probe session against one backend
pub struct BackendProbe {
    config: ProbeConfig,
    /// Shared across checks so the bearer token persists after login
    client: reqwest::Client,
    auth_token: Option<String>,
    log: ResultLog,
}

impl BackendProbe {
    pub fn new(config: ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config,
            client,
            auth_token: None,
            log: ResultLog::new(),
        })
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn records(&self) -> &[CheckRecord] {
        self.log.records()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Reply, RequestError> {
        self.send(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<Reply, RequestError> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Reply, RequestError> {
        let url = self.url(path);
        let spinner = console::spinner(&format!("{} {}", method, path));
        log::debug!("{} {}", method, url);

        let mut req = self.client.request(method, &url);
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let result = execute(req).await;

        spinner.finish_and_clear();
        match &result {
            Ok((status, _)) => log::debug!("{} -> {}", url, status),
            Err(e) => log::debug!("{} -> error: {}", url, e),
        }
        result
    }

    fn record(&mut self, record: CheckRecord) -> bool {
        console::print_record(&record);
        self.log.push(record).success
    }

    /// `GET /api/health`. A failure here ends the run.
    pub async fn check_health(&mut self) -> bool {
        let record = match self.get("/api/health").await {
            Ok((status, _)) => checks::classify_health(HEALTH_CHECK, status),
            // Only the status matters here
            Err(RequestError::Body { status, .. }) => {
                checks::classify_health(HEALTH_CHECK, status)
            }
            Err(e) => checks::request_failed(HEALTH_CHECK, "Connection failed", &e),
        };
        self.record(record)
    }

    /// Register the test account, falling back to a single login when the
    /// account already exists. Returns whether a token was obtained.
    pub async fn authenticate(&mut self) -> bool {
        let account = &self.config.account;
        let body = json!({
            "email": account.email,
            "password": account.password,
            "full_name": account.full_name,
            "phone": account.phone,
            "role": account.role,
        });

        let (status, text) = match self.post("/api/auth/register", body).await {
            Ok(reply) => reply,
            Err(e) => {
                return self.record(checks::request_failed(
                    USER_REGISTRATION,
                    "Registration error",
                    &e,
                ))
            }
        };

        match checks::classify_registration(status, &text) {
            Registration::Registered { token } => {
                self.auth_token = Some(token);
                self.record(
                    CheckRecord::pass(USER_REGISTRATION, "Test user registered successfully")
                        .with_status(status),
                )
            }
            Registration::AlreadyExists => {
                log::debug!("account already registered, logging in instead");
                self.login().await
            }
            Registration::Failed { message } => {
                self.record(CheckRecord::fail(USER_REGISTRATION, message).with_status(status))
            }
        }
    }

    async fn login(&mut self) -> bool {
        let account = &self.config.account;
        let body = json!({
            "email": account.email,
            "password": account.password,
        });

        let record = match self.post("/api/auth/login", body).await {
            Ok((200, text)) => {
                let record = match checks::extract_token(&text) {
                    Some(token) => {
                        self.auth_token = Some(token);
                        CheckRecord::pass(USER_LOGIN, "Test user logged in successfully")
                    }
                    None => CheckRecord::fail(
                        USER_LOGIN,
                        "Login succeeded but no access_token was returned",
                    ),
                };
                record.with_status(200)
            }
            Ok((status, text)) => {
                CheckRecord::fail(USER_LOGIN, format!("Login failed: {} - {}", status, text))
                    .with_status(status)
            }
            Err(e) => checks::request_failed(USER_LOGIN, "Login error", &e),
        };
        self.record(record)
    }

    /// GET an endpoint expected to return an array of rider locations
    pub async fn check_location_list(&mut self, name: &str, path: &str) -> bool {
        let record = match self.get(path).await {
            Ok((status, text)) => checks::classify_location_list(name, status, &text),
            Err(e) => checks::request_failed(name, "Request failed", &e),
        };
        self.record(record)
    }

    /// POST the configured coordinates to a location update endpoint
    pub async fn check_location_update(&mut self, name: &str, path: &str) -> bool {
        let body = json!({
            "latitude": self.config.latitude,
            "longitude": self.config.longitude,
        });
        let record = match self.post(path, body).await {
            Ok((status, text)) => checks::classify_location_update(name, status, &text),
            Err(e) => checks::request_failed(name, "Request failed", &e),
        };
        self.record(record)
    }

    /// GET the single-rider route with an id that matches nothing
    pub async fn check_wildcard_route(&mut self) -> bool {
        let path = format!("/api/gps/{}", self.config.synthetic_rider_id);
        let record = match self.get(&path).await {
            Ok((status, text)) => checks::classify_wildcard_route(WILDCARD_ROUTE, status, &text),
            Err(e) => checks::request_failed(WILDCARD_ROUTE, "Request failed", &e),
        };
        self.record(record)
    }

    /// Run the full sequence and produce the report
    pub async fn run(mut self) -> ProbeReport {
        console::print_header(&self.config.base_url);

        if !self.check_health().await {
            console::print_abort();
            let mut summary = RunSummary::from_records(self.log.records());
            summary.aborted = true;
            summary.total_duration_ms = Some(self.log.elapsed_ms());
            return self.into_report(summary);
        }

        let authenticated = self.authenticate().await;

        console::print_section("GPS Endpoint Tests");
        let all = self.check_location_list(GPS_ALL, "/api/gps/all").await;
        let locations = self
            .check_location_list(GPS_LOCATIONS, "/api/gps/locations")
            .await;

        let (posted, updated) = if authenticated {
            let posted = self.check_location_update(GPS_POST, "/api/gps").await;
            let updated = self.check_location_update(GPS_UPDATE, "/api/gps/update").await;
            (posted, updated)
        } else {
            console::print_skip_authenticated();
            (false, false)
        };

        self.check_wildcard_route().await;

        let mut summary = RunSummary::from_records(self.log.records());
        summary.authenticated = authenticated;
        summary.retrieval_working = all || locations;
        summary.update_working = posted || updated;
        summary.total_duration_ms = Some(self.log.elapsed_ms());

        console::print_summary(&summary);
        self.into_report(summary)
    }

    fn into_report(self, summary: RunSummary) -> ProbeReport {
        let session_id = self.log.session_id.clone();
        ProbeReport::new(
            session_id,
            self.config.base_url,
            self.log.into_records(),
            summary,
        )
    }
}

async fn execute(req: reqwest::RequestBuilder) -> Result<Reply, RequestError> {
    let res = req.send().await?;
    let status = res.status().as_u16();
    let text = res
        .text()
        .await
        .map_err(|source| RequestError::Body { status, source })?;
    Ok((status, text))
}
