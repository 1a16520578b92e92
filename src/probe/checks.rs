//! Response classification for each probe check.
//!
//! Everything here is pure: a status code and body go in, a [`CheckRecord`]
//! or [`Registration`] comes out. The HTTP side lives in [`super::BackendProbe`].

use super::RequestError;
use crate::runner::state::CheckRecord;
use serde_json::Value;

/// Error codes a backend may use for "account already exists"
const DUPLICATE_ACCOUNT_CODES: &[&str] = &[
    "email_exists",
    "user_already_exists",
    "EMAIL_ALREADY_REGISTERED",
    "23505",
];

const DUPLICATE_ACCOUNT_PHRASES: &[&str] = &["already registered", "already exists"];

/// Outcome of the registration call
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Registered { token: String },
    AlreadyExists,
    Failed { message: String },
}

/// Classify `POST /api/auth/register`
pub fn classify_registration(status: u16, body: &str) -> Registration {
    match status {
        200 => match extract_token(body) {
            Some(token) => Registration::Registered { token },
            None => Registration::Failed {
                message: "Registration succeeded but no access_token was returned".to_string(),
            },
        },
        400 if is_duplicate_account(body) => Registration::AlreadyExists,
        _ => Registration::Failed {
            message: format!("Registration failed: {} - {}", status, body),
        },
    }
}

/// Decide whether a 400 registration body means the account already exists.
///
/// A structured `code` field is authoritative when present. Without one the
/// error text is matched, and an empty body falls back to the status code
/// alone. Both fallbacks are weaker than a code: a backend that rewords its
/// message or returns a bare 400 for other reasons will be misread.
pub fn is_duplicate_account(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        log::debug!("empty 400 body on registration, assuming duplicate account");
        return true;
    }

    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        if let Some(code) = json.get("code").and_then(code_as_string) {
            return DUPLICATE_ACCOUNT_CODES.contains(&code.as_str());
        }
        let text = ["error", "message", "msg"]
            .iter()
            .find_map(|k| json.get(*k).and_then(Value::as_str));
        if let Some(text) = text {
            return mentions_duplicate(text);
        }
    }

    mentions_duplicate(trimmed)
}

fn code_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn mentions_duplicate(text: &str) -> bool {
    let lower = text.to_lowercase();
    DUPLICATE_ACCOUNT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Pull `access_token` out of an auth response body
pub fn extract_token(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn classify_health(name: &str, status: u16) -> CheckRecord {
    let record = if status == 200 {
        CheckRecord::pass(name, "API is responding")
    } else {
        CheckRecord::fail(name, format!("API returned {}", status))
    };
    record.with_status(status)
}

/// Retrieval endpoints must answer 200 with a JSON array
pub fn classify_location_list(name: &str, status: u16, body: &str) -> CheckRecord {
    let record = match status {
        200 => match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(items)) => {
                CheckRecord::pass(name, format!("Returned array with {} items", items.len()))
                    .with_details(Value::Array(items))
            }
            Ok(other) => {
                CheckRecord::fail(name, format!("Expected array, got {}", json_kind(&other)))
                    .with_details(other)
            }
            Err(_) => CheckRecord::fail(name, "Invalid JSON response").with_details(text(body)),
        },
        401 => CheckRecord::fail(name, "Authentication required").with_details(text(body)),
        403 => CheckRecord::fail(name, "Admin access required").with_details(text(body)),
        404 => CheckRecord::fail(name, "Endpoint not found - route may not exist")
            .with_details(text(body)),
        500 => CheckRecord::fail(name, "500 Internal Server Error - route order fix failed")
            .with_details(text(body)),
        other => CheckRecord::fail(name, format!("Unexpected status {}", other))
            .with_details(text(body)),
    };
    record.with_status(status)
}

/// Update endpoints pass on 200 whether or not the body is JSON
pub fn classify_location_update(name: &str, status: u16, body: &str) -> CheckRecord {
    let record = match status {
        200 => match serde_json::from_str::<Value>(body) {
            Ok(json) => CheckRecord::pass(name, "Location update successful").with_details(json),
            Err(_) => CheckRecord::pass(name, "Location update successful (non-JSON response)")
                .with_details(text(body)),
        },
        401 => CheckRecord::fail(name, "Authentication required").with_details(text(body)),
        404 => CheckRecord::fail(name, "Endpoint not found").with_details(text(body)),
        other => CheckRecord::fail(name, format!("Status {}", other)).with_details(text(body)),
    };
    record.with_status(status)
}

/// A lookup with an unknown id may succeed or 404, but a 500 means the
/// wildcard route shadowed a specific one or crashed on the id.
pub fn classify_wildcard_route(name: &str, status: u16, body: &str) -> CheckRecord {
    let record = match status {
        200 | 404 => {
            CheckRecord::pass(name, format!("Wildcard route handled correctly: {}", status))
        }
        500 => CheckRecord::fail(name, "500 error suggests route order issue")
            .with_details(text(body)),
        other => CheckRecord::pass(name, format!("Unexpected but non-500 status: {}", other)),
    };
    record.with_status(status)
}

/// Request that produced no usable reply. A failed body read keeps the
/// status that was already received.
pub fn request_failed(name: &str, prefix: &str, err: &RequestError) -> CheckRecord {
    match err {
        RequestError::Transport(source) => CheckRecord::fail(
            name,
            format!("{}: {} ({})", prefix, source, error_kind(source)),
        ),
        RequestError::Body { status, source } => CheckRecord::fail(
            name,
            format!(
                "Body read failed (HTTP {}): {} ({})",
                status,
                source,
                error_kind(source)
            ),
        )
        .with_status(*status),
    }
}

fn error_kind(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection error"
    } else {
        "request error"
    }
}

fn text(body: &str) -> Value {
    Value::String(body.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
