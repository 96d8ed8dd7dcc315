//! Core model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// HTTP method of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Methods that carry a request body.
    pub fn is_mutating(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// Unit of a target's probe interval.
///
/// Unrecognized units deserialize to `Minutes`, which is also the default
/// when the field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum IntervalUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
}

impl From<String> for IntervalUnit {
    fn from(s: String) -> Self {
        match s.as_str() {
            "seconds" => IntervalUnit::Seconds,
            "hours" => IntervalUnit::Hours,
            _ => IntervalUnit::Minutes,
        }
    }
}

/// A monitored API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetConfig {
    /// Stable identity, immutable once created.
    pub id: i64,
    pub name: String,
    /// URL template; may contain `{{VAR}}` placeholders.
    pub url: String,
    pub method: HttpMethod,
    /// JSON object text; may contain `{{VAR}}` placeholders.
    pub headers: String,
    /// JSON body text, used by mutating methods only.
    pub body: String,
    /// Interval magnitude, coerced to >= 1.
    pub interval: i64,
    pub interval_unit: IntervalUnit,
    pub enabled: bool,
    pub save_logs: bool,
    pub auth_id: Option<i64>,
    pub collection_id: Option<i64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            url: String::new(),
            method: HttpMethod::Get,
            headers: String::new(),
            body: String::new(),
            interval: 5,
            interval_unit: IntervalUnit::Minutes,
            enabled: false,
            save_logs: false,
            auth_id: None,
            collection_id: None,
        }
    }
}

/// Token acquisition strategy of an [`AuthConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthStrategy {
    /// POST a credential body to an endpoint and extract a token field.
    Automatic {
        endpoint: String,
        /// JSON text holding the credentials.
        credentials: String,
        /// Field to extract from the response, `token` by default.
        #[serde(default = "default_token_field")]
        token_field: String,
    },
    /// A manually supplied bearer token.
    Fixed { token: String },
}

pub fn default_token_field() -> String {
    "token".to_string()
}

/// An authentication configuration referenced by targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub strategy: AuthStrategy,
}

/// A substitution variable for `{{KEY}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub id: i64,
    pub key: String,
    pub value: String,
}

/// A grouping label for targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub name: String,
}

/// Probe outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Success,
    Error,
}

/// Failure detail attached to an error-classified result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeFailure {
    pub message: String,
    /// Transport-level code (`timeout`, `connect`, ...), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// HTTP status, when the failure carried a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Snapshot of the response, when one was received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub status: u16,
    pub body: serde_json::Value,
    pub headers: HashMap<String, String>,
}

/// The fully resolved request that was sent, kept for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSnapshot {
    pub url: String,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// One recorded probe execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Target name captured by value; renames do not relabel history.
    pub target_name: String,
    pub outcome: ProbeOutcome,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    pub request: RequestSnapshot,
    pub method: HttpMethod,
    /// The original URL template, before substitution.
    pub url: String,
}

/// Derived per-target counters, recomputed from the log set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStats {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    /// Percentage with one decimal, 0.0 when there are no entries.
    pub success_rate: f64,
    /// Rounded mean duration in ms, 0 when there are no entries.
    pub avg_duration_ms: i64,
}

/// Kind of a configuration lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryEventKind {
    Added,
    Updated,
    Deleted,
    Started,
    Stopped,
}

/// Details payload of a history entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDetails {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
}

/// One entry of the configuration audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: HistoryEventKind,
    pub details: HistoryDetails,
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Issue a monotonic, timestamp-derived identifier.
///
/// Epoch milliseconds, bumped past the previously issued value when two
/// calls land in the same millisecond.
pub fn next_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}
