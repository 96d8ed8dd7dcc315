//! Probe execution: one HTTP request per firing, classified into a result.

use crate::auth::AuthTokenManager;
use crate::config::PROBE_TIMEOUT;
use crate::env_subst::substitute;
use crate::store::{
    next_id, AuthConfig, EnvVar, HttpMethod, ProbeFailure, ProbeOutcome, ProbeResult,
    RequestSnapshot, ResponseSnapshot, TargetConfig,
};

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Builds and issues probe requests for targets.
///
/// `execute` never fails; every failure path is folded into an
/// error-classified [`ProbeResult`].
pub struct ProbeExecutor {
    http: reqwest::Client,
    auth: Arc<AuthTokenManager>,
}

impl ProbeExecutor {
    pub fn new(auth: Arc<AuthTokenManager>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, auth }
    }

    /// Execute one probe against the target.
    pub async fn execute(
        &self,
        target: &TargetConfig,
        auths: &[AuthConfig],
        env_vars: &[EnvVar],
    ) -> ProbeResult {
        let started_at = Utc::now();
        let clock = Instant::now();

        // Token first; skipped entirely when the target has no auth ref.
        let token = if target.auth_id.is_some() {
            self.auth.resolve_token(target, auths).await
        } else {
            None
        };

        let mut headers = parse_header_template(&target.headers, &target.name);

        // The resolved token always wins over a manually set header.
        if let Some(token) = &token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }

        let body = if target.method.is_mutating() && !target.body.trim().is_empty() {
            let substituted = substitute(&target.body, env_vars);
            match serde_json::from_str::<serde_json::Value>(&substituted) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(
                        "Body template for '{}' is not JSON, sending raw text: {}",
                        target.name,
                        e
                    );
                    Some(serde_json::Value::String(substituted))
                }
            }
        } else {
            None
        };

        let url = substitute(&target.url, env_vars);
        let mut headers = substitute_headers(headers, env_vars);

        let has_content_type =
            headers.contains_key("Content-Type") || headers.contains_key("content-type");
        if body.is_some() && !has_content_type {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        let request = RequestSnapshot {
            url: url.clone(),
            headers: headers.clone(),
            body: body.clone(),
        };

        let (outcome, error, response) = self.send(target.method, &url, &headers, &body).await;

        ProbeResult {
            id: next_id(),
            timestamp: started_at,
            target_name: target.name.clone(),
            outcome,
            duration_ms: clock.elapsed().as_millis() as i64,
            error,
            response,
            request,
            method: target.method,
            url: target.url.clone(),
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Option<serde_json::Value>,
    ) -> (
        ProbeOutcome,
        Option<ProbeFailure>,
        Option<ResponseSnapshot>,
    ) {
        let method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.http.request(method, url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = match body {
                serde_json::Value::String(raw) => builder.body(raw.clone()),
                other => builder.json(other),
            };
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                let failure = ProbeFailure {
                    message: e.to_string(),
                    code: Some(transport_code(&e).to_string()),
                    status: e.status().map(|s| s.as_u16()),
                };
                return (ProbeOutcome::Error, Some(failure), None);
            }
        };

        let status = response.status();
        let snapshot = snapshot_response(response).await;

        if status.is_success() {
            (ProbeOutcome::Success, None, Some(snapshot))
        } else {
            let failure = ProbeFailure {
                message: format!(
                    "request failed with status {}",
                    status.canonical_reason().map_or_else(
                        || status.as_u16().to_string(),
                        |r| format!("{} {}", status.as_u16(), r)
                    )
                ),
                code: None,
                status: Some(status.as_u16()),
            };
            (ProbeOutcome::Error, Some(failure), Some(snapshot))
        }
    }
}

/// Parse a header template into a string map; malformed JSON degrades to
/// empty headers.
fn parse_header_template(template: &str, target_name: &str) -> HashMap<String, String> {
    if template.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str::<HashMap<String, serde_json::Value>>(template) {
        Ok(map) => map
            .into_iter()
            .map(|(k, v)| (k, value_to_header_string(v)))
            .collect(),
        Err(e) => {
            tracing::warn!(
                "Header template for '{}' is not JSON, ignoring it: {}",
                target_name,
                e
            );
            HashMap::new()
        }
    }
}

fn value_to_header_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Apply variable substitution across the serialized header map.
///
/// The map is serialized to JSON text, substituted, then re-parsed. A value
/// that breaks JSON syntax corrupts the round-trip; that failure is
/// swallowed and the pre-substitution headers stay in place.
fn substitute_headers(
    headers: HashMap<String, String>,
    env_vars: &[EnvVar],
) -> HashMap<String, String> {
    if headers.is_empty() || env_vars.is_empty() {
        return headers;
    }
    let serialized = match serde_json::to_string(&headers) {
        Ok(s) => s,
        Err(_) => return headers,
    };
    let substituted = substitute(&serialized, env_vars);
    match serde_json::from_str::<HashMap<String, String>>(&substituted) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Variable substitution corrupted headers, keeping originals: {}", e);
            headers
        }
    }
}

fn transport_code(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_redirect() {
        "redirect"
    } else if e.is_builder() || e.is_request() {
        "request"
    } else if e.is_decode() {
        "decode"
    } else {
        "network"
    }
}

async fn snapshot_response(response: reqwest::Response) -> ResponseSnapshot {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    ResponseSnapshot {
        status,
        body,
        headers,
    }
}
