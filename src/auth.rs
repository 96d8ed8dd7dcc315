//! Bearer token acquisition and caching.

use crate::config::AUTH_TIMEOUT;
use crate::store::{AuthConfig, AuthStrategy, TargetConfig};

use std::collections::HashMap;
use std::sync::RwLock;

/// Resolves and caches bearer tokens per target.
///
/// The cache is session-scoped and keyed by target id. Acquisition failures
/// fall back to the previously cached value instead of clearing it, so a
/// transient credential-endpoint outage does not blank out a working
/// probe's authorization.
pub struct AuthTokenManager {
    http: reqwest::Client,
    tokens: RwLock<HashMap<i64, String>>,
}

impl Default for AuthTokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthTokenManager {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(AUTH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a usable token for the target, or `None`.
    ///
    /// Never fails: missing auth configs and acquisition errors degrade to
    /// the cached token for the target id, if any.
    pub async fn resolve_token(
        &self,
        target: &TargetConfig,
        auths: &[AuthConfig],
    ) -> Option<String> {
        let auth_id = match target.auth_id {
            Some(id) => id,
            None => return self.cached(target.id),
        };

        let auth = match auths.iter().find(|a| a.id == auth_id) {
            Some(a) => a,
            None => {
                tracing::warn!(
                    "Target '{}' references missing auth config {}",
                    target.name,
                    auth_id
                );
                return self.cached(target.id);
            }
        };

        match &auth.strategy {
            AuthStrategy::Fixed { token } => {
                let token = normalize_bearer(token);
                if token.is_empty() {
                    return self.cached(target.id);
                }
                self.store(target.id, token.clone());
                Some(token)
            }
            AuthStrategy::Automatic {
                endpoint,
                credentials,
                token_field,
            } => match self.acquire(endpoint, credentials, token_field).await {
                Some(token) => {
                    tracing::info!("Acquired token for target '{}'", target.name);
                    self.store(target.id, token.clone());
                    Some(token)
                }
                None => self.cached(target.id),
            },
        }
    }

    /// POST the credential body and extract the token field.
    async fn acquire(&self, endpoint: &str, credentials: &str, token_field: &str) -> Option<String> {
        let body: serde_json::Value = if credentials.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(credentials).unwrap_or_else(|e| {
                tracing::warn!("Malformed credential body, sending empty object: {}", e);
                serde_json::json!({})
            })
        };

        let response = match self.http.post(endpoint).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Token request to {} failed: {}", endpoint, e);
                return None;
            }
        };

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Token response from {} was not JSON: {}", endpoint, e);
                return None;
            }
        };

        let field = if token_field.is_empty() { "token" } else { token_field };
        let raw = payload
            .get(field)
            .or_else(|| payload.get("access_token"))
            .or_else(|| payload.get("accessToken"))?;

        let token = match raw {
            serde_json::Value::String(s) => normalize_bearer(s),
            other => other.to_string(),
        };
        if token.is_empty() {
            tracing::warn!("Token field '{}' missing or empty in response", field);
            return None;
        }
        Some(token)
    }

    /// Drop every cached token.
    pub fn reset(&self) {
        self.tokens.write().unwrap().clear();
    }

    /// Drop the cached token for a single target.
    pub fn forget_target(&self, target_id: i64) {
        self.tokens.write().unwrap().remove(&target_id);
    }

    /// Drop cached tokens for every target referencing the deleted auth.
    pub fn invalidate_auth(&self, auth_id: i64, targets: &[TargetConfig]) {
        let mut tokens = self.tokens.write().unwrap();
        for target in targets {
            if target.auth_id == Some(auth_id) {
                tokens.remove(&target.id);
            }
        }
    }

    fn cached(&self, target_id: i64) -> Option<String> {
        self.tokens.read().unwrap().get(&target_id).cloned()
    }

    fn store(&self, target_id: i64, token: String) {
        self.tokens.write().unwrap().insert(target_id, token);
    }

    #[cfg(test)]
    pub fn seed(&self, target_id: i64, token: &str) {
        self.store(target_id, token.to_string());
    }
}

/// Strip a leading case-insensitive `bearer` prefix and whitespace.
pub fn normalize_bearer(token: &str) -> String {
    let trimmed = token.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("bearer") {
        if rest.starts_with(char::is_whitespace) || rest.is_empty() {
            return trimmed[trimmed.len() - rest.len()..].trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AuthStrategy;

    fn target(id: i64, auth_id: Option<i64>) -> TargetConfig {
        TargetConfig {
            id,
            name: format!("t{}", id),
            url: "https://svc/health".to_string(),
            auth_id,
            ..Default::default()
        }
    }

    #[test]
    fn bearer_prefix_is_normalized() {
        assert_eq!(normalize_bearer("Bearer abc123"), "abc123");
        assert_eq!(normalize_bearer("bearer abc123"), "abc123");
        assert_eq!(normalize_bearer("  BEARER   abc123  "), "abc123");
        assert_eq!(normalize_bearer("abc123"), "abc123");
        // A token merely starting with the letters is left intact.
        assert_eq!(normalize_bearer("bearerabc"), "bearerabc");
    }

    #[tokio::test]
    async fn no_auth_reference_returns_cached_or_none() {
        let mgr = AuthTokenManager::new();
        let t = target(1, None);
        assert_eq!(mgr.resolve_token(&t, &[]).await, None);

        mgr.seed(1, "stale");
        assert_eq!(mgr.resolve_token(&t, &[]).await, Some("stale".to_string()));
    }

    #[tokio::test]
    async fn missing_auth_config_falls_back_to_cache() {
        let mgr = AuthTokenManager::new();
        let t = target(7, Some(99));
        assert_eq!(mgr.resolve_token(&t, &[]).await, None);

        mgr.seed(7, "previous");
        assert_eq!(
            mgr.resolve_token(&t, &[]).await,
            Some("previous".to_string())
        );
    }

    #[tokio::test]
    async fn fixed_strategy_normalizes_and_caches() {
        let mgr = AuthTokenManager::new();
        let auth = AuthConfig {
            id: 5,
            name: "manual".to_string(),
            strategy: AuthStrategy::Fixed {
                token: "Bearer abc123".to_string(),
            },
        };
        let t = target(2, Some(5));
        assert_eq!(
            mgr.resolve_token(&t, &[auth]).await,
            Some("abc123".to_string())
        );
        assert_eq!(mgr.cached(2), Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn failed_acquisition_returns_previous_token() {
        let mgr = AuthTokenManager::new();
        let auth = AuthConfig {
            id: 3,
            name: "login".to_string(),
            strategy: AuthStrategy::Automatic {
                // Reserved TLD, resolution fails fast.
                endpoint: "http://credentials.invalid/api/auth/login".to_string(),
                credentials: r#"{"user":"u","password":"p"}"#.to_string(),
                token_field: "token".to_string(),
            },
        };
        let t = target(4, Some(3));
        mgr.seed(4, "last-good");
        assert_eq!(
            mgr.resolve_token(&t, &[auth]).await,
            Some("last-good".to_string())
        );
        // The cache entry survives the failure.
        assert_eq!(mgr.cached(4), Some("last-good".to_string()));
    }

    #[tokio::test]
    async fn deletion_cascade_clears_referencing_targets_only() {
        let mgr = AuthTokenManager::new();
        mgr.seed(1, "a");
        mgr.seed(2, "b");
        let targets = [target(1, Some(10)), target(2, Some(11))];
        mgr.invalidate_auth(10, &targets);
        assert_eq!(mgr.cached(1), None);
        assert_eq!(mgr.cached(2), Some("b".to_string()));
    }
}
