//! Application state store.
//!
//! Owns the configuration collections, the probe log and the audit trail.
//! Every mutation validates first, persists the touched buckets, and keeps
//! the derived statistics in sync. Locks are never held across await
//! points; callers get cloned snapshots.

use crate::logs::{HistoryLog, LogStore};
use crate::stats;
use crate::store::{
    self, bucket, next_id, AuthConfig, AuthStrategy, Collection, EnvVar, HistoryDetails,
    HistoryEntry, HistoryEventKind, ProbeResult, Storage, TargetConfig, TargetStats,
};

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Validation and lookup errors surfaced to the configuration boundary.
///
/// Raised synchronously before any state mutation.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("target name and URL are required")]
    TargetFields,
    #[error("auth config name is required")]
    AuthName,
    #[error("auth endpoint and credentials are required")]
    AuthAutomaticFields,
    #[error("bearer token is required")]
    AuthFixedFields,
    #[error("variable key and value are required")]
    EnvVarFields,
    #[error("collection name is required")]
    CollectionName,
    #[error("{0} {1} not found")]
    NotFound(&'static str, i64),
    #[error("import document is not a JSON object")]
    InvalidImport,
}

struct Inner {
    targets: Vec<TargetConfig>,
    auths: Vec<AuthConfig>,
    env_vars: Vec<EnvVar>,
    collections: Vec<Collection>,
    logs: LogStore,
    history: HistoryLog,
    stats: HashMap<i64, TargetStats>,
}

/// Shared application state.
pub struct AppState {
    storage: Arc<dyn Storage>,
    inner: RwLock<Inner>,
}

impl AppState {
    /// Load all buckets, tolerating missing or corrupt ones.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let targets: Vec<TargetConfig> = store::load_or(&*storage, bucket::TARGETS, Vec::new());
        let auths = store::load_or(&*storage, bucket::AUTHS, Vec::new());
        let env_vars = store::load_or(&*storage, bucket::ENV_VARS, Vec::new());
        let collections = store::load_or(&*storage, bucket::COLLECTIONS, Vec::new());
        let logs = LogStore::new(store::load_or(&*storage, bucket::LOGS, Vec::new()));
        let history = HistoryLog::new(store::load_or(&*storage, bucket::HISTORY, Vec::new()));

        let stats = stats::compute(&targets, logs.entries());
        Self {
            storage,
            inner: RwLock::new(Inner {
                targets,
                auths,
                env_vars,
                collections,
                logs,
                history,
                stats,
            }),
        }
    }

    // --- Snapshots ---

    pub fn targets(&self) -> Vec<TargetConfig> {
        self.inner.read().unwrap().targets.clone()
    }

    pub fn auths(&self) -> Vec<AuthConfig> {
        self.inner.read().unwrap().auths.clone()
    }

    pub fn env_vars(&self) -> Vec<EnvVar> {
        self.inner.read().unwrap().env_vars.clone()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.inner.read().unwrap().collections.clone()
    }

    pub fn stats(&self) -> HashMap<i64, TargetStats> {
        self.inner.read().unwrap().stats.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.read().unwrap().history.entries().to_vec()
    }

    pub fn logs(&self, target_name: Option<&str>) -> Vec<ProbeResult> {
        self.inner.read().unwrap().logs.filter(target_name)
    }

    pub fn log_count(&self) -> usize {
        self.inner.read().unwrap().logs.len()
    }

    /// Everything a probe firing needs, read fresh so edits and deletions
    /// between firings take effect.
    pub fn probe_context(
        &self,
        target_id: i64,
    ) -> Option<(TargetConfig, Vec<AuthConfig>, Vec<EnvVar>)> {
        let inner = self.inner.read().unwrap();
        let target = inner.targets.iter().find(|t| t.id == target_id)?.clone();
        Some((target, inner.auths.clone(), inner.env_vars.clone()))
    }

    // --- Targets ---

    /// Create a target; the id is issued here and never changes.
    pub fn add_target(&self, mut draft: TargetConfig) -> Result<TargetConfig, ConfigError> {
        validate_target(&draft)?;
        draft.id = next_id();
        draft.interval = draft.interval.max(1);

        let mut inner = self.inner.write().unwrap();
        inner.history.record(
            HistoryEventKind::Added,
            HistoryDetails {
                name: draft.name.clone(),
                method: Some(draft.method),
            },
        );
        inner.targets.push(draft.clone());
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        self.persist_targets(&inner);
        self.persist_history(&inner);
        tracing::info!("Added target '{}' ({})", draft.name, draft.id);
        Ok(draft)
    }

    /// Update a target in place; the stored id wins over the payload's.
    pub fn update_target(&self, updated: TargetConfig) -> Result<(), ConfigError> {
        validate_target(&updated)?;

        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .targets
            .iter_mut()
            .find(|t| t.id == updated.id)
            .ok_or(ConfigError::NotFound("target", updated.id))?;
        let id = slot.id;
        *slot = TargetConfig {
            id,
            interval: updated.interval.max(1),
            ..updated
        };
        let name = slot.name.clone();

        inner.history.record(
            HistoryEventKind::Updated,
            HistoryDetails {
                name: name.clone(),
                method: None,
            },
        );
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        self.persist_targets(&inner);
        self.persist_history(&inner);
        tracing::info!("Updated target '{}' ({})", name, id);
        Ok(())
    }

    /// Flip the enabled flag, recording Started or Stopped.
    pub fn toggle_target(&self, id: i64) -> Result<TargetConfig, ConfigError> {
        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .targets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ConfigError::NotFound("target", id))?;
        slot.enabled = !slot.enabled;
        let snapshot = slot.clone();

        let kind = if snapshot.enabled {
            HistoryEventKind::Started
        } else {
            HistoryEventKind::Stopped
        };
        inner.history.record(
            kind,
            HistoryDetails {
                name: snapshot.name.clone(),
                method: None,
            },
        );
        self.persist_targets(&inner);
        self.persist_history(&inner);
        Ok(snapshot)
    }

    pub fn delete_target(&self, id: i64) -> Result<TargetConfig, ConfigError> {
        let mut inner = self.inner.write().unwrap();
        let index = inner
            .targets
            .iter()
            .position(|t| t.id == id)
            .ok_or(ConfigError::NotFound("target", id))?;
        let removed = inner.targets.remove(index);

        inner.history.record(
            HistoryEventKind::Deleted,
            HistoryDetails {
                name: removed.name.clone(),
                method: None,
            },
        );
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        self.persist_targets(&inner);
        self.persist_history(&inner);
        tracing::info!("Deleted target '{}' ({})", removed.name, id);
        Ok(removed)
    }

    // --- Auth configs ---

    pub fn add_auth(&self, mut draft: AuthConfig) -> Result<AuthConfig, ConfigError> {
        validate_auth(&draft)?;
        draft.id = next_id();

        let mut inner = self.inner.write().unwrap();
        inner.auths.push(draft.clone());
        self.persist_auths(&inner);
        Ok(draft)
    }

    pub fn update_auth(&self, updated: AuthConfig) -> Result<(), ConfigError> {
        validate_auth(&updated)?;

        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .auths
            .iter_mut()
            .find(|a| a.id == updated.id)
            .ok_or(ConfigError::NotFound("auth config", updated.id))?;
        *slot = updated;
        self.persist_auths(&inner);
        Ok(())
    }

    /// Delete an auth config and sweep dangling references.
    ///
    /// Returns the ids of the targets that referenced it so the caller can
    /// invalidate their cached tokens.
    pub fn delete_auth(&self, id: i64) -> Result<Vec<i64>, ConfigError> {
        let mut inner = self.inner.write().unwrap();
        let index = inner
            .auths
            .iter()
            .position(|a| a.id == id)
            .ok_or(ConfigError::NotFound("auth config", id))?;
        inner.auths.remove(index);

        let mut swept = Vec::new();
        for target in &mut inner.targets {
            if target.auth_id == Some(id) {
                target.auth_id = None;
                swept.push(target.id);
            }
        }

        self.persist_auths(&inner);
        if !swept.is_empty() {
            self.persist_targets(&inner);
        }
        tracing::info!("Deleted auth config {}, cleared {} reference(s)", id, swept.len());
        Ok(swept)
    }

    // --- Environment variables ---

    pub fn add_env_var(&self, key: &str, value: &str) -> Result<EnvVar, ConfigError> {
        if key.is_empty() || value.is_empty() {
            return Err(ConfigError::EnvVarFields);
        }
        let var = EnvVar {
            id: next_id(),
            key: key.to_string(),
            value: value.to_string(),
        };
        let mut inner = self.inner.write().unwrap();
        inner.env_vars.push(var.clone());
        self.persist_env_vars(&inner);
        Ok(var)
    }

    pub fn update_env_var(&self, id: i64, key: &str, value: &str) -> Result<(), ConfigError> {
        if key.is_empty() || value.is_empty() {
            return Err(ConfigError::EnvVarFields);
        }
        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .env_vars
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(ConfigError::NotFound("variable", id))?;
        slot.key = key.to_string();
        slot.value = value.to_string();
        self.persist_env_vars(&inner);
        Ok(())
    }

    pub fn delete_env_var(&self, id: i64) -> Result<(), ConfigError> {
        let mut inner = self.inner.write().unwrap();
        let index = inner
            .env_vars
            .iter()
            .position(|v| v.id == id)
            .ok_or(ConfigError::NotFound("variable", id))?;
        inner.env_vars.remove(index);
        self.persist_env_vars(&inner);
        Ok(())
    }

    // --- Collections ---

    pub fn add_collection(&self, name: &str) -> Result<Collection, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::CollectionName);
        }
        let collection = Collection {
            id: next_id(),
            name: name.to_string(),
        };
        let mut inner = self.inner.write().unwrap();
        inner.collections.push(collection.clone());
        self.persist_collections(&inner);
        Ok(collection)
    }

    pub fn update_collection(&self, id: i64, name: &str) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::CollectionName);
        }
        let mut inner = self.inner.write().unwrap();
        let slot = inner
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ConfigError::NotFound("collection", id))?;
        slot.name = name.to_string();
        self.persist_collections(&inner);
        Ok(())
    }

    /// Delete a grouping label; member targets stay, their reference is
    /// cleared.
    pub fn delete_collection(&self, id: i64) -> Result<(), ConfigError> {
        let mut inner = self.inner.write().unwrap();
        let index = inner
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or(ConfigError::NotFound("collection", id))?;
        inner.collections.remove(index);

        let mut swept = false;
        for target in &mut inner.targets {
            if target.collection_id == Some(id) {
                target.collection_id = None;
                swept = true;
            }
        }

        self.persist_collections(&inner);
        if swept {
            self.persist_targets(&inner);
        }
        Ok(())
    }

    // --- Logs ---

    /// Append a probe result and refresh the derived statistics.
    ///
    /// The persisted view is written when `persist` is set (the originating
    /// target's persist-logs flag).
    pub fn append_log(&self, result: ProbeResult, persist: bool) {
        let mut inner = self.inner.write().unwrap();
        inner.logs.append(result);
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        if persist {
            store::save(&*self.storage, bucket::LOGS, &inner.logs.persisted_view());
        }
    }

    pub fn clear_logs(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.logs.clear();
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        store::save(&*self.storage, bucket::LOGS, &inner.logs.persisted_view());
    }

    // --- Export / import ---

    /// Build the export document.
    pub fn export_config(&self) -> Value {
        let inner = self.inner.read().unwrap();
        serde_json::json!({
            "apis": inner.targets,
            "auths": inner.auths,
            "collections": inner.collections,
            "envVars": inner.env_vars,
            "exportDate": Utc::now().to_rfc3339(),
            "version": "1.0.0",
        })
    }

    /// Replace each collection wholesale when its field is present and is
    /// an array; absent or malformed fields are left untouched.
    pub fn import_config(&self, document: Value) -> Result<(), ConfigError> {
        if !document.is_object() {
            return Err(ConfigError::InvalidImport);
        }

        let mut inner = self.inner.write().unwrap();
        if let Some(apis) = parse_array::<TargetConfig>(&document, "apis") {
            inner.targets = apis;
            self.persist_targets(&inner);
        }
        if let Some(auths) = parse_array::<AuthConfig>(&document, "auths") {
            inner.auths = auths;
            self.persist_auths(&inner);
        }
        if let Some(collections) = parse_array::<Collection>(&document, "collections") {
            inner.collections = collections;
            self.persist_collections(&inner);
        }
        if let Some(env_vars) = parse_array::<EnvVar>(&document, "envVars") {
            inner.env_vars = env_vars;
            self.persist_env_vars(&inner);
        }
        inner.stats = stats::compute(&inner.targets, inner.logs.entries());
        tracing::info!("Imported configuration");
        Ok(())
    }

    /// Wipe storage and every in-memory collection.
    pub fn clear_all(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::error!("Failed to clear storage: {}", e);
        }
        let mut inner = self.inner.write().unwrap();
        inner.targets.clear();
        inner.auths.clear();
        inner.env_vars.clear();
        inner.collections.clear();
        inner.logs.clear();
        inner.history.clear();
        inner.stats.clear();
    }

    // --- Persistence helpers ---

    fn persist_targets(&self, inner: &Inner) {
        store::save(&*self.storage, bucket::TARGETS, &inner.targets);
    }

    fn persist_auths(&self, inner: &Inner) {
        store::save(&*self.storage, bucket::AUTHS, &inner.auths);
    }

    fn persist_env_vars(&self, inner: &Inner) {
        store::save(&*self.storage, bucket::ENV_VARS, &inner.env_vars);
    }

    fn persist_collections(&self, inner: &Inner) {
        store::save(&*self.storage, bucket::COLLECTIONS, &inner.collections);
    }

    fn persist_history(&self, inner: &Inner) {
        // HistoryLog caps itself on every record.
        store::save(&*self.storage, bucket::HISTORY, &inner.history.entries());
    }
}

fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
    if target.name.trim().is_empty() || target.url.trim().is_empty() {
        return Err(ConfigError::TargetFields);
    }
    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    if auth.name.trim().is_empty() {
        return Err(ConfigError::AuthName);
    }
    match &auth.strategy {
        AuthStrategy::Automatic {
            endpoint,
            credentials,
            ..
        } => {
            if endpoint.trim().is_empty() || credentials.trim().is_empty() {
                return Err(ConfigError::AuthAutomaticFields);
            }
        }
        AuthStrategy::Fixed { token } => {
            if token.trim().is_empty() {
                return Err(ConfigError::AuthFixedFields);
            }
        }
    }
    Ok(())
}

fn parse_array<T: serde::de::DeserializeOwned>(document: &Value, field: &str) -> Option<Vec<T>> {
    let array = document.get(field)?.as_array()?;
    serde_json::from_value(Value::Array(array.clone())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpMethod, MemoryStorage, ProbeOutcome, RequestSnapshot};

    fn state() -> AppState {
        AppState::load(Arc::new(MemoryStorage::default()))
    }

    fn draft(name: &str) -> TargetConfig {
        TargetConfig {
            name: name.to_string(),
            url: "https://svc/health".to_string(),
            ..Default::default()
        }
    }

    fn log_for(name: &str, outcome: ProbeOutcome) -> ProbeResult {
        ProbeResult {
            id: next_id(),
            timestamp: Utc::now(),
            target_name: name.to_string(),
            outcome,
            duration_ms: 50,
            error: None,
            response: None,
            request: RequestSnapshot::default(),
            method: HttpMethod::Get,
            url: String::new(),
        }
    }

    #[test]
    fn add_target_validates_and_issues_id() {
        let state = state();
        assert_eq!(
            state.add_target(TargetConfig::default()).unwrap_err(),
            ConfigError::TargetFields
        );

        let mut t = draft("Health");
        t.interval = -3;
        let created = state.add_target(t).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.interval, 1);

        let history = state.history();
        assert_eq!(history[0].kind, HistoryEventKind::Added);
        assert_eq!(history[0].details.name, "Health");
        assert_eq!(history[0].details.method, Some(HttpMethod::Get));
    }

    #[test]
    fn update_keeps_id_and_records_history() {
        let state = state();
        let created = state.add_target(draft("old")).unwrap();

        let mut edited = created.clone();
        edited.name = "new".to_string();
        state.update_target(edited).unwrap();

        let targets = state.targets();
        assert_eq!(targets[0].id, created.id);
        assert_eq!(targets[0].name, "new");
        assert_eq!(state.history()[0].kind, HistoryEventKind::Updated);
    }

    #[test]
    fn toggle_records_started_then_stopped() {
        let state = state();
        let created = state.add_target(draft("t")).unwrap();

        let toggled = state.toggle_target(created.id).unwrap();
        assert!(toggled.enabled);
        assert_eq!(state.history()[0].kind, HistoryEventKind::Started);

        state.toggle_target(created.id).unwrap();
        assert_eq!(state.history()[0].kind, HistoryEventKind::Stopped);
    }

    #[test]
    fn delete_auth_sweeps_references() {
        let state = state();
        let auth = state
            .add_auth(AuthConfig {
                id: 0,
                name: "manual".to_string(),
                strategy: AuthStrategy::Fixed {
                    token: "abc".to_string(),
                },
            })
            .unwrap();

        let mut t = draft("secured");
        t.auth_id = Some(auth.id);
        let target = state.add_target(t).unwrap();
        let other = state.add_target(draft("open")).unwrap();

        let swept = state.delete_auth(auth.id).unwrap();
        assert_eq!(swept, vec![target.id]);
        let targets = state.targets();
        assert!(targets.iter().all(|t| t.auth_id.is_none()));
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().any(|t| t.id == other.id));
    }

    #[test]
    fn auth_validation_is_strategy_aware() {
        let state = state();
        let missing_endpoint = AuthConfig {
            id: 0,
            name: "login".to_string(),
            strategy: AuthStrategy::Automatic {
                endpoint: String::new(),
                credentials: r#"{"u":"p"}"#.to_string(),
                token_field: "token".to_string(),
            },
        };
        assert_eq!(
            state.add_auth(missing_endpoint).unwrap_err(),
            ConfigError::AuthAutomaticFields
        );

        let missing_token = AuthConfig {
            id: 0,
            name: "manual".to_string(),
            strategy: AuthStrategy::Fixed {
                token: "  ".to_string(),
            },
        };
        assert_eq!(
            state.add_auth(missing_token).unwrap_err(),
            ConfigError::AuthFixedFields
        );
    }

    #[test]
    fn delete_collection_clears_member_references() {
        let state = state();
        let collection = state.add_collection("group").unwrap();
        let mut t = draft("member");
        t.collection_id = Some(collection.id);
        let target = state.add_target(t).unwrap();

        state.delete_collection(collection.id).unwrap();

        let targets = state.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, target.id);
        assert!(targets[0].collection_id.is_none());
        assert!(state.collections().is_empty());
    }

    #[test]
    fn env_var_and_collection_crud() {
        let state = state();
        assert_eq!(
            state.add_env_var("", "v").unwrap_err(),
            ConfigError::EnvVarFields
        );

        let var = state.add_env_var("HOST", "a").unwrap();
        state.update_env_var(var.id, "HOST", "b").unwrap();
        assert_eq!(state.env_vars()[0].value, "b");
        state.delete_env_var(var.id).unwrap();
        assert!(state.env_vars().is_empty());

        let collection = state.add_collection("old").unwrap();
        state.update_collection(collection.id, "new").unwrap();
        assert_eq!(state.collections()[0].name, "new");
        assert_eq!(
            state.update_collection(999, "x").unwrap_err(),
            ConfigError::NotFound("collection", 999)
        );
    }

    #[test]
    fn renaming_does_not_relabel_history_entries() {
        let state = state();
        let created = state.add_target(draft("before")).unwrap();
        state.append_log(log_for("before", ProbeOutcome::Success), false);

        let mut edited = created.clone();
        edited.name = "after".to_string();
        state.update_target(edited).unwrap();

        // The old entry keeps its captured name and no longer counts
        // toward the renamed target.
        assert_eq!(state.logs(Some("before")).len(), 1);
        assert_eq!(state.stats()[&created.id].total, 0);
    }

    #[test]
    fn stats_follow_log_mutations() {
        let state = state();
        let created = state.add_target(draft("T")).unwrap();
        state.append_log(log_for("T", ProbeOutcome::Success), false);
        state.append_log(log_for("T", ProbeOutcome::Error), false);

        let stats = state.stats();
        assert_eq!(stats[&created.id].total, 2);
        assert_eq!(stats[&created.id].success_rate, 50.0);

        state.clear_logs();
        assert_eq!(state.stats()[&created.id].total, 0);
    }

    #[test]
    fn export_then_import_round_trips() {
        let state = state();
        state.add_target(draft("exported")).unwrap();
        state.add_env_var("HOST", "svc.local").unwrap();
        let document = state.export_config();
        assert_eq!(document["version"], "1.0.0");
        assert!(document["exportDate"].is_string());

        let fresh = AppState::load(Arc::new(MemoryStorage::default()));
        fresh.import_config(document).unwrap();
        assert_eq!(fresh.targets().len(), 1);
        assert_eq!(fresh.targets()[0].name, "exported");
        assert_eq!(fresh.env_vars().len(), 1);
    }

    #[test]
    fn import_leaves_absent_fields_untouched() {
        let state = state();
        state.add_target(draft("kept")).unwrap();
        state.add_env_var("K", "V").unwrap();

        // envVars is malformed, apis replaces.
        let document = serde_json::json!({
            "apis": [],
            "envVars": "not-an-array",
        });
        state.import_config(document).unwrap();

        assert!(state.targets().is_empty());
        assert_eq!(state.env_vars().len(), 1);

        assert_eq!(
            state.import_config(Value::String("nope".to_string())),
            Err(ConfigError::InvalidImport)
        );
    }

    #[test]
    fn persisted_state_survives_reload() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::load(storage.clone());
        state.add_target(draft("durable")).unwrap();
        state.append_log(log_for("durable", ProbeOutcome::Success), true);

        let reloaded = AppState::load(storage);
        assert_eq!(reloaded.targets().len(), 1);
        assert_eq!(reloaded.logs(None).len(), 1);
        assert_eq!(reloaded.history().len(), 1);
    }

    #[test]
    fn clear_all_wipes_everything() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::load(storage.clone());
        state.add_target(draft("gone")).unwrap();
        state.append_log(log_for("gone", ProbeOutcome::Success), true);

        state.clear_all();
        assert!(state.targets().is_empty());
        assert_eq!(state.log_count(), 0);
        assert!(state.history().is_empty());
        assert!(storage.load_raw(bucket::TARGETS).is_none());

        // A later lifecycle event must not resurrect the old trail into
        // the cleared storage.
        state.add_target(draft("fresh")).unwrap();
        let reloaded = AppState::load(storage);
        assert_eq!(reloaded.history().len(), 1);
        assert_eq!(reloaded.history()[0].details.name, "fresh");
    }
}
