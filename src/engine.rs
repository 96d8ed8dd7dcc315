//! Host-facing engine facade.
//!
//! Ties configuration mutations to their side effects: schedule
//! reconciliation, token-cache invalidation, and the audit trail.

use crate::auth::AuthTokenManager;
use crate::notify::Notifier;
use crate::probe::ProbeExecutor;
use crate::scheduler::Scheduler;
use crate::state::{AppState, ConfigError};
use crate::store::{AuthConfig, Collection, EnvVar, Storage, TargetConfig};

use serde_json::Value;
use std::sync::Arc;

/// The monitoring engine. The host process owns one and drives every
/// mutation through it.
pub struct Engine {
    state: Arc<AppState>,
    auth: Arc<AuthTokenManager>,
    scheduler: Arc<Scheduler>,
}

impl Engine {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        let state = Arc::new(AppState::load(storage));
        let auth = Arc::new(AuthTokenManager::new());
        let executor = Arc::new(ProbeExecutor::new(auth.clone()));
        let scheduler = Scheduler::new(state.clone(), executor, notifier);
        Self {
            state,
            auth,
            scheduler,
        }
    }

    /// Start the schedules for the loaded configuration.
    pub async fn start(&self) {
        self.scheduler.reconcile().await;
    }

    /// Stop every schedule.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    // --- Targets ---

    pub async fn add_target(&self, draft: TargetConfig) -> Result<TargetConfig, ConfigError> {
        let created = self.state.add_target(draft)?;
        self.scheduler.reconcile().await;
        Ok(created)
    }

    pub async fn update_target(&self, updated: TargetConfig) -> Result<(), ConfigError> {
        self.state.update_target(updated)?;
        self.scheduler.reconcile().await;
        Ok(())
    }

    pub async fn toggle_target(&self, id: i64) -> Result<TargetConfig, ConfigError> {
        let toggled = self.state.toggle_target(id)?;
        self.scheduler.reconcile().await;
        Ok(toggled)
    }

    /// Delete a target, stop its schedule and drop its cached token. An
    /// already in-flight probe still completes and its result still lands.
    pub async fn delete_target(&self, id: i64) -> Result<(), ConfigError> {
        self.state.delete_target(id)?;
        self.scheduler.reconcile().await;
        self.auth.forget_target(id);
        Ok(())
    }

    /// Probe a target immediately, outside its schedule.
    pub async fn run_now(&self, id: i64) {
        self.scheduler.run_now(id).await;
    }

    // --- Auth configs ---

    pub fn add_auth(&self, draft: AuthConfig) -> Result<AuthConfig, ConfigError> {
        self.state.add_auth(draft)
    }

    pub fn update_auth(&self, updated: AuthConfig) -> Result<(), ConfigError> {
        self.state.update_auth(updated)
    }

    /// Delete an auth config; referencing targets lose both the reference
    /// and their cached tokens.
    pub fn delete_auth(&self, id: i64) -> Result<(), ConfigError> {
        let swept = self.state.delete_auth(id)?;
        for target_id in swept {
            self.auth.forget_target(target_id);
        }
        Ok(())
    }

    // --- Environment variables ---

    pub fn add_env_var(&self, key: &str, value: &str) -> Result<EnvVar, ConfigError> {
        self.state.add_env_var(key, value)
    }

    pub fn update_env_var(&self, id: i64, key: &str, value: &str) -> Result<(), ConfigError> {
        self.state.update_env_var(id, key, value)
    }

    pub fn delete_env_var(&self, id: i64) -> Result<(), ConfigError> {
        self.state.delete_env_var(id)
    }

    // --- Collections ---

    pub fn add_collection(&self, name: &str) -> Result<Collection, ConfigError> {
        self.state.add_collection(name)
    }

    pub fn update_collection(&self, id: i64, name: &str) -> Result<(), ConfigError> {
        self.state.update_collection(id, name)
    }

    pub fn delete_collection(&self, id: i64) -> Result<(), ConfigError> {
        self.state.delete_collection(id)
    }

    // --- Logs, export/import, storage ---

    pub fn clear_logs(&self) {
        self.state.clear_logs();
    }

    pub fn export_config(&self) -> Value {
        self.state.export_config()
    }

    pub async fn import_config(&self, document: Value) -> Result<(), ConfigError> {
        self.state.import_config(document)?;
        self.scheduler.reconcile().await;
        Ok(())
    }

    /// Wipe storage, state, schedules and the token cache.
    pub async fn clear_all(&self) {
        self.state.clear_all();
        self.scheduler.reconcile().await;
        self.auth.reset();
    }
}
