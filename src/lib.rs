//! apiwatch — a client-side engine that probes HTTP APIs on per-target
//! schedules, manages bearer-token acquisition, and aggregates outcomes
//! into bounded logs, rolling statistics and a change history.
//!
//! The host process (a UI shell, typically) owns an [`engine::Engine`] and
//! drives every configuration mutation through it; probe results flow back
//! through the shared state in [`state::AppState`].

pub mod auth;
pub mod config;
pub mod engine;
pub mod env_subst;
pub mod logs;
pub mod notify;
pub mod probe;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod store;
