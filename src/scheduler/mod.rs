//! Per-target probe scheduling.
//!
//! One recurring loop per enabled target, reconciled against the declarative
//! target set. Reconciliation only rebuilds the loops when the scheduling
//! signature (id, enabled, interval, unit) actually changes, so editing a
//! name or URL never interrupts an in-flight schedule.

use crate::notify::Notifier;
use crate::probe::ProbeExecutor;
use crate::state::AppState;
use crate::store::{IntervalUnit, ProbeOutcome, ProbeResult, TargetConfig};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};

/// Orchestrates probe loops and the shared result pipeline.
pub struct Scheduler {
    state: Arc<AppState>,
    executor: Arc<ProbeExecutor>,
    stop_chans: RwLock<HashMap<i64, broadcast::Sender<()>>>,
    last_signature: Mutex<Option<String>>,
    result_tx: mpsc::Sender<(ProbeResult, bool)>,
}

impl Scheduler {
    /// Create the scheduler and start the result writer task.
    pub fn new(
        state: Arc<AppState>,
        executor: Arc<ProbeExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(run_result_writer(rx, state.clone(), notifier));

        Arc::new(Self {
            state,
            executor,
            stop_chans: RwLock::new(HashMap::new()),
            last_signature: Mutex::new(None),
            result_tx: tx,
        })
    }

    /// Reconcile running loops against the current target set.
    ///
    /// Returns whether the loops were rebuilt. A signature match is a
    /// no-op; otherwise every loop is cancelled and one is started per
    /// enabled target.
    pub async fn reconcile(&self) -> bool {
        let targets = self.state.targets();
        let signature = signature(&targets);

        let mut last = self.last_signature.lock().await;
        if last.as_deref() == Some(signature.as_str()) {
            return false;
        }
        *last = Some(signature);

        let mut stop_chans = self.stop_chans.write().await;
        for (_, stop_tx) in stop_chans.drain() {
            let _ = stop_tx.send(());
        }

        for target in targets.into_iter().filter(|t| t.enabled) {
            let (stop_tx, stop_rx) = broadcast::channel(1);
            stop_chans.insert(target.id, stop_tx);

            let period = period(target.interval, target.interval_unit);
            tracing::info!(
                "Scheduling target '{}' every {} {:?}",
                target.name,
                target.interval.max(1),
                target.interval_unit
            );

            tokio::spawn(run_probe_loop(
                target.id,
                period,
                self.state.clone(),
                self.executor.clone(),
                self.result_tx.clone(),
                stop_rx,
            ));
        }

        true
    }

    /// Stop every running loop.
    ///
    /// Lock order matches `reconcile`: signature first, then the channel
    /// map.
    pub async fn shutdown(&self) {
        let mut last = self.last_signature.lock().await;
        *last = None;

        let mut stop_chans = self.stop_chans.write().await;
        for (_, stop_tx) in stop_chans.drain() {
            let _ = stop_tx.send(());
        }
    }

    /// Execute one immediate probe for the target through the normal
    /// result pipeline.
    pub async fn run_now(&self, target_id: i64) {
        probe_once(
            target_id,
            false,
            &self.state,
            &self.executor,
            &self.result_tx,
        )
        .await;
    }

    #[cfg(test)]
    pub async fn active_loops(&self) -> usize {
        self.stop_chans.read().await.len()
    }
}

/// The scheduling signature: any change to it forces a rebuild, anything
/// outside it must not.
pub fn signature(targets: &[TargetConfig]) -> String {
    targets
        .iter()
        .map(|t| {
            format!(
                "{}:{}:{}:{:?}",
                t.id, t.enabled, t.interval, t.interval_unit
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Derive the probe period, clamping the magnitude to at least 1.
pub fn period(interval: i64, unit: IntervalUnit) -> Duration {
    let magnitude = interval.max(1) as u64;
    let ms = match unit {
        IntervalUnit::Seconds => magnitude * 1_000,
        IntervalUnit::Minutes => magnitude * 60_000,
        IntervalUnit::Hours => magnitude * 3_600_000,
    };
    Duration::from_millis(ms)
}

/// Recurring loop for one target. Fires on a fixed period; each firing runs
/// as its own task, so a slow probe may overlap the next one.
async fn run_probe_loop(
    target_id: i64,
    period: Duration,
    state: Arc<AppState>,
    executor: Arc<ProbeExecutor>,
    result_tx: mpsc::Sender<(ProbeResult, bool)>,
    mut stop_rx: broadcast::Receiver<()>,
) {
    // First firing lands one full period after scheduling.
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop_rx.recv() => break,
            _ = interval.tick() => {
                let state = state.clone();
                let executor = executor.clone();
                let result_tx = result_tx.clone();
                tokio::spawn(async move {
                    probe_once(target_id, true, &state, &executor, &result_tx).await;
                });
            }
        }
    }
}

/// One probe firing: re-read the target so edits and deletions between
/// firings take effect, execute, and hand the result to the writer.
///
/// Scheduled firings skip a target that was disabled after the timer was
/// armed; a manual run still probes it.
async fn probe_once(
    target_id: i64,
    scheduled: bool,
    state: &AppState,
    executor: &ProbeExecutor,
    result_tx: &mpsc::Sender<(ProbeResult, bool)>,
) {
    let (target, auths, env_vars) = match state.probe_context(target_id) {
        Some(ctx) => ctx,
        None => return, // deleted since the timer was armed
    };
    if scheduled && !target.enabled {
        return;
    }

    let persist = target.save_logs;
    let result = executor.execute(&target, &auths, &env_vars).await;

    if result_tx.send((result, persist)).await.is_err() {
        tracing::error!("Result pipeline closed, dropping result for '{}'", target.name);
    }
}

/// Writer task: the single place results enter the log, the statistics and
/// the notification path.
async fn run_result_writer(
    mut rx: mpsc::Receiver<(ProbeResult, bool)>,
    state: Arc<AppState>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some((result, persist)) = rx.recv().await {
        if result.outcome == ProbeOutcome::Error {
            let message = result
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_default();
            notifier.probe_failed(&result.target_name, &message);
        }
        state.append_log(result, persist);
    }
}
