//! Best-effort failure notifications.

/// External collaborator signalled when a probe fails.
///
/// Delivery is best-effort; implementations must not block or fail the
/// probe pipeline.
pub trait Notifier: Send + Sync {
    fn probe_failed(&self, target_name: &str, message: &str);
}

/// Default notifier that surfaces failures through the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn probe_failed(&self, target_name: &str, message: &str) {
        tracing::warn!("Probe for '{}' failed: {}", target_name, message);
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records notifications for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn probe_failed(&self, target_name: &str, message: &str) {
            self.seen
                .lock()
                .unwrap()
                .push((target_name.to_string(), message.to_string()));
        }
    }
}
