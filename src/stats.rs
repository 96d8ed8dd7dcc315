//! Derived per-target statistics.

use crate::store::{ProbeOutcome, ProbeResult, TargetConfig, TargetStats};

use std::collections::HashMap;

/// Recompute counters for every target from the current log set.
///
/// Entries are matched by captured target name, so renaming a target starts
/// it from a clean slate without touching historical entries.
pub fn compute(targets: &[TargetConfig], logs: &[ProbeResult]) -> HashMap<i64, TargetStats> {
    let mut stats = HashMap::with_capacity(targets.len());
    for target in targets {
        let entries: Vec<&ProbeResult> =
            logs.iter().filter(|l| l.target_name == target.name).collect();
        let total = entries.len();
        let success = entries
            .iter()
            .filter(|l| l.outcome == ProbeOutcome::Success)
            .count();
        let errors = total - success;

        let success_rate = if total > 0 {
            round1(success as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        let avg_duration_ms = if total > 0 {
            let sum: i64 = entries.iter().map(|l| l.duration_ms).sum();
            (sum as f64 / total as f64).round() as i64
        } else {
            0
        };

        stats.insert(
            target.id,
            TargetStats {
                total,
                success,
                errors,
                success_rate,
                avg_duration_ms,
            },
        );
    }
    stats
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RequestSnapshot;
    use chrono::Utc;

    fn result(name: &str, outcome: ProbeOutcome, duration_ms: i64) -> ProbeResult {
        ProbeResult {
            id: 0,
            timestamp: Utc::now(),
            target_name: name.to_string(),
            outcome,
            duration_ms,
            error: None,
            response: None,
            request: RequestSnapshot::default(),
            method: Default::default(),
            url: String::new(),
        }
    }

    fn target(id: i64, name: &str) -> TargetConfig {
        TargetConfig {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn mixed_outcomes_yield_rate_and_average() {
        let targets = [target(1, "T")];
        let logs = [
            result("T", ProbeOutcome::Success, 100),
            result("T", ProbeOutcome::Success, 200),
            result("T", ProbeOutcome::Error, 300),
        ];

        let stats = compute(&targets, &logs);
        let s = &stats[&1];
        assert_eq!(s.total, 3);
        assert_eq!(s.success, 2);
        assert_eq!(s.errors, 1);
        assert_eq!(s.success_rate, 66.7);
        assert_eq!(s.avg_duration_ms, 200);
    }

    #[test]
    fn empty_log_set_yields_zeroes() {
        let targets = [target(1, "T")];
        let stats = compute(&targets, &[]);
        assert_eq!(stats[&1], TargetStats::default());
    }

    #[test]
    fn entries_are_partitioned_per_target() {
        let targets = [target(1, "A"), target(2, "B")];
        let logs = [
            result("A", ProbeOutcome::Success, 10),
            result("B", ProbeOutcome::Error, 20),
        ];

        let stats = compute(&targets, &logs);
        assert_eq!(stats[&1].success, 1);
        assert_eq!(stats[&1].errors, 0);
        assert_eq!(stats[&2].errors, 1);
        assert_eq!(stats[&2].success_rate, 0.0);
    }
}
