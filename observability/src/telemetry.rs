//! # Queue Telemetry
//!
//! Metrics emitted by the task queue through the `metrics` facade. Nothing
//! is recorded unless a recorder is installed by the host application.

use metrics::{counter, gauge, histogram};

/// Final state of a processed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueTelemetry {
    enabled: bool,
}

impl Default for QueueTelemetry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl QueueTelemetry {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_task(&self, kind: &str, status: TaskStatus, duration_secs: f64) {
        if !self.enabled {
            return;
        }
        let counter_labels = [
            ("kind", kind.to_string()),
            ("status", status.as_str().to_string()),
        ];
        counter!("notebook_queue_tasks_total", &counter_labels).increment(1);

        histogram!("notebook_queue_task_duration_seconds", "kind" => kind.to_string())
            .record(duration_secs);
    }

    /// `decision` is the placement outcome: `merge`, `new` or `direct`.
    pub fn record_placement(&self, decision: &str) {
        if !self.enabled {
            return;
        }
        counter!("notebook_placement_total", "decision" => decision.to_string()).increment(1);
    }

    pub fn set_queue_depth(&self, depth: usize) {
        if !self.enabled {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        gauge!("notebook_queue_depth").set(depth as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::CompositeKey;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    type SnapshotVec = Vec<(
        CompositeKey,
        Option<metrics::Unit>,
        Option<metrics::SharedString>,
        DebugValue,
    )>;

    fn with_test_recorder<F>(f: F) -> SnapshotVec
    where
        F: FnOnce(),
    {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, f);
        snapshotter.snapshot().into_vec()
    }

    fn has_metric_with_labels(snapshot: &SnapshotVec, name: &str, labels: &[(&str, &str)]) -> bool {
        snapshot.iter().any(|(k, _, _, _)| {
            if k.key().name() != name {
                return false;
            }
            let key_labels: Vec<_> = k.key().labels().collect();
            labels.iter().all(|(label_name, label_value)| {
                key_labels
                    .iter()
                    .any(|l| l.key() == *label_name && l.value() == *label_value)
            })
        })
    }

    #[test]
    fn test_record_task_emits_counter_and_histogram() {
        let snapshot = with_test_recorder(|| {
            QueueTelemetry::new(true).record_task("create", TaskStatus::Failed, 0.25);
        });

        assert!(has_metric_with_labels(
            &snapshot,
            "notebook_queue_tasks_total",
            &[("kind", "create"), ("status", "failed")]
        ));
        assert!(has_metric_with_labels(
            &snapshot,
            "notebook_queue_task_duration_seconds",
            &[("kind", "create")]
        ));
    }

    #[test]
    fn test_record_placement_and_depth() {
        let snapshot = with_test_recorder(|| {
            let telemetry = QueueTelemetry::default();
            telemetry.record_placement("merge");
            telemetry.set_queue_depth(3);
        });

        assert!(has_metric_with_labels(
            &snapshot,
            "notebook_placement_total",
            &[("decision", "merge")]
        ));
        let depth = snapshot
            .iter()
            .find(|(k, _, _, _)| k.key().name() == "notebook_queue_depth")
            .map(|(_, _, _, value)| value.clone());
        assert!(matches!(depth, Some(DebugValue::Gauge(v)) if v.into_inner() == 3.0));
    }

    #[test]
    fn test_disabled_telemetry_records_nothing() {
        let snapshot = with_test_recorder(|| {
            let telemetry = QueueTelemetry::disabled();
            telemetry.record_task("summarize", TaskStatus::Succeeded, 1.0);
            telemetry.record_placement("new");
            telemetry.set_queue_depth(1);
        });

        assert!(snapshot.is_empty());
    }
}
