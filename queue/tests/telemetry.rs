use generation::MockGenerationService;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use nb_core::{ChapterTarget, CreateTask, QueueItem, SourceInput};
use queue::TaskQueue;
use std::sync::Arc;
use testing::seeded_store;

fn create(text: &str) -> QueueItem {
    QueueItem::create(
        "s1",
        ChapterTarget::existing("c1"),
        CreateTask {
            input: SourceInput::text(text),
            ..Default::default()
        },
    )
}

#[test]
fn test_queue_records_task_and_placement_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        rt.block_on(async {
            let queue = TaskQueue::new(seeded_store(), Arc::new(MockGenerationService::new()));
            queue.enqueue(create("Momentum")).unwrap();
            queue.enqueue(create("Impulse [fail]")).unwrap();
            queue.drain().await;
        });
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let counter = |name: &str, label: (&str, &str)| {
        snapshot.iter().find_map(|(key, _, _, value)| {
            let key = key.key();
            let matches = key.name() == name
                && key
                    .labels()
                    .any(|l| l.key() == label.0 && l.value() == label.1);
            match value {
                DebugValue::Counter(count) if matches => Some(*count),
                _ => None,
            }
        })
    };

    assert_eq!(
        counter("notebook_queue_tasks_total", ("status", "succeeded")),
        Some(1)
    );
    assert_eq!(
        counter("notebook_queue_tasks_total", ("status", "failed")),
        Some(1)
    );
    assert_eq!(counter("notebook_placement_total", ("decision", "new")), Some(1));

    let depth = snapshot
        .iter()
        .find(|(key, _, _, _)| key.key().name() == "notebook_queue_depth")
        .map(|(_, _, _, value)| value.clone());
    assert!(matches!(depth, Some(DebugValue::Gauge(v)) if v.into_inner() == 0.0));
}
