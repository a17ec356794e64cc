//! 持久化集成测试

use recall_lib::completion::CommandRegistry;
use recall_lib::config::{EngineConfig, PersistenceConfig};
use recall_lib::history::ExecutionMetadata;
use recall_lib::storage::{FileStore, MemoryStore, PersistenceStore, QueuedStore};
use recall_lib::utils::ManualClock;
use recall_lib::ConsoleEngine;
use std::sync::Arc;
use std::time::Duration;

fn open(store: Arc<dyn PersistenceStore>, clock: Arc<ManualClock>) -> ConsoleEngine {
    ConsoleEngine::with_session(
        EngineConfig::default(),
        Arc::new(CommandRegistry::with_builtin()),
        store,
        clock,
        "persistence",
    )
    .unwrap()
}

#[test]
fn test_state_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));

    {
        let store: Arc<dyn PersistenceStore> = Arc::new(FileStore::new(dir.path()).unwrap());
        let mut engine = open(store, clock.clone());
        engine.record_command("echo hello", ExecutionMetadata::success(3.0));
        clock.advance(5_000);
        engine.record_command("cls", ExecutionMetadata::default());
        assert!(engine.shutdown());
    }

    let store: Arc<dyn PersistenceStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    let mut engine = open(store, clock.clone());
    assert_eq!(engine.history().len(), 2);
    assert_eq!(engine.model().usage_count("clear"), 1);
    assert_eq!(engine.model().recent_commands().next(), Some("clear"));
    assert_eq!(engine.get_statistics().total_commands, 2);

    // 重启后 id 继续递增
    clock.advance(5_000);
    let entry = engine
        .record_command("help", ExecutionMetadata::default())
        .unwrap();
    assert_eq!(entry.id, 3);
}

#[test]
fn test_flush_is_debounced_by_clock() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let mut engine = open(store.clone(), clock.clone());

    clock.set(1_000);
    engine.record_command("help", ExecutionMetadata::default());
    assert!(!store.contains_key("console.history"));

    clock.set(31_000);
    assert!(engine.tick());
    assert!(store.contains_key("console.history"));
    assert!(store.contains_key("console.learning"));

    // 没有新的改动时不再写入
    clock.set(100_000);
    assert!(!engine.tick());
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    store.save("console.history", "not json at all").unwrap();
    store
        .save("console.learning", r#"{"usageCounts": {"help": 4}, "future": true}"#)
        .unwrap();

    let engine = open(store, Arc::new(ManualClock::new(0)));
    assert!(engine.history().is_empty());
    assert_eq!(engine.model().usage_count("help"), 4);
}

#[test]
fn test_quota_exceeded_evicts_oldest_history() {
    let clock = Arc::new(ManualClock::new(1_000));
    let probe = {
        let store = Arc::new(MemoryStore::new());
        let mut engine = open(store.clone(), clock.clone());
        for i in 0..30 {
            engine.record_command(&format!("echo entry-{i}"), ExecutionMetadata::default());
            clock.advance(2_000);
        }
        engine.flush();
        store.total_bytes()
    };

    clock.set(1_000);
    let store = Arc::new(MemoryStore::with_quota(probe * 3 / 4));
    let mut engine = open(store.clone(), clock.clone());
    for i in 0..30 {
        engine.record_command(&format!("echo entry-{i}"), ExecutionMetadata::default());
        clock.advance(2_000);
    }

    assert!(engine.flush());
    assert!(engine.is_persistence_enabled());
    assert_eq!(engine.history().len(), 15);
    assert_eq!(engine.history().entries()[0].command, "echo entry-15");
}

#[test]
fn test_unrecoverable_failure_keeps_memory_state() {
    let store = Arc::new(MemoryStore::with_quota(16));
    let clock = Arc::new(ManualClock::new(0));
    let mut engine = open(store, clock);

    engine.record_command("echo a much longer command line", ExecutionMetadata::default());
    assert!(!engine.flush());
    assert!(!engine.is_persistence_enabled());

    // 内存中的状态仍然可用
    assert!(engine.model().usage_count("echo") == 1);
    assert_eq!(engine.get_suggestions("ech", 3)[0].text, "echo");
}

#[test]
fn test_disabled_persistence_never_writes() {
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig {
        persistence: PersistenceConfig {
            enabled: false,
            ..PersistenceConfig::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = ConsoleEngine::with_session(
        config,
        Arc::new(CommandRegistry::with_builtin()),
        store.clone(),
        Arc::new(ManualClock::new(0)),
        "off",
    )
    .unwrap();

    engine.record_command("help", ExecutionMetadata::default());
    drop(engine);
    assert_eq!(store.total_bytes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queued_store_writes_in_background() {
    let inner = Arc::new(MemoryStore::new());
    let queued = Arc::new(QueuedStore::new(inner.clone()));
    let clock = Arc::new(ManualClock::new(0));

    let mut engine = open(queued.clone(), clock);
    engine.record_command("history.stats", ExecutionMetadata::default());
    assert!(engine.flush());

    for _ in 0..100 {
        if queued.pending_writes() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(inner.contains_key("console.history"));
    assert!(inner.contains_key("console.learning"));
}
