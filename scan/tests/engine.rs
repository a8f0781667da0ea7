use serde_json::json;
use std::time::Duration;

use txnstats_nullables::NullStore;
use txnstats_scan::{Engine, EngineConfig, ScanError};
use txnstats_types::{CollectionStats, TransactionState};

fn queue(tokens: usize) -> serde_json::Value {
    let tokens: Vec<String> = (0..tokens).map(|i| format!("5a1b{i:04}_nonce")).collect();
    json!({ "txn-queue": tokens })
}

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
}

#[tokio::test]
async fn test_charms_and_txns_scenario() {
    let store = NullStore::new();
    store.insert_many("charms", [queue(0), queue(2), queue(1)]);
    store.insert_many("txns", [json!({ "s": 1 }), json!({ "s": 6 })]);

    let report = engine().run(&store).await.unwrap();

    assert_eq!(report.collections.len(), 1);
    assert_eq!(
        report.collections["charms"],
        CollectionStats {
            doc_count: 3,
            max_queued: 2,
            min_queued: 0,
            total_queued: 3,
        }
    );
    let in_progress = &report.in_progress;
    assert_eq!(in_progress.total_txns, 2);
    assert_eq!(in_progress.count(TransactionState::Preparing), 1);
    assert_eq!(in_progress.count(TransactionState::Applied), 1);
    for state in [
        TransactionState::Invalid,
        TransactionState::Prepared,
        TransactionState::Aborting,
        TransactionState::Applying,
        TransactionState::Aborted,
    ] {
        assert_eq!(in_progress.count(state), 0);
    }
    assert_eq!(in_progress.states.len(), 7);
    assert_eq!(in_progress.max_ops, 0);
    assert_eq!(report.log.doc_count, 0);
}

#[tokio::test]
async fn test_null_state_counts_as_invalid() {
    let store = NullStore::new();
    store.insert_many("txns", [json!({ "s": 6 }), json!({ "s": null, "o": null })]);

    let report = engine().run(&store).await.unwrap();

    assert_eq!(report.in_progress.total_txns, 2);
    assert_eq!(report.in_progress.count(TransactionState::Invalid), 1);
    assert_eq!(report.in_progress.count(TransactionState::Applied), 1);
}

#[tokio::test]
async fn test_system_and_bookkeeping_collections_never_reported() {
    let store = NullStore::new();
    store.insert_many("system.indexes", [queue(3)]);
    store.insert_many("txns", [json!({ "s": 4, "txn-queue": ["x"] })]);
    store.insert_many("units", [queue(1)]);

    let report = engine().run(&store).await.unwrap();

    assert!(!report.collections.contains_key("system.indexes"));
    assert!(!report.collections.contains_key("txns"));
    assert!(report.collections.contains_key("units"));
}

#[tokio::test]
async fn test_collections_without_queued_tokens_are_dropped() {
    let store = NullStore::new();
    store.insert_many("machines", [queue(0), queue(0)]);
    store.insert_many("units", [queue(4)]);
    store.create_collection("settings");
    store.insert_many("txns.log", [json!({ "_id": 1 }), json!({ "_id": 2 })]);

    let report = engine().run(&store).await.unwrap();

    assert_eq!(report.collections.keys().collect::<Vec<_>>(), vec!["units"]);
    assert_eq!(report.log.doc_count, 2);
    // Scanned even though absent from the report.
    assert!(store.operations_started() >= 5);
}

#[tokio::test]
async fn test_mid_stream_failure_fails_whole_run() {
    let store = NullStore::new();
    store.insert_many("bar", [queue(1)]);
    store.insert_many("foo", (0..50).map(|_| queue(1)));
    store.fail_cursor_after("foo", 10, "read tcp: i/o timeout");
    store.insert_many("txns", [json!({ "s": 2 })]);

    let err = engine().run(&store).await.unwrap_err();

    assert_eq!(err.collection(), Some("foo"));
    assert!(err.to_string().contains("foo"));
    assert!(matches!(err, ScanError::Cursor { .. }));
}

#[tokio::test]
async fn test_log_count_failure_fails_whole_run() {
    let store = NullStore::new();
    store.insert_many("units", [queue(1)]);
    store.fail_count("txns.log", "not authorized");

    let err = engine().run(&store).await.unwrap_err();
    assert!(matches!(err, ScanError::Count { .. }));
}

#[tokio::test]
async fn test_runs_against_unchanged_database_are_identical() {
    let store = NullStore::new();
    for (i, name) in ["units", "machines", "charms", "applications", "txns.stash"]
        .iter()
        .enumerate()
    {
        store.insert_many(name, (0..=i).map(queue));
    }
    store.insert_many(
        "txns",
        (0..20).map(|i| json!({ "s": i % 9, "o": vec![json!({ "c": "units" }); i % 4] })),
    );

    let first = serde_json::to_vec_pretty(&engine().run(&store).await.unwrap()).unwrap();
    let second = serde_json::to_vec_pretty(&engine().run(&store).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let store = NullStore::new();
    for i in 0..24 {
        store.insert_many(&format!("coll{i:02}"), [queue(1), queue(2)]);
    }
    store.set_latency(Duration::from_millis(5));

    let report = Engine::new(EngineConfig {
        concurrency: 3,
        ..EngineConfig::default()
    })
    .run(&store)
    .await
    .unwrap();

    assert_eq!(report.collections.len(), 24);
    assert!(store.max_in_flight() <= 3, "saw {}", store.max_in_flight());
    assert!(store.max_in_flight() >= 2, "scans never overlapped");
    assert_eq!(store.in_flight(), 0);
}

#[tokio::test]
async fn test_first_error_cancels_remaining_scans() {
    let store = NullStore::new();
    store.create_collection("aaa");
    store.fail_find("aaa", "not authorized");
    for i in 0..20 {
        store.insert_many(&format!("slow{i:02}"), (0..5).map(|_| queue(1)));
    }
    store.set_latency(Duration::from_millis(20));

    let err = Engine::new(EngineConfig {
        concurrency: 2,
        ..EngineConfig::default()
    })
    .run(&store)
    .await
    .unwrap_err();
    assert_eq!(err.collection(), Some("aaa"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.in_flight(), 0);
    assert!(store.operations_started() < 22);
}

#[tokio::test]
async fn test_deadline_expires_on_slow_store() {
    let store = NullStore::new();
    store.insert_many("units", (0..10).map(|_| queue(1)));
    store.set_latency(Duration::from_millis(100));

    let err = Engine::new(EngineConfig {
        timeout: Some(Duration::from_millis(50)),
        ..EngineConfig::default()
    })
    .run(&store)
    .await
    .unwrap_err();
    assert!(matches!(err, ScanError::Timeout(_)));
}

#[tokio::test]
async fn test_panicking_scan_surfaces_join_error() {
    let store = NullStore::new();
    store.insert_many("units", [queue(1)]);
    store.panic_on_find("units", "cursor state corrupted");

    let err = engine().run(&store).await.unwrap_err();
    match &err {
        ScanError::Task(join) => assert!(join.is_panic()),
        other => panic!("expected a task failure, got {other:?}"),
    }
    let source = std::error::Error::source(&err).expect("join error kept as source");
    assert!(source.to_string().contains("panic"), "source: {source}");
}
