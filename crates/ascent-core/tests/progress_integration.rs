//! Integration tests for the progress store.
//!
//! These run the store end to end against SQLite-backed local persistence
//! and the in-memory remote.

use std::sync::Arc;

use ascent_core::progress::{AssessmentScores, CategoryScore, DecisionTopic, Level, ProgressStore, StoreOptions};
use ascent_core::remote::{Identity, MemoryRemote, Query, UserId};
use ascent_core::storage::{Database, LocalStore, SqliteLocalStore};
use proptest::prelude::*;

fn sqlite_store(path: &std::path::Path, remote: Arc<MemoryRemote>) -> ProgressStore {
    let db = Database::open_at(path).unwrap();
    ProgressStore::new(
        Box::new(SqliteLocalStore::new(db)),
        remote,
        StoreOptions::default(),
    )
}

#[test]
fn test_anonymous_progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ascent.db");
    let remote = Arc::new(MemoryRemote::new());

    {
        let mut store = sqlite_store(&db_path, remote.clone());
        store.init(Identity::Anonymous);
        store.update_net_worth(12_000_000);
        assert!(store.complete_module("m1", 0));
        assert!(store.complete_module("m1", 2));
        store.update_decision(DecisionTopic::Banking, "two banks, one operating");
        store.dispose();
    }

    let mut store = sqlite_store(&db_path, remote.clone());
    store.init(Identity::Anonymous);
    assert_eq!(store.level(), Level::Accumulator);
    assert_eq!(store.module_completion_count("m1"), 2);
    assert_eq!(
        store.record().strategic_decisions.get(&DecisionTopic::Banking).map(String::as_str),
        Some("two banks, one operating")
    );
    assert_eq!(remote.save_calls(), 0);
}

#[test]
fn test_corrupt_local_record_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ascent.db");
    Database::open_at(&db_path)
        .unwrap()
        .kv_set(ascent_core::storage::local::PROGRESS_KEY, "{not json")
        .unwrap();

    let mut store = sqlite_store(&db_path, Arc::new(MemoryRemote::new()));
    store.init(Identity::Anonymous);
    assert_eq!(store.level(), Level::Architect);
    assert_eq!(store.record().total_completed_units(), 0);

    // The next mutation overwrites the bad record.
    store.complete_module("m1", 1);
    let reloaded = SqliteLocalStore::new(Database::open_at(&db_path).unwrap()).load();
    assert_eq!(reloaded.map(|r| r.completion_count("m1")), Some(1));
}

#[test]
fn test_authenticated_flow_reconciles_with_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MemoryRemote::new());
    let user = UserId::new("u-1");
    remote.seed(&user, "m1", &[0, 1]);

    let mut store = sqlite_store(&dir.path().join("ascent.db"), remote.clone());
    store.init(Identity::User(user.clone()));
    assert!(store.remote_query().is_pending());

    // Optimistic write before the read resolves.
    store.complete_module("m2", 4);
    assert_eq!(store.module_completion_count("m2"), 1);

    let report = store.sync();
    assert!(report.resolved);
    assert_eq!(report.flush.delivered, 1);
    assert!(matches!(store.remote_query(), Query::Ready(_)));
    assert_eq!(store.module_completion_count("m1"), 2);
    assert_eq!(store.module_completion_count("m2"), 1);
    assert_eq!(remote.completed_units(&user, "m2"), vec![4]);

    // Authenticated mode never writes the local record.
    let local = SqliteLocalStore::new(Database::open_at(&dir.path().join("ascent.db")).unwrap());
    assert!(local.load().is_none());
}

#[test]
fn test_offline_remote_surfaces_failures_after_retries() {
    let remote = Arc::new(MemoryRemote::new());
    let user = UserId::new("u-2");
    let dir = tempfile::tempdir().unwrap();
    let mut store = sqlite_store(&dir.path().join("ascent.db"), remote.clone());
    store.init(Identity::User(user.clone()));

    remote.set_offline(true);
    store.complete_module("m1", 0);
    for _ in 0..3 {
        store.sync();
    }
    let failures = store.take_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].write.module_id, "m1");
    assert_eq!(store.outbox_pending(), 0);
    // The optimistic view is kept.
    assert_eq!(store.module_completion_count("m1"), 1);

    remote.set_offline(false);
    let report = store.sync();
    assert!(report.resolved);
    assert!(store.take_failures().is_empty());
}

#[test]
fn test_assessment_history_accumulates() {
    let remote = Arc::new(MemoryRemote::new());
    let dir = tempfile::tempdir().unwrap();
    let mut store = sqlite_store(&dir.path().join("ascent.db"), remote);
    store.init(Identity::Anonymous);

    let scores = AssessmentScores {
        wealth: CategoryScore::new(6, 4, 5),
        health: CategoryScore::new(7, 7, 7),
        relationships: CategoryScore::new(8, 6, 9),
    };
    store.add_assessment_snapshot(scores).unwrap();
    store
        .add_assessment_snapshot(AssessmentScores {
            wealth: CategoryScore::new(11, 0, 0),
            ..scores
        })
        .unwrap_err();

    assert_eq!(store.record().assessment_history.len(), 1);
    assert_eq!(store.record().latest_assessment().map(|a| a.scores), Some(scores));
}

proptest! {
    #[test]
    fn completion_count_never_exceeds_distinct_units(
        units in proptest::collection::vec(0u32..20, 0..60)
    ) {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = ProgressStore::new(
            Box::new(ascent_core::storage::MemoryLocalStore::new()),
            remote,
            StoreOptions::default(),
        );
        store.init(Identity::Anonymous);
        for &unit in &units {
            store.complete_module("m1", unit);
        }
        let mut distinct = units.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(store.module_completion_count("m1"), distinct.len());
    }

    #[test]
    fn level_always_matches_net_worth(amounts in proptest::collection::vec(any::<u64>(), 1..10)) {
        let mut store = ProgressStore::new(
            Box::new(ascent_core::storage::MemoryLocalStore::new()),
            Arc::new(MemoryRemote::new()),
            StoreOptions::default(),
        );
        store.init(Identity::Anonymous);
        for &amount in &amounts {
            store.update_net_worth(amount);
            prop_assert_eq!(store.level(), Level::for_net_worth(amount));
        }
    }
}
