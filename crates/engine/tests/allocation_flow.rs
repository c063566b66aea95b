//! End-to-end allocation flow against the in-memory store.

use async_trait::async_trait;
use banditry_core::{AllocationEvent, BanditError, BanditResult, EventKind, KeySpace};
use banditry_engine::{
    Allocator, EventSink, MemorySession, MemorySink, SeededRandom, SessionHandle,
};
use banditry_store::{CounterStore, MemoryStore};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

fn allocator(store: Arc<dyn CounterStore>, sink: Arc<dyn EventSink>, seed: u64) -> Allocator {
    Allocator::with_parts(
        store,
        KeySpace::new("flow"),
        104_857_600,
        Arc::new(SeededRandom::new(seed)),
        sink,
    )
}

/// Store whose every call fails, as if the connection dropped.
struct DownStore;

fn down<T>() -> BanditResult<T> {
    Err(BanditError::Store("connection refused".to_string()))
}

#[async_trait]
impl CounterStore for DownStore {
    async fn get(&self, _key: &str) -> BanditResult<i64> {
        down()
    }
    async fn increment(&self, _key: &str) -> BanditResult<i64> {
        down()
    }
    async fn decrement(&self, _key: &str) -> BanditResult<i64> {
        down()
    }
    async fn add_to_set(&self, _set: &str, _member: &str) -> BanditResult<()> {
        down()
    }
    async fn members_of_set(&self, _set: &str) -> BanditResult<HashSet<String>> {
        down()
    }
    async fn keys_matching(&self, _pattern: &str) -> BanditResult<Vec<String>> {
        down()
    }
    async fn used_memory_bytes(&self) -> BanditResult<u64> {
        down()
    }
}

struct BrokenSink;

impl EventSink for BrokenSink {
    fn emit(&self, _event: &AllocationEvent) -> BanditResult<()> {
        Err(BanditError::EventSink("log pipe closed".to_string()))
    }
}

#[tokio::test]
async fn spin_then_win_credits_the_assigned_option() {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(MemorySink::new());
    let alloc = allocator(store.clone(), sink.clone(), 21);

    let mut visitor = MemorySession::with_id("visitor-1");
    let choice = alloc
        .spin("cta", "signup", &["red", "blue"], &mut visitor)
        .await
        .unwrap();
    let other = if choice == "red" { "blue" } else { "red" };

    // A second test under the same goal that this visitor never saw.
    let mut someone_else = MemorySession::with_id("visitor-2");
    let hero = alloc
        .spin("hero", "signup", &["big", "small"], &mut someone_else)
        .await
        .unwrap();

    assert_eq!(alloc.win("signup", &mut visitor).await.unwrap(), 1);

    assert_eq!(alloc.wins_for("cta", &choice).await.unwrap(), 1);
    assert_eq!(alloc.wins_for("cta", other).await.unwrap(), 0);
    assert_eq!(alloc.wins_for("hero", &hero).await.unwrap(), 0);
    assert_eq!(alloc.spins_for("cta", &choice).await.unwrap(), 1);

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].kind, EventKind::Win);
    assert_eq!(events[2].choice, choice);
    assert!(events[2].nonce.starts_with("visitor-1_"));
}

#[tokio::test]
async fn repeat_visits_are_sticky() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store.clone(), Arc::new(MemorySink::new()), 22);
    let mut session = MemorySession::new();

    let mut seen = BTreeSet::new();
    for _ in 0..10 {
        seen.insert(
            alloc
                .spin("cta", "signup", &["red", "blue", "green"], &mut session)
                .await
                .unwrap(),
        );
    }
    assert_eq!(seen.len(), 1);

    let choice = seen.into_iter().next().unwrap();
    assert_eq!(alloc.spins_for("cta", &choice).await.unwrap(), 1);
    assert_eq!(session.get("cta"), Some(choice));
}

#[tokio::test]
async fn single_option_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store.clone(), Arc::new(MemorySink::new()), 23);
    let mut session = MemorySession::new();

    for _ in 0..3 {
        let choice = alloc
            .spin("cta", "signup", &["solo"], &mut session)
            .await
            .unwrap();
        assert_eq!(choice, "solo");
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn losses_drive_wins_negative() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store, Arc::new(MemorySink::new()), 24);
    let mut session = MemorySession::new();

    alloc
        .win_on_option("cta", Some("red"), &mut session)
        .await
        .unwrap();
    for _ in 0..3 {
        alloc
            .lose_on_option("cta", Some("red"), &mut session)
            .await
            .unwrap();
    }
    assert_eq!(alloc.wins_for("cta", "red").await.unwrap(), -2);
}

#[tokio::test]
async fn all_tests_reports_spun_options_and_goal() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store, Arc::new(MemorySink::new()), 25);

    // Keep spinning fresh sessions until both options have been shown.
    let mut shown = BTreeSet::new();
    for _ in 0..200 {
        let mut session = MemorySession::new();
        shown.insert(
            alloc
                .spin("cta", "signup", &["red", "blue"], &mut session)
                .await
                .unwrap(),
        );
        if shown.len() == 2 {
            break;
        }
    }
    assert_eq!(shown.len(), 2);

    let tests = alloc.all_tests().await.unwrap();
    let cta = &tests["cta"];
    assert_eq!(cta.goal, "signup");
    assert_eq!(
        cta.options,
        BTreeSet::from(["red".to_string(), "blue".to_string()])
    );
}

#[tokio::test]
async fn measure_results_do_not_show_up_as_goal_tests() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store, Arc::new(MemorySink::new()), 26);
    let mut session = MemorySession::new();

    let choice = alloc
        .measure("layout", &["grid", "list"], &mut session)
        .await
        .unwrap();
    assert_eq!(alloc.spins_for("layout", &choice).await.unwrap(), 1);
    assert!(alloc.all_tests().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_propagates_without_assigning() {
    let alloc = allocator(Arc::new(DownStore), Arc::new(MemorySink::new()), 27);
    let mut session = MemorySession::new();

    let result = alloc
        .spin("cta", "signup", &["red", "blue"], &mut session)
        .await;
    assert!(matches!(result, Err(BanditError::Store(_))));
    assert!(!session.has("cta"));

    session.set("cta", "red".to_string());
    assert!(alloc.win("signup", &mut session).await.is_err());
    assert!(alloc.used_storage().await.is_err());
}

#[tokio::test]
async fn sink_failure_propagates_before_counting() {
    let store = Arc::new(MemoryStore::new());
    let alloc = allocator(store.clone(), Arc::new(BrokenSink), 28);
    let mut session = MemorySession::new();

    let result = alloc.measure("layout", &["grid", "list"], &mut session).await;
    assert!(matches!(result, Err(BanditError::EventSink(_))));
    assert!(store.keys_matching("flow/layout/*").await.unwrap().is_empty());
    assert!(!session.has("layout"));
}

#[tokio::test]
async fn concurrent_sessions_count_every_spin() {
    let store = Arc::new(MemoryStore::new());
    let alloc = Arc::new(allocator(store, Arc::new(MemorySink::new()), 29));

    let mut handles = Vec::new();
    for i in 0..64 {
        let alloc = alloc.clone();
        handles.push(tokio::spawn(async move {
            let mut session = MemorySession::with_id(format!("s-{i}"));
            alloc
                .spin("cta", "signup", &["red", "blue"], &mut session)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = alloc.spins_for("cta", "red").await.unwrap()
        + alloc.spins_for("cta", "blue").await.unwrap();
    assert_eq!(total, 64);
}
