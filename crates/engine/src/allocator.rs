//! Single entry point bundling assignment, outcome recording and
//! introspection over one shared store handle.

use crate::coordinator::AssignmentCoordinator;
use crate::events::{sink_for, EventSink};
use crate::introspection::{Introspection, TestSummary};
use crate::random::{RandomSource, ThreadRandom};
use crate::recorder::OutcomeRecorder;
use crate::session::SessionHandle;
use banditry_core::{BanditConfig, BanditResult, KeySpace};
use banditry_store::{CounterStore, RedisStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub struct Allocator {
    coordinator: AssignmentCoordinator,
    recorder: OutcomeRecorder,
    introspection: Introspection,
}

impl Allocator {
    /// Production wiring: thread-local randomness and the configured event sink.
    pub fn new(store: Arc<dyn CounterStore>, config: &BanditConfig) -> Self {
        Self::with_parts(
            store,
            KeySpace::new(config.namespace.clone()),
            config.capacity_bytes,
            Arc::new(ThreadRandom),
            sink_for(config.event_sink),
        )
    }

    pub fn with_parts(
        store: Arc<dyn CounterStore>,
        keys: KeySpace,
        capacity_bytes: u64,
        random: Arc<dyn RandomSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            coordinator: AssignmentCoordinator::new(
                store.clone(),
                keys.clone(),
                random.clone(),
                sink.clone(),
            ),
            recorder: OutcomeRecorder::new(store.clone(), keys.clone(), random, sink),
            introspection: Introspection::new(store, keys, capacity_bytes),
        }
    }

    /// Connect to the configured Redis store and wire an allocator around it.
    pub async fn connect(config: &BanditConfig) -> BanditResult<Self> {
        let store = RedisStore::from_config(&config.store).await?;
        info!(namespace = %config.namespace, "Allocator ready");
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn coordinator(&self) -> &AssignmentCoordinator {
        &self.coordinator
    }

    pub fn recorder(&self) -> &OutcomeRecorder {
        &self.recorder
    }

    pub fn introspection(&self) -> &Introspection {
        &self.introspection
    }

    pub async fn measure<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        options: &[&str],
        session: &mut S,
    ) -> BanditResult<String> {
        self.coordinator.measure(test, options, session).await
    }

    pub async fn spin<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        goal: &str,
        options: &[&str],
        session: &mut S,
    ) -> BanditResult<String> {
        self.coordinator.spin(test, goal, options, session).await
    }

    pub async fn win_on_option<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        choice: Option<&str>,
        session: &mut S,
    ) -> BanditResult<()> {
        self.recorder.win_on_option(test, choice, session).await
    }

    pub async fn lose_on_option<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        choice: Option<&str>,
        session: &mut S,
    ) -> BanditResult<()> {
        self.recorder.lose_on_option(test, choice, session).await
    }

    pub async fn win<S: SessionHandle + ?Sized>(
        &self,
        goal: &str,
        session: &mut S,
    ) -> BanditResult<usize> {
        self.recorder.win(goal, session).await
    }

    pub async fn all_tests(&self) -> BanditResult<BTreeMap<String, TestSummary>> {
        self.introspection.all_tests().await
    }

    pub async fn spins_for(&self, test: &str, option: &str) -> BanditResult<i64> {
        self.introspection.spins_for(test, option).await
    }

    pub async fn wins_for(&self, test: &str, option: &str) -> BanditResult<i64> {
        self.introspection.wins_for(test, option).await
    }

    pub async fn used_storage(&self) -> BanditResult<f64> {
        self.introspection.used_storage().await
    }
}
