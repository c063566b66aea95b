//! Read-only views over the counter store.

use banditry_core::{BanditError, BanditResult, KeySpace};
use banditry_store::CounterStore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A test as reconstructed from the store: its goal and every option that
/// has been spun at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub goal: String,
    pub options: BTreeSet<String>,
}

pub struct Introspection {
    store: Arc<dyn CounterStore>,
    keys: KeySpace,
    capacity_bytes: u64,
}

impl Introspection {
    pub fn new(store: Arc<dyn CounterStore>, keys: KeySpace, capacity_bytes: u64) -> Self {
        Self {
            store,
            keys,
            capacity_bytes,
        }
    }

    /// Every test registered under some goal.
    ///
    /// Goals are scanned in name order; a test misregistered under several
    /// goals reports the last one.
    pub async fn all_tests(&self) -> BanditResult<BTreeMap<String, TestSummary>> {
        let mut goal_keys = self.store.keys_matching(&self.keys.goals_pattern()).await?;
        goal_keys.sort();

        let mut tests = BTreeMap::new();
        for key in &goal_keys {
            let Some(goal) = self.keys.goal_from_key(key) else {
                continue;
            };
            for test in self.store.members_of_set(key).await? {
                tests.insert(
                    test,
                    TestSummary {
                        goal: goal.to_string(),
                        options: BTreeSet::new(),
                    },
                );
            }
        }

        for (test, summary) in tests.iter_mut() {
            let spin_keys = self
                .store
                .keys_matching(&self.keys.option_spins_pattern(test))
                .await?;
            summary.options = spin_keys
                .iter()
                .filter_map(|k| self.keys.option_from_spins_key(test, k))
                .map(str::to_string)
                .collect();
        }

        Ok(tests)
    }

    pub async fn spins_for(&self, test: &str, option: &str) -> BanditResult<i64> {
        self.store.get(&self.keys.spins(test, option)).await
    }

    pub async fn wins_for(&self, test: &str, option: &str) -> BanditResult<i64> {
        self.store.get(&self.keys.wins(test, option)).await
    }

    /// Share of the configured capacity the store reports as used.
    pub async fn used_storage(&self) -> BanditResult<f64> {
        if self.capacity_bytes == 0 {
            return Err(BanditError::Config(
                "storage capacity must be non-zero".to_string(),
            ));
        }
        let used = self.store.used_memory_bytes().await?;
        Ok(used as f64 / self.capacity_bytes as f64)
    }
}
