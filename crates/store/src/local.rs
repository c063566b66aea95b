//! In-process counter store backed by DashMap for lock-free concurrent access.
//! Serves embedded deployments and tests that have no Redis at hand.

use crate::glob::glob_match;
use crate::CounterStore;
use async_trait::async_trait;
use banditry_core::BanditResult;
use dashmap::DashMap;
use std::collections::HashSet;
use std::mem::size_of;

/// Counters and sets held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    counters: DashMap<String, i64>,
    sets: DashMap<String, HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `delta` under the shard lock so concurrent callers never lose an update.
    fn add(&self, key: &str, delta: i64) -> i64 {
        let mut entry = self.counters.entry(key.to_string()).or_insert(0);
        *entry += delta;
        *entry
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.sets.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn get(&self, key: &str) -> BanditResult<i64> {
        Ok(self.counters.get(key).map(|v| *v.value()).unwrap_or(0))
    }

    async fn increment(&self, key: &str) -> BanditResult<i64> {
        Ok(self.add(key, 1))
    }

    async fn decrement(&self, key: &str) -> BanditResult<i64> {
        Ok(self.add(key, -1))
    }

    async fn add_to_set(&self, set: &str, member: &str) -> BanditResult<()> {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn members_of_set(&self, set: &str) -> BanditResult<HashSet<String>> {
        Ok(self.sets.get(set).map(|s| s.value().clone()).unwrap_or_default())
    }

    async fn keys_matching(&self, pattern: &str) -> BanditResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .counters
            .iter()
            .map(|e| e.key().clone())
            .chain(self.sets.iter().map(|e| e.key().clone()))
            .filter(|k| glob_match(pattern, k))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Approximate payload size: key bytes, counter words and member bytes.
    async fn used_memory_bytes(&self) -> BanditResult<u64> {
        let counters: usize = self
            .counters
            .iter()
            .map(|e| e.key().len() + size_of::<i64>())
            .sum();
        let sets: usize = self
            .sets
            .iter()
            .map(|e| e.key().len() + e.value().iter().map(String::len).sum::<usize>())
            .sum();
        Ok((counters + sets) as u64)
    }
}
