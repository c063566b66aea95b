//! Counter and set storage behind the allocator.
//!
//! The engine never reads-modifies-writes a counter: every update is a single
//! `increment`/`decrement` call, so atomicity is entirely the store's job.

#![warn(clippy::unwrap_used)]

pub mod client;
pub mod glob;
pub mod local;
pub mod target;

use async_trait::async_trait;
use banditry_core::BanditResult;
use std::collections::HashSet;

pub use client::RedisStore;
pub use local::MemoryStore;
pub use target::StoreTarget;

/// Atomic counters and string sets addressed by plain keys.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current counter value; an absent key reads as 0.
    async fn get(&self, key: &str) -> BanditResult<i64>;

    async fn increment(&self, key: &str) -> BanditResult<i64>;

    async fn decrement(&self, key: &str) -> BanditResult<i64>;

    /// Idempotent set insert.
    async fn add_to_set(&self, set: &str, member: &str) -> BanditResult<()>;

    /// Members of `set`; an absent set is empty.
    async fn members_of_set(&self, set: &str) -> BanditResult<HashSet<String>>;

    /// Keys matching a Redis-style glob, counters and sets alike.
    async fn keys_matching(&self, pattern: &str) -> BanditResult<Vec<String>>;

    async fn used_memory_bytes(&self) -> BanditResult<u64>;
}
