//! Redis-backed counter store.
//! Counters map to INCR/DECR, goal sets to SADD/SMEMBERS.

use crate::target::StoreTarget;
use crate::CounterStore;
use async_trait::async_trait;
use banditry_core::config::StoreConfig;
use banditry_core::keys::escape_glob;
use banditry_core::{BanditError, BanditResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Redis counter store with an optional key namespace (`<namespace>:` prefix).
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: Option<String>,
}

fn store_err(e: redis::RedisError) -> BanditError {
    metrics::counter!("banditry.store.errors").increment(1);
    BanditError::Store(e.to_string())
}

impl RedisStore {
    /// Parse the configured address and connect within the configured timeout.
    pub async fn from_config(config: &StoreConfig) -> BanditResult<Self> {
        let target: StoreTarget = config.address.parse()?;
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        tokio::time::timeout(timeout, Self::connect(target))
            .await
            .map_err(|_| {
                BanditError::Store(format!(
                    "timed out after {}ms connecting to {}",
                    config.connect_timeout_ms, config.address
                ))
            })?
    }

    /// Connect to Redis and verify the connection.
    pub async fn connect(target: StoreTarget) -> BanditResult<Self> {
        let (client, namespace) = target.into_client()?;
        info!(namespace = ?namespace, "Connecting to Redis");

        let mut conn = ConnectionManager::new(client).await.map_err(store_err)?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        info!(response = %pong, "Redis connection established");

        Ok(Self {
            conn,
            prefix: namespace.map(|ns| format!("{ns}:")),
        })
    }

    fn key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }

    fn pattern(&self, pattern: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{pattern}", escape_glob(prefix)),
            None => pattern.to_string(),
        }
    }

    fn unprefixed(&self, key: String) -> String {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
                .unwrap_or(key),
            None => key,
        }
    }
}

/// Read `used_memory:<bytes>` out of an `INFO memory` reply.
pub fn parse_used_memory(info: &str) -> Option<u64> {
    info.lines()
        .find_map(|line| line.trim().strip_prefix("used_memory:"))
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn get(&self, key: &str) -> BanditResult<i64> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn.get(self.key(key)).await.map_err(store_err)?;
        Ok(value.unwrap_or(0))
    }

    async fn increment(&self, key: &str) -> BanditResult<i64> {
        let mut conn = self.conn.clone();
        conn.incr(self.key(key), 1).await.map_err(store_err)
    }

    async fn decrement(&self, key: &str) -> BanditResult<i64> {
        let mut conn = self.conn.clone();
        conn.decr(self.key(key), 1).await.map_err(store_err)
    }

    async fn add_to_set(&self, set: &str, member: &str) -> BanditResult<()> {
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(self.key(set), member)
            .await
            .map_err(store_err)
    }

    async fn members_of_set(&self, set: &str) -> BanditResult<HashSet<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(self.key(set)).await.map_err(store_err)
    }

    async fn keys_matching(&self, pattern: &str) -> BanditResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(self.pattern(pattern)).await.map_err(store_err)?;
        debug!(pattern = pattern, matched = keys.len(), "Key scan complete");
        Ok(keys.into_iter().map(|k| self.unprefixed(k)).collect())
    }

    async fn used_memory_bytes(&self) -> BanditResult<u64> {
        let mut conn = self.conn.clone();
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        parse_used_memory(&info)
            .ok_or_else(|| BanditError::Store("INFO reply has no used_memory field".to_string()))
    }
}
