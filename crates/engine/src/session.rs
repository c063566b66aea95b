//! Per-session scratchpad the host hands to the engine.

use std::collections::HashMap;
use uuid::Uuid;

/// Session flag that keeps a sticky assignment even after its option is
/// withdrawn from the offered set.
pub const MANUAL_OVERRIDE_KEY: &str = "manual_assignment_mode";

/// Capability interface over the host's session storage.
pub trait SessionHandle {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    fn delete(&mut self, key: &str);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stable session id. Implementations create one on first use if the
    /// host has not assigned it yet.
    fn identifier(&mut self) -> String;

    fn manual_override(&self) -> bool {
        self.has(MANUAL_OVERRIDE_KEY)
    }
}

/// Plain in-memory session, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    id: Option<String>,
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            values: HashMap::new(),
        }
    }
}

impl SessionHandle for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn identifier(&mut self) -> String {
        self.id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}
