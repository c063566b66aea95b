use serde::Deserialize;

/// Root allocator configuration. Loaded from environment variables
/// with the prefix `BANDITRY__`.
#[derive(Debug, Clone, Deserialize)]
pub struct BanditConfig {
    /// Prefix for every counter and goal key written by the engine.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Store size that `used_storage` reports against.
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: u64,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub event_sink: EventSinkKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `host:port`, `host:port:db`, `host:port/namespace` or a `redis://` URL.
    #[serde(default = "default_store_address")]
    pub address: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Where allocation events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    #[default]
    Tracing,
    Stdout,
}

fn default_namespace() -> String {
    "bandit".to_string()
}
fn default_capacity_bytes() -> u64 {
    104_857_600
}
fn default_store_address() -> String {
    "redis://localhost:6379".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            capacity_bytes: default_capacity_bytes(),
            store: StoreConfig::default(),
            event_sink: EventSinkKind::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: default_store_address(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl BanditConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BANDITRY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
