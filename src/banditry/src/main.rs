//! Banditry operator CLI: inspect tests, counters and store usage.

use banditry_core::config::BanditConfig;
use banditry_engine::Allocator;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "banditry")]
#[command(about = "Inspect Thompson-sampling allocation state")]
#[command(version)]
struct Cli {
    /// Store address (overrides config)
    #[arg(long, env = "BANDITRY__STORE__ADDRESS")]
    address: Option<String>,

    /// Key namespace (overrides config)
    #[arg(long, env = "BANDITRY__NAMESPACE")]
    namespace: Option<String>,

    /// Capacity the usage ratio is computed against (overrides config)
    #[arg(long, env = "BANDITRY__CAPACITY_BYTES")]
    capacity_bytes: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every test with its goal and the options spun so far
    Tests,
    /// Show spin and win counters for one option
    Stats {
        #[arg(long)]
        test: String,
        #[arg(long)]
        option: String,
    },
    /// Show store memory use as a share of capacity
    Usage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banditry=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = BanditConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        BanditConfig::default()
    });

    if let Some(address) = cli.address {
        config.store.address = address;
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    if let Some(capacity) = cli.capacity_bytes {
        config.capacity_bytes = capacity;
    }

    info!(
        address = %config.store.address,
        namespace = %config.namespace,
        "Connecting allocator"
    );
    let allocator = Allocator::connect(&config).await?;

    let output = match cli.command {
        Command::Tests => serde_json::to_value(allocator.all_tests().await?)?,
        Command::Stats { test, option } => serde_json::json!({
            "test": test,
            "option": option,
            "spins": allocator.spins_for(&test, &option).await?,
            "wins": allocator.wins_for(&test, &option).await?,
        }),
        Command::Usage => serde_json::json!({
            "used_storage": allocator.used_storage().await?,
            "capacity_bytes": config.capacity_bytes,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
