//! Arena client binary.
//!
//! # Examples
//!
//! ```bash
//! # Default map file (map.txt)
//! cargo run -p arena-client
//!
//! # Explicit map, fixed seed, custom tuning
//! ARENA_SEED=42 ARENA_CONFIG=arena.toml cargo run -p arena-client -- levels/cave.txt
//! ```

use anyhow::Result;
use arena_client::{ClientConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().with_map_arg(std::env::args().nth(1));

    let log_dir = logging::setup_logging(&config.session_id)?;

    tracing::info!("Starting arena client");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::debug!("Client config: {:?}", config);

    arena_client::run(config).await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}
