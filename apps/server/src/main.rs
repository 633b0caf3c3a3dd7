//! # Stockroom Server Binary
//!
//! ## Usage
//! ```bash
//! # Defaults (0.0.0.0:3000, ./stockroom.db), or the platform stockroom.toml
//! cargo run -p stockroom-server
//!
//! # Explicit config file
//! cargo run -p stockroom-server -- --config ./stockroom.toml
//! ```

use std::path::PathBuf;

use tracing::info;

use stockroom_server::{init_tracing, serve, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Stockroom server...");

    let config_path = config_path_arg(std::env::args().skip(1));
    let config = ServerConfig::load(config_path)?;
    info!(
        addr = %config.server.bind_address(),
        db_path = %config.database.path.display(),
        max_connections = config.database.max_connections,
        "Configuration loaded"
    );

    serve(config).await
}

/// Reads `--config <path>` (or `-c <path>`) from the arguments.
fn config_path_arg(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
