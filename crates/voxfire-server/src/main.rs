//! voxfire relay server.
//!
//! Accepts client connections and rebroadcasts movement, shots and hit
//! reports between them.
//!
//! Run with: `cargo run -p voxfire-server -- --server 0.0.0.0`

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use voxfire_config::CliArgs;
use voxfire_net::GameServer;
use voxfire_server::{ServerError, server_config, spawn_hub};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = CliArgs::parse();
    let (config, config_dir) = args.load_config()?;

    voxfire_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    let server_config = server_config(&config.network)?;
    info!(
        "voxfire relay: bind={} max_connections={} max_frame_bytes={}",
        server_config.bind_addr, server_config.max_connections, config.network.max_frame_bytes
    );

    let (server, events) = GameServer::new(server_config);
    let server = Arc::new(server);
    let hub = spawn_hub(events, Arc::clone(&server.connections));

    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Ctrl-C received");
        }
    }

    server.shutdown();
    drop(server);
    if tokio::time::timeout(Duration::from_secs(2), hub).await.is_err() {
        tracing::warn!("Hub did not stop in time");
    }
    Ok(())
}
