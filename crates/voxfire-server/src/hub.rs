//! The single task that owns relay state.
//!
//! Connection reader tasks push [`ServerEvent`]s into one unbounded channel;
//! the hub applies them to the [`Relay`] in arrival order and hands the
//! encoded results to the per-connection writer queues.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voxfire_net::{ConnectionMap, ServerEvent, serialize_message};

use crate::relay::{Outbound, Recipients, Relay};

/// Run the hub until every event sender is gone.
pub async fn run_hub(
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
    connections: Arc<ConnectionMap>,
) {
    let mut relay = Relay::new();
    while let Some(event) = events.recv().await {
        for outbound in relay.handle(event) {
            deliver(&connections, outbound).await;
        }
    }
    tracing::info!("Relay hub stopped");
}

/// Spawn [`run_hub`] on the current runtime.
pub fn spawn_hub(
    events: mpsc::UnboundedReceiver<ServerEvent>,
    connections: Arc<ConnectionMap>,
) -> JoinHandle<()> {
    tokio::spawn(run_hub(events, connections))
}

async fn deliver(connections: &ConnectionMap, outbound: Outbound) {
    let payload: Arc<[u8]> = match serialize_message(&outbound.message) {
        Ok(bytes) => bytes.into(),
        Err(e) => {
            tracing::warn!("Failed to encode {:?}: {e}", outbound.message);
            return;
        }
    };
    match outbound.to {
        Recipients::Only(id) => {
            if !connections.send_to(id, payload).await {
                tracing::debug!("Connection {id} gone before delivery");
            }
        }
        Recipients::AllExcept(id) => connections.broadcast(payload, Some(id)).await,
        Recipients::All => connections.broadcast(payload, None).await,
    }
}
