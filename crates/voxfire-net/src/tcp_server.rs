//! TCP transport for the relay.
//!
//! Each accepted connection gets a reader task, which decodes
//! [`ClientMessage`]s and forwards them as [`ServerEvent`]s to whoever owns the
//! relay state, and a writer task, which drains that connection's outbound
//! queue. Outbound payloads are encoded once and shared between recipients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{RwLock, mpsc, watch};

use crate::framing::{FrameConfig, FrameError, read_frame, write_frame};
use crate::messages::{ClientMessage, ConnectionId, deserialize_message};

/// Atomic generator for monotonically increasing [`ConnectionId`]s.
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a new generator starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Return the next unique [`ConnectionId`].
    pub fn next_id(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned when the connection map is at capacity.
#[derive(Debug, thiserror::Error)]
#[error("connection limit reached")]
pub struct ConnectionLimitReached;

/// Encoded frame payload shared by every recipient of a broadcast.
pub type Payload = Arc<[u8]>;

/// Outbound queues of the live connections, keyed by [`ConnectionId`].
pub struct ConnectionMap {
    inner: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Payload>>>,
    max_connections: usize,
}

impl ConnectionMap {
    /// Create a new map with the given capacity limit.
    pub fn new(max_connections: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            max_connections,
        }
    }

    /// Register a connection's outbound queue. Fails at capacity.
    pub async fn insert(
        &self,
        id: ConnectionId,
        outbound: mpsc::UnboundedSender<Payload>,
    ) -> Result<(), ConnectionLimitReached> {
        let mut map = self.inner.write().await;
        if map.len() >= self.max_connections {
            return Err(ConnectionLimitReached);
        }
        map.insert(id, outbound);
        Ok(())
    }

    /// Drop a connection's queue, which ends its writer task.
    pub async fn remove(&self, id: &ConnectionId) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Queue a payload for one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, id: ConnectionId, payload: Payload) -> bool {
        match self.inner.read().await.get(&id) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    /// Queue a payload for every connection except `except`.
    pub async fn broadcast(&self, payload: Payload, except: Option<ConnectionId>) {
        for (id, tx) in self.inner.read().await.iter() {
            if Some(*id) != except {
                let _ = tx.send(Arc::clone(&payload));
            }
        }
    }

    /// Return the number of active connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Return whether the map is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Connection lifecycle and traffic, in per-connection arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The connection is registered and can be sent to.
    Connected { id: ConnectionId },
    /// A decoded message from the connection.
    Message { id: ConnectionId, message: ClientMessage },
    /// The connection is gone and has left the map.
    Disconnected { id: ConnectionId },
}

/// Configuration for [`GameServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to. Default: `0.0.0.0:3000`.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections. Default: 64.
    pub max_connections: usize,
    /// Frame size limit for both directions.
    pub frame: FrameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: 64,
            frame: FrameConfig::default(),
        }
    }
}

/// TCP server that accepts relay connections and manages their lifecycle.
pub struct GameServer {
    config: ServerConfig,
    /// Active connections (public so the relay can deliver to them).
    pub connections: Arc<ConnectionMap>,
    id_gen: Arc<IdGenerator>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GameServer {
    /// Create a server and the receiver for its connection events.
    pub fn new(config: ServerConfig) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let server = Self {
            connections: Arc::new(ConnectionMap::new(config.max_connections)),
            id_gen: Arc::new(IdGenerator::new()),
            config,
            events_tx,
            shutdown_tx,
            shutdown_rx,
        };
        (server, events_rx)
    }

    /// Bind to the configured address and run the accept loop.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("Relay listening on {}", self.config.bind_addr);
        self.run_with_listener(listener).await
    }

    /// Run the accept loop with a pre-bound listener (useful for tests).
    pub async fn run_with_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, peer_addr) = result?;
                    stream.set_nodelay(true)?;

                    let id = self.id_gen.next_id();
                    let (reader, writer) = stream.into_split();
                    let (out_tx, out_rx) = mpsc::unbounded_channel();

                    if self.connections.insert(id, out_tx).await.is_err() {
                        tracing::warn!("Connection limit reached, rejecting {peer_addr}");
                        continue;
                    }

                    tracing::info!("Accepted connection {id} from {peer_addr}");

                    let frame = self.config.frame;
                    tokio::spawn(Self::write_loop(id, writer, out_rx, frame, self.shutdown_rx.clone()));

                    let connections = Arc::clone(&self.connections);
                    let events = self.events_tx.clone();
                    let mut task_shutdown = self.shutdown_rx.clone();
                    tokio::spawn(async move {
                        let _ = events.send(ServerEvent::Connected { id });
                        Self::read_loop(id, reader, frame, &events, &mut task_shutdown).await;
                        connections.remove(&id).await;
                        let _ = events.send(ServerEvent::Disconnected { id });
                        tracing::info!("Connection {id} closed");
                    });
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Relay shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Signal the server and every connection task to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Per-connection reader loop.
    async fn read_loop(
        id: ConnectionId,
        mut reader: OwnedReadHalf,
        frame: FrameConfig,
        events: &mpsc::UnboundedSender<ServerEvent>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                result = read_frame(&mut reader, &frame) => {
                    let payload = match result {
                        Ok(payload) => payload,
                        Err(FrameError::ConnectionClosed) => break,
                        Err(e) => {
                            tracing::warn!("Dropping connection {id}: {e}");
                            break;
                        }
                    };
                    match deserialize_message::<ClientMessage>(&payload) {
                        Ok(message) => {
                            tracing::debug!("Connection {id} sent {message:?}");
                            if events.send(ServerEvent::Message { id, message }).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Skipping malformed frame from {id}: {e}"),
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// Per-connection writer loop. Ends when the queue is dropped, a write
    /// fails, or shutdown is signalled; dropping the write half closes the
    /// socket.
    async fn write_loop(
        id: ConnectionId,
        mut writer: OwnedWriteHalf,
        mut outbound: mpsc::UnboundedReceiver<Payload>,
        frame: FrameConfig,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                next = outbound.recv() => {
                    let Some(payload) = next else { break };
                    if let Err(e) = write_frame(&mut writer, &payload, &frame).await {
                        tracing::warn!("Write to connection {id} failed: {e}");
                        break;
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
