//! TCP client transport for talking to the relay.
//!
//! [`GameClient::connect`] returns the client handle plus a receiver of decoded
//! [`ServerMessage`]s. Sending is synchronous and non-blocking: messages are
//! queued for a writer task, so a game tick never waits on the socket. State
//! changes are broadcast via a [`watch`] channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch};

use crate::framing::{FrameConfig, FrameError, read_frame, write_frame};
use crate::messages::{ClientMessage, ServerMessage, deserialize_message, serialize_message};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Attempting to establish a TCP connection.
    Connecting,
    /// TCP connection established, ready for communication.
    Connected,
    /// Connection lost or intentionally closed.
    Disconnected,
}

/// Observable connection state backed by a [`watch`] channel.
pub struct ConnectionStateWatch {
    tx: watch::Sender<ConnectionState>,
    rx: watch::Receiver<ConnectionState>,
}

impl Default for ConnectionStateWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateWatch {
    /// Create a new watch initialized to [`ConnectionState::Disconnected`].
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx, rx }
    }

    /// Set the current connection state, notifying all subscribers.
    pub fn set(&self, state: ConnectionState) {
        let _ = self.tx.send(state);
    }

    /// Return a new subscriber receiver.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.rx.clone()
    }

    /// Return the current state without blocking.
    pub fn current(&self) -> ConnectionState {
        *self.rx.borrow()
    }
}

/// Handle to a relay connection.
pub struct GameClient {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    state: Arc<ConnectionStateWatch>,
    /// Sending `true` causes the reader and writer tasks to exit.
    shutdown_tx: watch::Sender<bool>,
}

impl GameClient {
    /// Connect to the relay at `addr`.
    ///
    /// Sets `TCP_NODELAY`, splits the stream, and spawns the reader and writer
    /// tasks. Incoming messages arrive on the returned receiver in order; it
    /// yields `None` once the connection is gone.
    pub async fn connect(
        addr: SocketAddr,
        frame: FrameConfig,
    ) -> std::io::Result<(Self, mpsc::UnboundedReceiver<ServerMessage>)> {
        let state = Arc::new(ConnectionStateWatch::new());
        state.set(ConnectionState::Connecting);

        let stream = match TcpStream::connect(addr).await {
            Ok(stream) => stream,
            Err(e) => {
                state.set(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        stream.set_nodelay(true)?;
        state.set(ConnectionState::Connected);
        tracing::info!("Connected to relay at {addr}");

        let (reader, writer) = stream.into_split();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let reader_state = Arc::clone(&state);
        let mut reader_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            Self::read_loop(reader, frame, incoming_tx, &reader_state, &mut reader_shutdown).await;
        });

        let writer_state = Arc::clone(&state);
        let mut writer_shutdown = shutdown_rx;
        tokio::spawn(async move {
            Self::write_loop(writer, frame, outbound_rx, &writer_state, &mut writer_shutdown).await;
        });

        let client = Self {
            outbound: outbound_tx,
            state,
            shutdown_tx,
        };
        Ok((client, incoming_rx))
    }

    /// Queue a message for the relay.
    pub fn send(&self, message: ClientMessage) -> Result<(), FrameError> {
        self.outbound
            .send(message)
            .map_err(|_| FrameError::ConnectionClosed)
    }

    /// Return the connection state watch.
    pub fn state(&self) -> &Arc<ConnectionStateWatch> {
        &self.state
    }

    /// Disconnect from the relay.
    ///
    /// Signals background tasks to exit and transitions state to
    /// [`ConnectionState::Disconnected`] immediately.
    pub fn disconnect(&self) {
        let _ = self.shutdown_tx.send(true);
        self.state.set(ConnectionState::Disconnected);
    }

    async fn read_loop(
        mut reader: OwnedReadHalf,
        frame: FrameConfig,
        incoming: mpsc::UnboundedSender<ServerMessage>,
        state: &ConnectionStateWatch,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                result = read_frame(&mut reader, &frame) => {
                    let payload = match result {
                        Ok(payload) => payload,
                        Err(e) => {
                            if !matches!(e, FrameError::ConnectionClosed) {
                                tracing::warn!("Relay connection failed: {e}");
                            }
                            state.set(ConnectionState::Disconnected);
                            break;
                        }
                    };
                    match deserialize_message::<ServerMessage>(&payload) {
                        Ok(message) => {
                            tracing::trace!("Relay sent {message:?}");
                            if incoming.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Skipping malformed relay frame: {e}"),
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

    async fn write_loop(
        mut writer: OwnedWriteHalf,
        frame: FrameConfig,
        mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
        state: &ConnectionStateWatch,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                next = outbound.recv() => {
                    let Some(message) = next else { break };
                    let payload = match serialize_message(&message) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::warn!("Dropping unencodable message: {e}");
                            continue;
                        }
                    };
                    if let Err(e) = write_frame(&mut writer, &payload, &frame).await {
                        tracing::warn!("Write to relay failed: {e}");
                        state.set(ConnectionState::Disconnected);
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

impl Drop for GameClient {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
