//! Length-prefixed framing for relay TCP streams.
//!
//! ```text
//! +-------------------+-------------------------------+
//! | length (4 bytes)  | payload (length bytes)        |
//! | u32 little-endian | [version u8][JSON message]    |
//! +-------------------+-------------------------------+
//! ```
//!
//! The length does not include the prefix itself. A zero-length frame is
//! legal at this layer; the message codec rejects it as an empty payload.

use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Frame size limits shared by both ends of a connection.
#[derive(Debug, Clone, Copy)]
pub struct FrameConfig {
    /// Largest payload accepted or produced, in bytes.
    pub max_payload_size: u32,
}

impl FrameConfig {
    pub fn new(max_payload_size: u32) -> Self {
        Self { max_payload_size }
    }

    fn check(&self, size: u32) -> Result<(), FrameError> {
        if size > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.max_payload_size,
            });
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new(65_536)
    }
}

/// Errors that can occur while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload size exceeds the configured maximum.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: u32, max: u32 },

    /// The peer closed the connection, possibly mid-frame.
    #[error("connection closed")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn eof_as_closed(e: std::io::Error) -> FrameError {
    if e.kind() == ErrorKind::UnexpectedEof {
        FrameError::ConnectionClosed
    } else {
        FrameError::Io(e)
    }
}

/// Read one frame and return its payload.
///
/// An oversized length prefix leaves the stream unsynchronized; callers must
/// drop the connection after [`FrameError::PayloadTooLarge`].
pub async fn read_frame<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, FrameError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(eof_as_closed)?;

    let len = u32::from_le_bytes(len_buf);
    config.check(len)?;

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(eof_as_closed)?;
    Ok(payload)
}

/// Write one frame and flush.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<(), FrameError> {
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    config.check(len)?;

    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
