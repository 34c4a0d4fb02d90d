//! Relay startup and runtime errors.

use std::net::AddrParseError;

use voxfire_config::ConfigError;

/// Errors that stop the relay.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured address and port do not form a socket address.
    #[error("invalid bind address {addr}: {source}")]
    InvalidBindAddress {
        addr: String,
        source: AddrParseError,
    },

    /// The config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Binding, accepting or signal handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
