//! The voxfire relay: a broadcast hub with no simulation of its own.

pub mod error;
pub mod hub;
pub mod relay;

use std::net::SocketAddr;

use voxfire_config::NetworkConfig;
use voxfire_net::{FrameConfig, ServerConfig};

pub use error::ServerError;
pub use hub::{run_hub, spawn_hub};
pub use relay::{Outbound, Recipients, Relay};

/// Transport settings for the relay from the `network` config section.
pub fn server_config(network: &NetworkConfig) -> Result<ServerConfig, ServerError> {
    let endpoint = format!("{}:{}", network.server_address, network.server_port);
    let bind_addr: SocketAddr = endpoint
        .parse()
        .map_err(|source| ServerError::InvalidBindAddress {
            addr: endpoint.clone(),
            source,
        })?;
    Ok(ServerConfig {
        bind_addr,
        max_connections: network.max_connections,
        frame: FrameConfig::new(network.max_frame_bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_network_section() {
        let network = NetworkConfig {
            server_address: "0.0.0.0".to_string(),
            server_port: 4000,
            max_connections: 8,
            max_frame_bytes: 1024,
        };
        let config = server_config(&network).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:4000".parse().unwrap());
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.frame.max_payload_size, 1024);
    }

    #[test]
    fn test_bad_address_rejected() {
        let network = NetworkConfig {
            server_address: "not an address".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            server_config(&network),
            Err(ServerError::InvalidBindAddress { .. })
        ));
    }
}
