//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Relay connection settings.
    pub network: NetworkConfig,
    /// World dimensions and terrain parameters.
    pub world: WorldConfig,
    /// Local player movement tuning.
    pub player: PlayerConfig,
    /// Projectile and life tuning.
    pub combat: CombatConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Network/multiplayer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Relay address clients connect to, or the address the relay binds.
    pub server_address: String,
    /// Relay port.
    pub server_port: u16,
    /// Maximum concurrent connections accepted by the relay.
    pub max_connections: usize,
    /// Maximum size of a single frame payload in bytes.
    pub max_frame_bytes: u32,
}

/// World dimensions and terrain generation parameters.
///
/// Every client generates its world from these values, so they must match
/// across a session for collision to agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal extent of the world on both X and Z, in blocks.
    pub width: u32,
    /// Vertical extent of the world, in blocks.
    pub height: u32,
    /// Terrain noise seed.
    pub seed: u32,
    /// Horizontal noise scale (larger = smoother hills).
    pub terrain_scale: f64,
    /// Noise amplitude as a fraction of world height.
    pub terrain_magnitude: f64,
    /// Base terrain height as a fraction of world height.
    pub terrain_offset: f64,
}

/// Local player movement tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal walk speed in blocks per second.
    pub speed: f32,
    /// Downward acceleration in blocks per second squared.
    pub gravity: f32,
    /// Upward velocity applied on jump.
    pub jump_speed: f32,
    /// Half of the player box width on X and Z.
    pub half_width: f32,
    /// Player box height. The top of the box sits at eye height.
    pub height: f32,
    /// Distance from the eye down to the avatar center used for hit tests.
    pub avatar_eye_offset: f32,
    /// Radians of yaw/pitch per unit of pointer motion.
    pub mouse_sensitivity: f32,
    /// Eye position the local player spawns at.
    pub spawn_position: [f32; 3],
    /// Upper bound for a single frame's elapsed time in seconds.
    pub max_frame_delta: f32,
}

/// Projectile and life tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CombatConfig {
    /// Projectile speed in blocks per second.
    pub bullet_speed: f32,
    /// Distance from the world origin beyond which projectiles are retired.
    pub max_range: f32,
    /// Distance from an avatar center at which a projectile hits.
    pub hit_radius: f32,
    /// Lives at session start.
    pub starting_lives: u32,
    /// Seconds the game-over overlay stays up before the session resets.
    pub reset_delay_secs: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 3000,
            max_connections: 64,
            max_frame_bytes: 65_536,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            seed: 0,
            terrain_scale: 30.0,
            terrain_magnitude: 0.4,
            terrain_offset: 0.15,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            gravity: 40.0,
            jump_speed: 12.0,
            half_width: 0.25,
            height: 1.8,
            avatar_eye_offset: 0.5,
            mouse_sensitivity: 0.002,
            spawn_position: [20.0, 34.0, 20.0],
            max_frame_delta: 0.1,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 60.0,
            max_range: 100.0,
            hit_radius: 0.5,
            starting_lives: 5,
            reset_delay_secs: 3.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for voxfire (e.g. `~/.config/voxfire`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("voxfire"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// `address:port` string for the relay.
    pub fn server_endpoint(&self) -> String {
        format!("{}:{}", self.network.server_address, self.network.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 128"));
        assert!(ron_str.contains("server_port: 3000"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(network: (), world: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.combat, CombatConfig::default());
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(combat: (starting_lives: 3))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.combat.starting_lives, 3);
        assert_eq!(config.combat.bullet_speed, 60.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.seed = 42;
        config.network.server_address = "10.0.0.1".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.combat.hit_radius = 0.75;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().combat.hit_radius, 0.75);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_endpoint_format() {
        let config = Config::default();
        assert_eq!(config.server_endpoint(), "127.0.0.1:3000");
    }
}
