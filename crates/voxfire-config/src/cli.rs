//! Command-line argument parsing shared by the voxfire binaries.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ConfigError};

/// voxfire command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "voxfire", about = "voxfire voxel shooter")]
pub struct CliArgs {
    /// Relay address (bind address for the server, target for clients).
    #[arg(long)]
    pub server: Option<String>,

    /// Relay port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref addr) = args.server {
            self.network.server_address = addr.clone();
        }
        if let Some(port) = args.port {
            self.network.server_port = port;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

impl CliArgs {
    /// Config directory: `--config` if given, else the platform default.
    pub fn config_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(dir) => Ok(dir.clone()),
            None => Config::default_dir(),
        }
    }

    /// Load (or create) `config.ron` in the selected directory and apply the
    /// CLI overrides. Returns the config and the directory it came from.
    pub fn load_config(&self) -> Result<(Config, PathBuf), ConfigError> {
        let dir = self.config_dir()?;
        let mut config = Config::load_or_create(&dir)?;
        config.apply_cli_overrides(self);
        Ok((config, dir))
    }
}
