//! Configuration module for pitfight-server.
//!
//! Handles loading configuration from a TOML file plus CLI overrides.

pub mod file;

pub use file::FileConfig;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// A missing config file is not an error: the server runs on
    /// defaults, so a bare `pitfight-server` invocation works.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let mut config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.config_path.display(), "no config file, using defaults");
                FileConfig::default()
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(listen) = self.listen_override {
            config.server.listen = listen;
        }

        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.game.match_kinds.is_empty() {
            return Err(ConfigError::Validation(
                "at least one match kind must be configured".to_owned(),
            ));
        }
        if config.game.rules.total_rounds == 0 {
            return Err(ConfigError::Validation(
                "total_rounds must be at least 1".to_owned(),
            ));
        }
        if config.game.betting.min_bet > config.game.betting.max_bet {
            return Err(ConfigError::Validation(
                "min_bet must not exceed max_bet".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let loader = ConfigLoader::new("/nonexistent/pitfight-config.toml", None);
        let config = loader.load().unwrap();
        assert_eq!(config.server.listen.port(), 8080);
    }

    #[test]
    fn listen_override_wins() {
        let listen = "127.0.0.1:1234".parse().unwrap();
        let loader = ConfigLoader::new("/nonexistent/pitfight-config.toml", Some(listen));
        let config = loader.load().unwrap();
        assert_eq!(config.server.listen, listen);
    }

    #[test]
    fn invalid_betting_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game.betting]\nmin_bet = 500\nmax_bet = 100\n").unwrap();
        let loader = ConfigLoader::new(&path, None);
        assert!(matches!(loader.load(), Err(ConfigError::Validation(_))));
    }
}
