//! TOML file configuration structures.
//!
//! These structs directly map to the `pitfight-config.toml` file
//! format. The `[game]` section reuses the core's `GameConfig`, so a
//! config file can override any piece of the game tuning.

use pitfight_core::config::GameConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub economy: EconomyConfig,
    pub game: GameConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            admin: AdminConfig::default(),
            storage: StorageConfig::default(),
            economy: EconomyConfig::default(),
            game: GameConfig::default(),
        }
    }
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on `/admin` routes. Empty disables the
    /// admin API entirely.
    pub secret: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
        }
    }
}

/// Where the JSON store keeps its files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./pitfight-data"),
        }
    }
}

/// In-process economy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance granted to accounts on first touch.
    pub starting_balance: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_parses_with_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [server]
            listen = "127.0.0.1:9000"

            [admin]
            secret = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.admin.secret, "hunter2");
        assert_eq!(config.economy.starting_balance, 10_000);
        assert_eq!(config.game.rules.total_rounds, 3);
    }

    #[test]
    fn game_section_overrides_apply() {
        let config: FileConfig = toml::from_str(
            r#"
            [game.rules]
            total_rounds = 5

            [game.betting]
            max_bet = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.game.rules.total_rounds, 5);
        assert_eq!(config.game.betting.max_bet, 500);
        assert_eq!(config.game.betting.min_bet, 100);
    }
}
