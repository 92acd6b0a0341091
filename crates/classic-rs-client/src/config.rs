use serde::Deserialize;
use std::path::{Path, PathBuf};

use classic_rs_net::ConnectionConfig;
use classic_rs_world::LoadOptions;

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub session: SessionSection,
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct SessionSection {
    pub username: String,
    #[serde(default)]
    pub mppass: String,
    /// Server to join. Without one the client plays singleplayer.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    25565
}

#[derive(Debug, Deserialize)]
pub struct GameSection {
    #[serde(default = "default_true")]
    pub use_cpe: bool,
    #[serde(default = "default_true")]
    pub allow_custom_blocks: bool,
    #[serde(default = "default_true")]
    pub allow_server_textures: bool,
    /// Behave like the original classic client: no protocol extensions.
    #[serde(default)]
    pub classic_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            use_cpe: true,
            allow_custom_blocks: true,
            allow_server_textures: true,
            classic_mode: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    /// Map to load in singleplayer.
    #[serde(default)]
    pub load: Option<PathBuf>,
    /// Where to save the map on exit.
    #[serde(default)]
    pub save: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
    #[serde(default = "default_width")]
    pub length: u16,
}

fn default_width() -> u16 {
    128
}

fn default_height() -> u16 {
    64
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            load: None,
            save: None,
            width: default_width(),
            height: default_height(),
            length: default_width(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Extensions are off in classic mode regardless of `use_cpe`.
    pub fn use_cpe(&self) -> bool {
        self.game.use_cpe && !self.game.classic_mode
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            allow_custom_blocks: self.game.allow_custom_blocks && self.use_cpe(),
            allow_server_textures: self.game.allow_server_textures,
        }
    }

    /// Connection settings, or `None` for singleplayer.
    pub fn connection(&self) -> Option<ConnectionConfig> {
        let address = self.session.address.clone()?;
        Some(ConnectionConfig {
            address,
            port: self.session.port,
            username: self.session.username.clone(),
            mppass: self.session.mppass.clone(),
            use_cpe: self.use_cpe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_is_singleplayer() {
        let toml_str = r#"
            [session]
            username = "Player"
        "#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.username, "Player");
        assert!(config.session.mppass.is_empty());
        assert!(config.connection().is_none());
        assert_eq!(config.session.port, 25565);
        // game section defaults when absent
        assert!(config.use_cpe());
        assert!(config.game.allow_custom_blocks);
        assert!(config.game.allow_server_textures);
        // world section defaults when absent
        assert!(config.world.load.is_none());
        assert_eq!(
            (config.world.width, config.world.height, config.world.length),
            (128, 64, 128)
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn multiplayer_config() {
        let toml_str = r#"
            [session]
            username = "Player"
            mppass = "abc123"
            address = "play.example.net"
            port = 25566

            [game]
            classic_mode = true

            [world]
            save = "backup.cw"

            [logging]
            level = "debug"
        "#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        let conn = config.connection().unwrap();
        assert_eq!(conn.address, "play.example.net");
        assert_eq!(conn.port, 25566);
        assert_eq!(conn.mppass, "abc123");
        assert!(!conn.use_cpe);
        assert!(!config.load_options().allow_custom_blocks);
        assert_eq!(config.world.save, Some(PathBuf::from("backup.cw")));
        assert_eq!(config.logging.level, "debug");
    }
}
