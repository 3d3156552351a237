//! Configuration module for chatdraw-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use chatdraw_core::config::{ChannelList, GiveawayConfig, HelixConfig, ServerConfig, TwitchConfig};
use chatdraw_core::twitch::{DEFAULT_HELIX_URL, DEFAULT_SERVER_URL, normalize_oauth};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid url: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    /// `None` when the chat relay is disabled.
    pub twitch: Option<TwitchConfig>,
    pub channels: ChannelList,
    pub helix: Option<HelixConfig>,
    pub giveaway: GiveawayConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    oauth_override: Option<String>,
    chat_enabled: bool,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        oauth_override: Option<String>,
        chat_enabled: bool,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            oauth_override,
            chat_enabled,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate and normalise the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.build(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn build(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let channels = file_config
            .twitch
            .as_ref()
            .map(|t| ChannelList::from_raw(&t.channels))
            .unwrap_or_default();

        let twitch = if self.chat_enabled {
            let section = file_config.twitch.ok_or_else(|| {
                ConfigError::ValidationError(
                    "missing [twitch] section (use --no-chat to run without chat)".to_string(),
                )
            })?;
            Some(self.build_twitch(section, &channels)?)
        } else {
            None
        };

        let helix = file_config.helix.map(build_helix).transpose()?;

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
                web_dir: file_config.server.web_dir,
            },
            twitch,
            channels,
            helix,
            giveaway: GiveawayConfig {
                confirm_entries: file_config.giveaway.confirm_entries,
                announce_keyword: file_config.giveaway.announce_keyword,
            },
        })
    }

    fn build_twitch(
        &self,
        section: file::TwitchConfig,
        channels: &ChannelList,
    ) -> Result<TwitchConfig, ConfigError> {
        let username = section.username.trim().to_lowercase();
        if username.is_empty() {
            return Err(ConfigError::ValidationError(
                "twitch.username must not be empty".to_string(),
            ));
        }

        let oauth = self
            .oauth_override
            .clone()
            .filter(|token| !token.trim().is_empty())
            .unwrap_or(section.oauth);
        if oauth.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "twitch.oauth is empty and TWITCH_OAUTH is not set".to_string(),
            ));
        }

        if channels.is_empty() {
            return Err(ConfigError::ValidationError(
                "twitch.channels must name at least one channel".to_string(),
            ));
        }

        let server_url = match section.server_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_SERVER_URL)?,
        };

        Ok(TwitchConfig {
            username,
            oauth: normalize_oauth(&oauth),
            server_url,
        })
    }
}

fn build_helix(section: file::HelixConfig) -> Result<HelixConfig, ConfigError> {
    if section.client_id.trim().is_empty() || section.app_access_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "helix.client_id and helix.app_access_token are required".to_string(),
        ));
    }
    let mut base_url = match section.base_url {
        Some(url) => url,
        None => Url::parse(DEFAULT_HELIX_URL)?,
    };
    // `Url::join` drops the last segment unless the path ends in `/`.
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(HelixConfig {
        client_id: section.client_id,
        app_access_token: section.app_access_token,
        base_url,
    })
}
