//! TOML file configuration structures.
//!
//! These structs directly map to the `chatdraw.toml` file format.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Required unless the chat relay is disabled.
    pub twitch: Option<TwitchConfig>,
    /// Enables `!check` when present.
    pub helix: Option<HelixConfig>,
    #[serde(default)]
    pub giveaway: GiveawayConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Directory holding the static control panel.
    #[serde(default)]
    pub web_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            web_dir: None,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

/// Twitch chat section.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitchConfig {
    pub username: String,
    /// Chat token; `TWITCH_OAUTH` takes precedence when set.
    #[serde(default)]
    pub oauth: String,
    #[serde(default)]
    pub channels: Vec<String>,
    /// IRC-over-WebSocket endpoint; the public Twitch endpoint when unset.
    #[serde(default)]
    pub server_url: Option<Url>,
}

/// Twitch Helix API section.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixConfig {
    pub client_id: String,
    pub app_access_token: String,
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Giveaway chat behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct GiveawayConfig {
    #[serde(default)]
    pub confirm_entries: bool,
    #[serde(default = "default_true")]
    pub announce_keyword: bool,
}

impl Default for GiveawayConfig {
    fn default() -> Self {
        Self {
            confirm_entries: false,
            announce_keyword: true,
        }
    }
}

fn default_true() -> bool {
    true
}
