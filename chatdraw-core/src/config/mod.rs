//! Configuration types for chatdraw.
//!
//! These types represent the validated runtime configuration. The actual
//! loading and parsing of the TOML file is handled by the server crate.

mod channels;
mod config_store;

pub use channels::ChannelList;
pub use config_store::{ConfigStore, ConfigWatcher};

use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Directory with the static control panel, served at `/`.
    pub web_dir: Option<PathBuf>,
}

/// Chat login used by the relay.
#[derive(Clone)]
pub struct TwitchConfig {
    /// Bot login, lowercased.
    pub username: String,
    /// Token including the `oauth:` prefix.
    pub oauth: String,
    pub server_url: Url,
}

impl std::fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("username", &self.username)
            .field("oauth", &"<redacted>")
            .field("server_url", &self.server_url.as_str())
            .finish()
    }
}

/// Credentials for account lookups (`!check`).
#[derive(Clone)]
pub struct HelixConfig {
    pub client_id: String,
    pub app_access_token: String,
    /// Base URL ending in `/`, e.g. `https://api.twitch.tv/helix/`.
    pub base_url: Url,
}

impl std::fmt::Debug for HelixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelixConfig")
            .field("client_id", &self.client_id)
            .field("app_access_token", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Chat behaviour of the giveaway coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiveawayConfig {
    /// Post `@user entered` when someone joins the roster.
    pub confirm_entries: bool,
    /// Post the keyword to every channel when a giveaway starts.
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
