//! Twitch chat protocol helpers.
//!
//! Twitch chat is IRC carried over a WebSocket, with IRCv3 tags enabled via
//! the `twitch.tv/tags` capability. This module turns incoming lines into
//! chat messages and builds the outgoing command lines the relay sends.

pub mod irc;

pub use irc::{IrcMessage, IrcParseError};

use compact_str::CompactString;

/// Default IRC-over-WebSocket endpoint.
pub const DEFAULT_SERVER_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

/// Default Helix API base, used for account lookups.
pub const DEFAULT_HELIX_URL: &str = "https://api.twitch.tv/helix/";

/// Login used when a message carries no usable prefix.
pub const UNKNOWN_LOGIN: &str = "unknown";

/// A chat message extracted from a `PRIVMSG` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivMsg {
    /// Channel without the leading `#`, lowercased.
    pub channel: CompactString,
    /// Lowercased login.
    pub login: CompactString,
    /// `display-name` tag, falling back to the login.
    pub display_name: String,
    pub text: String,
}

impl PrivMsg {
    /// Extract a chat message, or `None` if `msg` is not a channel `PRIVMSG`.
    pub fn from_irc(msg: &IrcMessage) -> Option<Self> {
        if msg.command != "PRIVMSG" {
            return None;
        }
        let channel = normalize_channel(msg.param(0)?)?;
        let text = strip_action(msg.param(1)?).to_string();
        let login = msg
            .nick()
            .map(|nick| CompactString::from(nick.to_lowercase()))
            .unwrap_or_else(|| CompactString::from(UNKNOWN_LOGIN));
        let display_name = match msg.tag("display-name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => login.to_string(),
        };
        Some(PrivMsg {
            channel,
            login,
            display_name,
            text,
        })
    }
}

/// Unwrap a `/me` message (`\x01ACTION text\x01`) to its text.
fn strip_action(text: &str) -> &str {
    match text.strip_prefix("\u{1}ACTION ") {
        Some(rest) => rest.strip_suffix('\u{1}').unwrap_or(rest),
        None => text,
    }
}

/// Lowercase a channel name and strip the leading `#`.
///
/// Returns `None` for names that end up empty.
pub fn normalize_channel(raw: &str) -> Option<CompactString> {
    let name = raw.trim().trim_start_matches('#').to_lowercase();
    (!name.is_empty()).then(|| CompactString::from(name))
}

/// Prepend `oauth:` to a bare token.
pub fn normalize_oauth(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("oauth:") {
        token.to_string()
    } else {
        format!("oauth:{token}")
    }
}

/// Outgoing command lines, without the trailing CRLF.
pub mod commands {
    /// Request tags and commands so PRIVMSG lines carry `display-name`.
    pub fn cap_req() -> String {
        "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string()
    }

    pub fn pass(oauth: &str) -> String {
        format!("PASS {oauth}")
    }

    pub fn nick(username: &str) -> String {
        format!("NICK {}", username.to_lowercase())
    }

    pub fn join(channel: &str) -> String {
        format!("JOIN #{channel}")
    }

    pub fn part(channel: &str) -> String {
        format!("PART #{channel}")
    }

    pub fn pong(token: &str) -> String {
        format!("PONG :{token}")
    }

    /// Line breaks would split the message into separate commands, so they
    /// are replaced with spaces.
    pub fn privmsg(channel: &str, text: &str) -> String {
        let text: String = text
            .chars()
            .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
            .collect();
        format!("PRIVMSG #{channel} :{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn privmsg(line: &str) -> Option<PrivMsg> {
        let msg: IrcMessage = match line.parse() {
            Ok(m) => m,
            Err(e) => unreachable!("failed to parse {line:?}: {e}"),
        };
        PrivMsg::from_irc(&msg)
    }

    #[test]
    fn test_privmsg_extraction() {
        let m = privmsg("@display-name=BoB :bob!bob@bob.tmi.twitch.tv PRIVMSG #Streamer :!Join");
        assert_eq!(
            m,
            Some(PrivMsg {
                channel: CompactString::from("streamer"),
                login: CompactString::from("bob"),
                display_name: "BoB".to_string(),
                text: "!Join".to_string(),
            })
        );
    }

    #[test]
    fn test_privmsg_display_name_falls_back_to_login() {
        let m = privmsg("@display-name= :Alice!alice@x PRIVMSG #c :hi");
        let Some(m) = m else {
            unreachable!("line is a PRIVMSG");
        };
        assert_eq!(m.login, "alice");
        assert_eq!(m.display_name, "alice");
    }

    #[test]
    fn test_privmsg_without_prefix_uses_unknown() {
        let Some(m) = privmsg("PRIVMSG #c :hi") else {
            unreachable!("line is a PRIVMSG");
        };
        assert_eq!(m.login, UNKNOWN_LOGIN);
    }

    #[test]
    fn test_action_wrapper_is_stripped() {
        let Some(m) = privmsg(":alice!alice@a PRIVMSG #c :\u{1}ACTION !join\u{1}") else {
            unreachable!("line is a PRIVMSG");
        };
        assert_eq!(m.text, "!join");

        let Some(m) = privmsg(":alice!alice@a PRIVMSG #c :\u{1}ACTION waves") else {
            unreachable!("line is a PRIVMSG");
        };
        assert_eq!(m.text, "waves");

        let Some(m) = privmsg(":alice!alice@a PRIVMSG #c :ACTION plain") else {
            unreachable!("line is a PRIVMSG");
        };
        assert_eq!(m.text, "ACTION plain");
    }

    #[test]
    fn test_non_privmsg_is_ignored() {
        assert_eq!(privmsg(":tmi.twitch.tv 001 bot :Welcome"), None);
        assert_eq!(privmsg("PING :tmi.twitch.tv"), None);
        assert_eq!(privmsg(":a!a@a PRIVMSG #c"), None);
    }

    #[test]
    fn test_normalize_channel() {
        assert_eq!(normalize_channel("#Otoru_").as_deref(), Some("otoru_"));
        assert_eq!(normalize_channel(" ari4kaa ").as_deref(), Some("ari4kaa"));
        assert_eq!(normalize_channel("#"), None);
        assert_eq!(normalize_channel(""), None);
    }

    #[test]
    fn test_normalize_oauth() {
        assert_eq!(normalize_oauth("abc"), "oauth:abc");
        assert_eq!(normalize_oauth("oauth:abc"), "oauth:abc");
    }

    #[test]
    fn test_commands() {
        assert_eq!(commands::join("chan"), "JOIN #chan");
        assert_eq!(commands::part("chan"), "PART #chan");
        assert_eq!(commands::nick("MyBot"), "NICK mybot");
        assert_eq!(commands::pong("tmi.twitch.tv"), "PONG :tmi.twitch.tv");
        assert_eq!(
            commands::privmsg("chan", "line one\r\nPRIVMSG #x :evil"),
            "PRIVMSG #chan :line one  PRIVMSG #x :evil"
        );
    }
}
