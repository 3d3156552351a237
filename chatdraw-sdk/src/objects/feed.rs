//! Viewer feed frames.
//!
//! The `GET /ws` endpoint upgrades to a WebSocket connection and pushes
//! [`FeedMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. Right after the upgrade the server sends the buffered chat history
//!    (oldest first, at most 100 lines) as [`FeedMessage::Chat`] frames,
//!    followed by one [`FeedMessage::Participants`] frame with the current
//!    roster.
//! 2. Every chat line seen afterwards is pushed as a `Chat` frame.
//! 3. Every roster change is pushed as a `Participants` frame carrying the
//!    full roster, which replaces whatever the viewer displayed before.
//!
//! Client frames are ignored.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Server-to-viewer message, internally tagged by `"type"`:
///
/// ```json
/// {"type":"chat","user":"Bob","message":"!join","channel":"streamer","time":"2024-05-01T12:00:00Z"}
/// {"type":"participants","participants":["bob","alice"]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Chat(ChatLine),
    Participants { participants: Vec<String> },
}

/// One chat message as displayed on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    /// Display name of the sender.
    pub user: String,
    pub message: String,
    /// Channel name without the leading `#`.
    pub channel: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}
