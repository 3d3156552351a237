//! Event type definitions for the giveaway pipeline.
//!
//! Chat events are ephemeral: the coordinator applies them to the ledger,
//! echoes them to viewers and keeps at most a short display history.

use super::channels::FeedReceiver;
use crate::ledger::Status;
use chatdraw_sdk::objects::{ChatLine, FeedMessage};
use compact_str::CompactString;
use time::OffsetDateTime;
use tokio::sync::oneshot;

/// Input of the giveaway coordinator.
#[derive(Debug)]
pub enum CoordinatorEvent {
    Chat(ChatEvent),
    Control(ControlCommand),
}

/// A single chat message delivered by the chat relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Channel name without the leading `#`.
    pub channel: CompactString,
    /// Lowercased login, unique per user.
    pub identity: CompactString,
    pub display_name: String,
    pub text: String,
    /// Monotonically increasing per channel.
    pub sequence: u64,
    pub received_at: OffsetDateTime,
}

impl ChatEvent {
    /// Display form used by the viewer feed.
    pub fn to_chat_line(&self) -> ChatLine {
        ChatLine {
            user: self.display_name.clone(),
            message: self.text.clone(),
            channel: self.channel.to_string(),
            time: self.received_at,
        }
    }
}

/// Control operations submitted to the coordinator.
///
/// Every variant carries a reply slot. The coordinator answers after the
/// ledger transition has been applied.
#[derive(Debug)]
pub enum ControlCommand {
    Start {
        keyword: Option<String>,
        max_attempts: Option<i64>,
        reply: oneshot::Sender<()>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Reroll {
        reply: oneshot::Sender<Option<CompactString>>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<Status>,
    },
    /// Current chat history and roster plus a feed subscription taken at
    /// the same point, so a new viewer sees every later frame exactly once.
    Subscribe {
        reply: oneshot::Sender<(FeedSnapshot, FeedReceiver)>,
    },
}

/// What a freshly connected viewer needs to render the panel.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Oldest first.
    pub history: Vec<ChatLine>,
    pub participants: Vec<String>,
}

impl FeedSnapshot {
    /// Frames to send to a new viewer, history first and roster last.
    pub fn into_messages(self) -> Vec<FeedMessage> {
        let mut messages: Vec<FeedMessage> =
            self.history.into_iter().map(FeedMessage::Chat).collect();
        messages.push(FeedMessage::Participants {
            participants: self.participants,
        });
        messages
    }
}

/// Where an outbound chat message should be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnounceTarget {
    Channel(CompactString),
    /// Every channel the relay is currently joined to.
    AllChannels,
}

/// An outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub target: AnnounceTarget,
    pub text: String,
}

impl Announcement {
    pub fn to_channel(channel: impl Into<CompactString>, text: impl Into<String>) -> Self {
        Self {
            target: AnnounceTarget::Channel(channel.into()),
            text: text.into(),
        }
    }

    pub fn to_all(text: impl Into<String>) -> Self {
        Self {
            target: AnnounceTarget::AllChannels,
            text: text.into(),
        }
    }
}

/// Request to assess a chat account, raised by `!check <login>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Channel the command was issued in; the verdict is posted there.
    pub channel: CompactString,
    pub login: CompactString,
    /// Messages seen from `login` since the process started.
    pub total_messages: u64,
}
