//! Event channel factories and handles.
//!
//! Provides factory functions for creating event channels with appropriate
//! buffer sizes for the giveaway pipeline.

use super::types::{Announcement, CheckRequest, CoordinatorEvent};
use chatdraw_sdk::objects::FeedMessage;
use tokio::sync::{broadcast, mpsc};

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle chat bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Buffer size of the viewer feed broadcast.
///
/// Viewers lagging further behind are resynchronised with a roster snapshot.
pub const FEED_BUFFER: usize = 256;

/// Sender handle for the coordinator queue (chat events and control commands).
pub type CoordinatorSender = mpsc::Sender<CoordinatorEvent>;
/// Receiver handle for the coordinator queue.
pub type CoordinatorReceiver = mpsc::Receiver<CoordinatorEvent>;

/// Sender handle for outbound chat announcements.
pub type AnnouncementSender = mpsc::Sender<Announcement>;
/// Receiver handle for outbound chat announcements.
pub type AnnouncementReceiver = mpsc::Receiver<Announcement>;

/// Sender handle for CheckRequest events.
pub type CheckRequestSender = mpsc::Sender<CheckRequest>;
/// Receiver handle for CheckRequest events.
pub type CheckRequestReceiver = mpsc::Receiver<CheckRequest>;

/// Sender half of the viewer feed.
pub type FeedSender = broadcast::Sender<FeedMessage>;
/// Receiver half of the viewer feed, one per connected viewer.
pub type FeedReceiver = broadcast::Receiver<FeedMessage>;

/// Create the coordinator queue.
///
/// Chat events and control commands share one queue so that they are applied
/// in the order they were admitted. The relay and the control API hold
/// senders, the coordinator the receiver.
pub fn coordinator_channel() -> (CoordinatorSender, CoordinatorReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new announcement channel.
pub fn announcement_channel() -> (AnnouncementSender, AnnouncementReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new CheckRequest channel.
pub fn check_request_channel() -> (CheckRequestSender, CheckRequestReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create the viewer feed broadcast.
///
/// The initial receiver is dropped; viewers call `subscribe()` on the sender.
pub fn feed_channel() -> FeedSender {
    let (tx, _rx) = broadcast::channel(FEED_BUFFER);
    tx
}
