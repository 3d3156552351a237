//! Event system for the giveaway pipeline.
//!
//! # Event Flow
//!
//! 1. `ChatRelay` emits `ChatEvent` -> `GiveawayCoordinator`
//! 2. The control API emits `ControlCommand` -> `GiveawayCoordinator`
//!    (both travel as `CoordinatorEvent` through one queue)
//! 3. `GiveawayCoordinator` emits `FeedMessage` -> viewers (broadcast),
//!    `Announcement` -> `ChatRelay` and `CheckRequest` -> `AccountChecker`
//! 4. `AccountChecker` emits `Announcement` -> `ChatRelay`
//!
//! The coordinator is the only consumer that touches giveaway state, so
//! chat events and control commands are applied one at a time.

pub mod channels;
pub mod types;

pub use channels::{
    AnnouncementReceiver, AnnouncementSender, CheckRequestReceiver, CheckRequestSender,
    CoordinatorReceiver, CoordinatorSender, DEFAULT_CHANNEL_BUFFER, FEED_BUFFER, FeedReceiver,
    FeedSender, announcement_channel, check_request_channel, coordinator_channel, feed_channel,
};

pub use types::{
    AnnounceTarget, Announcement, ChatEvent, CheckRequest, ControlCommand, CoordinatorEvent,
    FeedSnapshot,
};
