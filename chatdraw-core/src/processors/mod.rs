//! Long-running tasks of the giveaway pipeline.
//!
//! - `ChatRelay`: Reads Twitch chat, emits `ChatEvent`, posts `Announcement`
//! - `GiveawayCoordinator`: Receives `CoordinatorEvent`, owns the ledger,
//!   emits `FeedMessage`, `Announcement` and `CheckRequest`
//! - `AccountChecker`: Receives `CheckRequest`, emits `Announcement`

pub mod account_checker;
pub mod chat_relay;
pub mod coordinator;

pub use account_checker::{AccountChecker, AccountInfo, AccountLookup, CheckError, HelixLookup};
pub use chat_relay::{ChatRelay, RelayError};
pub use coordinator::{CoordinatorHandle, CoordinatorUnavailable, GiveawayCoordinator};
