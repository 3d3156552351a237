//! GiveawayCoordinator processor.
//!
//! The GiveawayCoordinator is responsible for:
//! - Owning the [`Ledger`] and applying chat events and control commands to
//!   it one at a time, in queue order
//! - Echoing chat to viewers and keeping the display history
//! - Pushing roster changes to viewers
//! - Queuing chat announcements (keyword, winner, command replies)
//! - Forwarding `!check` requests to the `AccountChecker`
//!
//! Side effects are queued with `try_send` after the ledger transition has
//! completed. A full or closed queue is logged and never undoes the
//! transition.

use crate::config::GiveawayConfig;
use crate::events::{
    Announcement, AnnouncementSender, ChatEvent, CheckRequest, CheckRequestSender,
    ControlCommand, CoordinatorEvent, CoordinatorReceiver, CoordinatorSender, FeedReceiver,
    FeedSender, FeedSnapshot,
};
use crate::ledger::{EntryOutcome, GiveawaySettings, Ledger, Status};
use crate::utils::chat_history::ChatHistory;
use crate::utils::chat_stats::ChatStats;
use chatdraw_sdk::objects::FeedMessage;
use compact_str::CompactString;
use rand::Rng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

/// GiveawayCoordinator is the single writer of giveaway state.
pub struct GiveawayCoordinator<R = StdRng> {
    ledger: Ledger<R>,
    history: ChatHistory,
    stats: ChatStats,
    config: GiveawayConfig,
    feed_tx: FeedSender,
    announce_tx: AnnouncementSender,
    check_tx: Option<CheckRequestSender>,
}

impl<R: Rng> GiveawayCoordinator<R> {
    /// Create a new GiveawayCoordinator.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Initial giveaway state
    /// * `config` - Chat behaviour toggles
    /// * `feed_tx` - Viewer feed broadcast
    /// * `announce_tx` - Outbound chat queue drained by the relay
    pub fn new(
        ledger: Ledger<R>,
        config: GiveawayConfig,
        feed_tx: FeedSender,
        announce_tx: AnnouncementSender,
    ) -> Self {
        Self {
            ledger,
            history: ChatHistory::new(),
            stats: ChatStats::new(),
            config,
            feed_tx,
            announce_tx,
            check_tx: None,
        }
    }

    /// Enable `!check` by routing requests to an `AccountChecker`.
    pub fn with_account_checks(mut self, check_tx: CheckRequestSender) -> Self {
        self.check_tx = Some(check_tx);
        self
    }

    /// Run the GiveawayCoordinator until shutdown is signaled or every
    /// sender of the queue is dropped.
    pub async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut event_rx: CoordinatorReceiver,
    ) {
        info!("GiveawayCoordinator started");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("GiveawayCoordinator received shutdown signal");
                        break;
                    }
                }

                event = event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("Coordinator queue closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("GiveawayCoordinator shutdown complete");
    }

    fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::Chat(chat) => self.handle_chat(chat),
            CoordinatorEvent::Control(command) => self.handle_control(command),
        }
    }

    // -- Chat ---------------------------------------------------------------

    fn handle_chat(&mut self, event: ChatEvent) {
        debug!(
            channel = %event.channel,
            identity = %event.identity,
            sequence = event.sequence,
            "Received ChatEvent"
        );

        self.stats
            .record(&event.identity, &event.channel, event.received_at);
        let line = event.to_chat_line();
        self.history.push(line.clone());
        let _ = self.feed_tx.send(FeedMessage::Chat(line));

        let outcome = self.ledger.on_message(&event);
        match outcome {
            EntryOutcome::Entered => {
                info!(identity = %event.identity, channel = %event.channel, "Participant entered");
                if self.config.confirm_entries {
                    self.announce(Announcement::to_channel(
                        event.channel.clone(),
                        format!("@{} entered the giveaway ✅", event.display_name),
                    ));
                }
            }
            EntryOutcome::Ejected => {
                info!(
                    identity = %event.identity,
                    attempts = self.ledger.attempts(&event.identity),
                    "Participant ejected for spamming the keyword"
                );
            }
            _ => {}
        }
        if outcome.roster_changed() {
            self.publish_roster();
        }

        self.handle_chat_command(&event);
    }

    /// Informational commands, answered regardless of the giveaway state.
    fn handle_chat_command(&self, event: &ChatEvent) {
        let text = event.text.trim().to_lowercase();
        let mut words = text.split_whitespace();
        let Some(command) = words.next() else {
            return;
        };
        let argument = words.next();

        match command {
            "!ping" if argument.is_none() => {
                self.announce(Announcement::to_channel(
                    event.channel.clone(),
                    format!("@{} bot is up ✅", event.display_name),
                ));
            }
            "!testwin" if argument.is_none() => {
                self.announce(Announcement::to_channel(
                    event.channel.clone(),
                    format!("🎉 @{} won the giveaway!", event.display_name),
                ));
            }
            "!check" => {
                match argument.map(|w| w.trim_start_matches('@')) {
                    Some(login) if !login.is_empty() => self.request_check(event, login),
                    _ => self.announce(Announcement::to_channel(
                        event.channel.clone(),
                        "❗ Usage: !check <login>",
                    )),
                }
            }
            _ => {}
        }
    }

    fn request_check(&self, event: &ChatEvent, login: &str) {
        let Some(check_tx) = &self.check_tx else {
            self.announce(Announcement::to_channel(
                event.channel.clone(),
                "⚠️ Account checks are not configured",
            ));
            return;
        };

        let request = CheckRequest {
            channel: event.channel.clone(),
            login: CompactString::from(login),
            total_messages: self.stats.total_messages(login),
        };
        match check_tx.try_send(request) {
            Ok(()) => debug!(login, "Queued account check"),
            Err(TrySendError::Full(request)) => {
                warn!(login = %request.login, "Account check queue full, dropping request");
            }
            Err(TrySendError::Closed(request)) => {
                warn!(login = %request.login, "AccountChecker is gone, dropping request");
            }
        }
    }

    // -- Control ------------------------------------------------------------

    fn handle_control(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Start {
                keyword,
                max_attempts,
                reply,
            } => {
                let settings = GiveawaySettings::sanitized(keyword.as_deref(), max_attempts);
                self.ledger.start(settings);
                let keyword = self.ledger.settings().keyword().to_string();
                info!(
                    %keyword,
                    max_attempts = self.ledger.settings().max_attempts(),
                    "Giveaway started"
                );
                self.publish_roster();
                if self.config.announce_keyword {
                    self.announce(Announcement::to_all(format!(
                        "🎁 Giveaway started! Type {keyword} in chat to enter."
                    )));
                }
                let _ = reply.send(());
            }
            ControlCommand::Stop { reply } => {
                if self.ledger.stop() {
                    info!(
                        participants = self.ledger.participants().len(),
                        "Giveaway stopped"
                    );
                } else {
                    debug!("Stop requested while giveaway already closed");
                }
                let _ = reply.send(());
            }
            ControlCommand::Reroll { reply } => {
                let winner = self.ledger.reroll();
                match &winner {
                    Some(winner) => {
                        info!(%winner, pool = self.ledger.participants().len(), "Winner drawn");
                        self.announce(Announcement::to_all(format!(
                            "🎉 @{winner} won the giveaway!"
                        )));
                    }
                    None => info!("Reroll requested with no participants"),
                }
                let _ = reply.send(winner);
            }
            ControlCommand::Clear { reply } => {
                self.ledger.clear();
                info!("Participant list cleared");
                self.publish_roster();
                let _ = reply.send(());
            }
            ControlCommand::Status { reply } => {
                let _ = reply.send(self.ledger.status());
            }
            ControlCommand::Subscribe { reply } => {
                let snapshot = FeedSnapshot {
                    history: self.history.to_vec(),
                    participants: self.roster(),
                };
                let _ = reply.send((snapshot, self.feed_tx.subscribe()));
            }
        }
    }

    // -- Side effects -------------------------------------------------------

    fn roster(&self) -> Vec<String> {
        self.ledger
            .participants()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    /// Push the full roster to viewers. No viewers is not an error.
    fn publish_roster(&self) {
        let _ = self.feed_tx.send(FeedMessage::Participants {
            participants: self.roster(),
        });
    }

    fn announce(&self, announcement: Announcement) {
        match self.announce_tx.try_send(announcement) {
            Ok(()) => {}
            Err(TrySendError::Full(announcement)) => {
                warn!(text = %announcement.text, "Announcement queue full, dropping message");
            }
            Err(TrySendError::Closed(announcement)) => {
                debug!(text = %announcement.text, "No chat relay running, dropping message");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CoordinatorHandle
// ---------------------------------------------------------------------------

/// The coordinator task has stopped and no longer accepts commands.
#[derive(Debug, Clone, Copy, Error)]
#[error("giveaway coordinator is not running")]
pub struct CoordinatorUnavailable;

/// Cloneable handle for submitting control commands to the coordinator.
///
/// Each call waits until the coordinator has applied the command.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: CoordinatorSender,
}

impl CoordinatorHandle {
    pub fn new(tx: CoordinatorSender) -> Self {
        Self { tx }
    }

    /// Open a new giveaway. Unusable input falls back to defaults.
    pub async fn start(
        &self,
        keyword: Option<String>,
        max_attempts: Option<i64>,
    ) -> Result<(), CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Start {
            keyword,
            max_attempts,
            reply,
        })
        .await
    }

    pub async fn stop(&self) -> Result<(), CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Stop { reply }).await
    }

    /// Draw a winner; `None` if nobody has entered.
    pub async fn reroll(&self) -> Result<Option<CompactString>, CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Reroll { reply }).await
    }

    pub async fn clear(&self) -> Result<(), CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Clear { reply }).await
    }

    pub async fn status(&self) -> Result<Status, CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Status { reply }).await
    }

    /// Current history and roster, and a receiver for every frame after it.
    pub async fn subscribe(
        &self,
    ) -> Result<(FeedSnapshot, FeedReceiver), CoordinatorUnavailable> {
        self.request(|reply| ControlCommand::Subscribe { reply }).await
    }

    /// Current roster, used to resynchronise a lagging viewer.
    pub async fn roster(&self) -> Result<Vec<String>, CoordinatorUnavailable> {
        let (snapshot, _rx) = self.subscribe().await?;
        Ok(snapshot.participants)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ControlCommand,
    ) -> Result<T, CoordinatorUnavailable> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::Control(command(reply)))
            .await
            .map_err(|_| CoordinatorUnavailable)?;
        rx.await.map_err(|_| CoordinatorUnavailable)
    }
}
