//! ChatRelay processor.
//!
//! The ChatRelay is responsible for:
//! - Keeping one IRC-over-WebSocket session to Twitch chat alive
//! - Turning `PRIVMSG` lines into `ChatEvent`s for the coordinator
//! - Answering `PING` and honouring `RECONNECT`
//! - Joining and parting channels when the channel list is reloaded
//! - Posting queued `Announcement`s
//!
//! Lost sessions are re-established with exponential backoff.

use crate::config::{ChannelList, ConfigStore, TwitchConfig};
use crate::events::{
    AnnounceTarget, AnnouncementReceiver, ChatEvent, CoordinatorEvent, CoordinatorSender,
};
use crate::twitch::{IrcMessage, PrivMsg, commands};
use crate::utils::backoff::reconnect_delay;
use compact_str::CompactString;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Errors that end a chat session.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The WebSocket handshake failed
    #[error("failed to connect to chat: {0}")]
    Connect(tungstenite::Error),

    /// Reading or writing the socket failed
    #[error("chat connection error: {0}")]
    WebSocket(tungstenite::Error),

    /// The server closed the connection
    #[error("chat connection closed by server")]
    Closed,
}

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    /// The server asked us to reconnect.
    Reconnect,
}

/// What to do with one incoming IRC line.
#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    Ignore,
    Reply(String),
    Chat(ChatEvent),
    Reconnect,
}

/// Turns raw lines into actions, numbering chat messages per channel.
///
/// Sequences survive reconnects so they stay monotonic for the lifetime of
/// the relay.
#[derive(Debug)]
struct LineTranslator {
    bot_login: CompactString,
    sequences: HashMap<CompactString, u64>,
}

impl LineTranslator {
    fn new(bot_login: &str) -> Self {
        Self {
            bot_login: CompactString::from(bot_login.to_lowercase()),
            sequences: HashMap::new(),
        }
    }

    fn translate(&mut self, line: &str, received_at: OffsetDateTime) -> LineAction {
        let msg: IrcMessage = match line.parse() {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, line, "Ignoring unparsable chat line");
                return LineAction::Ignore;
            }
        };

        match msg.command.as_str() {
            "PING" => LineAction::Reply(commands::pong(msg.param(0).unwrap_or("tmi.twitch.tv"))),
            "RECONNECT" => LineAction::Reconnect,
            "NOTICE" => {
                warn!(notice = msg.param(1).unwrap_or_default(), "Chat server notice");
                LineAction::Ignore
            }
            "PRIVMSG" => {
                let Some(privmsg) = PrivMsg::from_irc(&msg) else {
                    return LineAction::Ignore;
                };
                if privmsg.login == self.bot_login {
                    return LineAction::Ignore;
                }
                let sequence = self.sequences.entry(privmsg.channel.clone()).or_insert(0);
                *sequence += 1;
                LineAction::Chat(ChatEvent {
                    channel: privmsg.channel,
                    identity: privmsg.login,
                    display_name: privmsg.display_name,
                    text: privmsg.text,
                    sequence: *sequence,
                    received_at,
                })
            }
            _ => LineAction::Ignore,
        }
    }
}

/// ChatRelay bridges Twitch chat and the coordinator.
pub struct ChatRelay {
    config: TwitchConfig,
    channels: ConfigStore<ChannelList>,
    events_tx: CoordinatorSender,
    announce_rx: AnnouncementReceiver,
    translator: LineTranslator,
}

impl ChatRelay {
    /// Create a new ChatRelay.
    ///
    /// # Arguments
    ///
    /// * `config` - Bot login and server URL
    /// * `channels` - Reloadable list of channels to join
    /// * `events_tx` - Coordinator queue for chat events
    /// * `announce_rx` - Outbound chat messages
    pub fn new(
        config: TwitchConfig,
        channels: ConfigStore<ChannelList>,
        events_tx: CoordinatorSender,
        announce_rx: AnnouncementReceiver,
    ) -> Self {
        let translator = LineTranslator::new(&config.username);
        Self {
            config,
            channels,
            events_tx,
            announce_rx,
            translator,
        }
    }

    /// Run the ChatRelay until shutdown is signaled.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(server = %self.config.server_url, "ChatRelay started");
        let mut attempt: u32 = 0;

        loop {
            match self.session(&mut shutdown_rx).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Reconnect) => {
                    info!("Chat server requested reconnect");
                    attempt = 0;
                    continue;
                }
                Err(e) => {
                    if matches!(e, RelayError::Connect(_)) {
                        attempt = attempt.saturating_add(1);
                    } else {
                        attempt = 0;
                    }
                    let delay = reconnect_delay(attempt.saturating_sub(1));
                    error!(error = %e, attempt, delay_secs = delay.as_secs(), "Chat session lost, reconnecting");

                    tokio::select! {
                        biased;
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() || *shutdown_rx.borrow() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!("ChatRelay shutdown complete");
    }

    async fn session(
        &mut self,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, RelayError> {
        let (ws, _response) = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown_rx) => {
                info!("ChatRelay received shutdown signal while connecting");
                return Ok(SessionEnd::Shutdown);
            }
            connected = connect_async(self.config.server_url.as_str()) => {
                connected.map_err(RelayError::Connect)?
            }
        };
        let (mut sink, mut stream) = ws.split();

        let mut watcher = self.channels.subscribe();
        let mut joined = self.channels.snapshot();

        send_line(&mut sink, commands::cap_req()).await?;
        send_line(&mut sink, commands::pass(&self.config.oauth)).await?;
        send_line(&mut sink, commands::nick(&self.config.username)).await?;
        for channel in joined.iter() {
            send_line(&mut sink, commands::join(channel)).await?;
        }
        info!(channels = joined.len(), "Connected to chat");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("ChatRelay received shutdown signal");
                        let _ = sink.send(Message::Close(None)).await;
                        return Ok(SessionEnd::Shutdown);
                    }
                }

                // Channel list reloaded
                Ok(next) = watcher.changed() => {
                    let (joins, parts) = joined.diff(&next);
                    for channel in &parts {
                        send_line(&mut sink, commands::part(channel)).await?;
                    }
                    for channel in &joins {
                        send_line(&mut sink, commands::join(channel)).await?;
                    }
                    info!(joined = joins.len(), parted = parts.len(), "Applied channel list");
                    joined = next;
                }

                frame = stream.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => return Err(RelayError::Closed),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(RelayError::WebSocket(e)),
                    };
                    let received_at = OffsetDateTime::now_utc();
                    for line in text.lines().filter(|l| !l.trim().is_empty()) {
                        match self.translator.translate(line, received_at) {
                            LineAction::Ignore => {}
                            LineAction::Reply(reply) => send_line(&mut sink, reply).await?,
                            LineAction::Reconnect => return Ok(SessionEnd::Reconnect),
                            LineAction::Chat(event) => {
                                if self.events_tx.send(CoordinatorEvent::Chat(event)).await.is_err() {
                                    warn!("Coordinator queue closed, stopping ChatRelay");
                                    return Ok(SessionEnd::Shutdown);
                                }
                            }
                        }
                    }
                }

                Some(announcement) = self.announce_rx.recv() => {
                    let targets: Vec<CompactString> = match announcement.target {
                        AnnounceTarget::AllChannels => joined.iter().cloned().collect(),
                        AnnounceTarget::Channel(channel) => {
                            if !joined.contains(&channel) {
                                warn!(channel = %channel, "Dropping announcement for a channel that is not joined");
                                continue;
                            }
                            vec![channel]
                        }
                    };
                    for channel in &targets {
                        send_line(&mut sink, commands::privmsg(channel, &announcement.text)).await?;
                    }
                }
            }
        }
    }
}

/// Resolves once shutdown is signaled or the sender is gone.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}

async fn send_line(sink: &mut WsSink, line: String) -> Result<(), RelayError> {
    sink.send(Message::Text(line))
        .await
        .map_err(RelayError::WebSocket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{announcement_channel, coordinator_channel};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use url::Url;

    fn at() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    fn relay_for(server_url: Url) -> ChatRelay {
        let config = TwitchConfig {
            username: "bot".to_string(),
            oauth: "oauth:secret".to_string(),
            server_url,
        };
        let (events_tx, _events_rx) = coordinator_channel();
        let (_announce_tx, announce_rx) = announcement_channel();
        ChatRelay::new(
            config,
            ConfigStore::new(ChannelList::from_raw(["streamer"])),
            events_tx,
            announce_rx,
        )
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_stalled_handshake() {
        // Accepts TCP but never answers the WebSocket upgrade.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted_tx, accepted_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let _ = accepted_tx.send(());
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(socket);
        });

        let relay = relay_for(Url::parse(&format!("ws://{addr}/")).unwrap());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(relay.run(shutdown_rx));

        accepted_rx.await.unwrap();
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("relay stops while the handshake is pending")
            .unwrap();
    }

    #[test]
    fn test_ping_is_answered() {
        let mut translator = LineTranslator::new("bot");
        assert_eq!(
            translator.translate("PING :tmi.twitch.tv", at()),
            LineAction::Reply("PONG :tmi.twitch.tv".to_string())
        );
    }

    #[test]
    fn test_reconnect_and_noise() {
        let mut translator = LineTranslator::new("bot");
        assert_eq!(
            translator.translate(":tmi.twitch.tv RECONNECT", at()),
            LineAction::Reconnect
        );
        assert_eq!(
            translator.translate(":tmi.twitch.tv 001 bot :Welcome, GLHF!", at()),
            LineAction::Ignore
        );
        assert_eq!(translator.translate("", at()), LineAction::Ignore);
    }

    #[test]
    fn test_privmsg_becomes_chat_event_with_per_channel_sequence() {
        let mut translator = LineTranslator::new("bot");
        let line_a = "@display-name=Alice :alice!alice@alice.tmi.twitch.tv PRIVMSG #one :!join";
        let line_b = "@display-name=Bob :bob!bob@bob.tmi.twitch.tv PRIVMSG #two :hello";

        let LineAction::Chat(first) = translator.translate(line_a, at()) else {
            unreachable!("PRIVMSG yields a chat event");
        };
        assert_eq!(first.channel, "one");
        assert_eq!(first.identity, "alice");
        assert_eq!(first.display_name, "Alice");
        assert_eq!(first.text, "!join");
        assert_eq!(first.sequence, 1);

        let LineAction::Chat(other) = translator.translate(line_b, at()) else {
            unreachable!("PRIVMSG yields a chat event");
        };
        assert_eq!(other.sequence, 1);

        let LineAction::Chat(second) = translator.translate(line_a, at()) else {
            unreachable!("PRIVMSG yields a chat event");
        };
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_own_messages_are_ignored() {
        let mut translator = LineTranslator::new("GiveawayBot");
        assert_eq!(
            translator.translate(":giveawaybot!giveawaybot@x PRIVMSG #one :🎉 @bob won!", at()),
            LineAction::Ignore
        );
    }
}
