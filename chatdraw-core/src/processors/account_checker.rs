//! AccountChecker processor.
//!
//! The AccountChecker is responsible for:
//! - Receiving `CheckRequest` events raised by `!check <login>`
//! - Looking the account up (Twitch Helix in production)
//! - Scoring it with [`risk::assess`]
//! - Posting the verdict into the channel the command came from

use crate::config::HelixConfig;
use crate::events::{Announcement, AnnouncementSender, CheckRequest, CheckRequestReceiver};
use crate::utils::risk;
use async_trait::async_trait;
use kanau::processor::Processor;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Errors that can occur during an account check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("API error with status {status}: {body}")]
    Api { status: u16, body: String },

    /// The lookup URL could not be built
    #[error("invalid lookup url: {0}")]
    Url(#[from] url::ParseError),
}

/// Public account data needed for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub login: String,
    pub created_at: OffsetDateTime,
}

/// Source of account data.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Find an account by login. `Ok(None)` means it does not exist.
    async fn find_account(&self, login: &str) -> Result<Option<AccountInfo>, CheckError>;
}

// ---------------------------------------------------------------------------
// Helix
// ---------------------------------------------------------------------------

/// Account lookup through the Twitch Helix `users` endpoint.
pub struct HelixLookup {
    config: HelixConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HelixUsers {
    data: Vec<HelixUser>,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    login: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl HelixLookup {
    pub fn new(config: HelixConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl AccountLookup for HelixLookup {
    async fn find_account(&self, login: &str) -> Result<Option<AccountInfo>, CheckError> {
        let url = self.config.base_url.join("users")?;
        let response = self
            .http_client
            .get(url)
            .query(&[("login", login)])
            .header("Client-ID", &self.config.client_id)
            .bearer_auth(&self.config.app_access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let users: HelixUsers = response.json().await?;
        Ok(users.data.into_iter().next().map(|user| AccountInfo {
            login: user.login,
            created_at: user.created_at,
        }))
    }
}

// ---------------------------------------------------------------------------
// AccountChecker
// ---------------------------------------------------------------------------

/// AccountChecker answers `!check` requests.
pub struct AccountChecker<L> {
    lookup: L,
    announce_tx: AnnouncementSender,
}

impl<L: AccountLookup> AccountChecker<L> {
    /// Create a new AccountChecker.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Source of account data
    /// * `announce_tx` - Outbound chat queue for verdicts
    pub fn new(lookup: L, announce_tx: AnnouncementSender) -> Self {
        Self {
            lookup,
            announce_tx,
        }
    }

    /// Run the AccountChecker until shutdown is signaled.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, mut check_rx: CheckRequestReceiver) {
        info!("AccountChecker started");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("AccountChecker received shutdown signal");
                        break;
                    }
                }

                // Receive CheckRequest events
                Some(request) = check_rx.recv() => {
                    debug!(login = %request.login, channel = %request.channel, "Received CheckRequest");
                    let channel = request.channel.clone();
                    let announcement = match self.process(request).await {
                        Ok(announcement) => announcement,
                        Err(e) => {
                            error!(error = %e, "Account lookup failed");
                            Announcement::to_channel(channel, "⚠️ Account check failed (API error)")
                        }
                    };
                    if let Err(e) = self.announce_tx.send(announcement).await {
                        warn!(error = %e, "Failed to queue check verdict, relay dropped");
                    }
                }

                else => {
                    info!("CheckRequest channel closed");
                    break;
                }
            }
        }

        info!("AccountChecker shutdown complete");
    }
}

/// Chat reply for a finished lookup.
pub fn describe_account(
    login: &str,
    account: Option<&AccountInfo>,
    total_messages: u64,
    now: OffsetDateTime,
) -> String {
    let Some(account) = account else {
        return format!("❌ User {login} not found");
    };
    let age_days = (now - account.created_at).whole_days();
    let report = risk::assess(age_days, total_messages);
    risk::format_report(&account.login, age_days, total_messages, &report)
}

// ---------------------------------------------------------------------------
// Processor trait implementation
// ---------------------------------------------------------------------------

impl<L: AccountLookup> Processor<CheckRequest> for AccountChecker<L> {
    type Output = Announcement;
    type Error = CheckError;

    async fn process(&self, request: CheckRequest) -> Result<Announcement, CheckError> {
        let account = self.lookup.find_account(&request.login).await?;
        let text = describe_account(
            &request.login,
            account.as_ref(),
            request.total_messages,
            OffsetDateTime::now_utc(),
        );
        Ok(Announcement::to_channel(request.channel, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AnnounceTarget, announcement_channel, check_request_channel};
    use compact_str::CompactString;
    use time::Duration;

    struct FixedLookup {
        created_days_ago: Option<i64>,
    }

    #[async_trait]
    impl AccountLookup for FixedLookup {
        async fn find_account(&self, login: &str) -> Result<Option<AccountInfo>, CheckError> {
            Ok(self.created_days_ago.map(|days| AccountInfo {
                login: login.to_string(),
                created_at: OffsetDateTime::now_utc() - Duration::days(days) - Duration::hours(1),
            }))
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl AccountLookup for FailingLookup {
        async fn find_account(&self, _login: &str) -> Result<Option<AccountInfo>, CheckError> {
            Err(CheckError::Api {
                status: 401,
                body: "unauthorized".to_string(),
            })
        }
    }

    fn request(login: &str, total_messages: u64) -> CheckRequest {
        CheckRequest {
            channel: CompactString::from("streamer"),
            login: CompactString::from(login),
            total_messages,
        }
    }

    #[test]
    fn test_describe_account() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(1000);
        let account = AccountInfo {
            login: "bob".to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH + Duration::days(998),
        };
        assert_eq!(
            describe_account("bob", Some(&account), 0, now),
            "🔎 bob | age: 2d | messages: 0 | risk: 80% → ❌ high risk of alt/bot"
        );
        assert_eq!(describe_account("ghost", None, 0, now), "❌ User ghost not found");
    }

    #[tokio::test]
    async fn test_process_scores_account() {
        let (announce_tx, _rx) = announcement_channel();
        let checker = AccountChecker::new(
            FixedLookup {
                created_days_ago: Some(365),
            },
            announce_tx,
        );
        let announcement = checker.process(request("carol", 10)).await;
        let Ok(announcement) = announcement else {
            unreachable!("lookup cannot fail");
        };
        assert_eq!(
            announcement.target,
            AnnounceTarget::Channel(CompactString::from("streamer"))
        );
        assert_eq!(
            announcement.text,
            "🔎 carol | age: 365d | messages: 10 | risk: 0% → ✅ looks like a real viewer"
        );
    }

    #[tokio::test]
    async fn test_run_reports_lookup_failure_in_chat() {
        let (announce_tx, mut announce_rx) = announcement_channel();
        let (check_tx, check_rx) = check_request_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(AccountChecker::new(FailingLookup, announce_tx).run(shutdown_rx, check_rx));

        let _ = check_tx.send(request("dave", 1)).await;
        let announcement = announce_rx.recv().await;
        assert_eq!(
            announcement,
            Some(Announcement::to_channel(
                "streamer",
                "⚠️ Account check failed (API error)"
            ))
        );

        let _ = shutdown_tx.send(true);
        let _ = task.await;
    }

    #[tokio::test]
    async fn test_run_reports_unknown_account() {
        let (announce_tx, mut announce_rx) = announcement_channel();
        let (check_tx, check_rx) = check_request_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(
            AccountChecker::new(
                FixedLookup {
                    created_days_ago: None,
                },
                announce_tx,
            )
            .run(shutdown_rx, check_rx),
        );

        let _ = check_tx.send(request("ghost", 0)).await;
        let announcement = announce_rx.recv().await.map(|a| a.text);
        assert_eq!(announcement.as_deref(), Some("❌ User ghost not found"));
    }
}
