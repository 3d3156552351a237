//! The entry ledger: giveaway state machine.
//!
//! The ledger owns the giveaway flag, the entry keyword, the spam threshold,
//! the participant roster and the per-identity attempt counters. It performs
//! no I/O. Each transition returns what changed so the caller can decide what
//! to push to viewers and what to announce in chat.
//!
//! # States
//!
//! - *Idle* (`active == false`): chat messages are ignored.
//! - *Open* (`active == true`): a message whose text equals the keyword
//!   (case-insensitively) counts as an entry attempt.
//!
//! # Spam policy
//!
//! Every keyword message increments the sender's counter. Once the counter
//! exceeds `max_attempts` the sender is removed from the roster. Counters are
//! only reset by [`Ledger::start`] and [`Ledger::clear`], so an ejected
//! identity stays out until the next reset: further messages keep the
//! counter above the threshold.

mod participants;

pub use participants::ParticipantSet;

use crate::events::ChatEvent;
use compact_str::CompactString;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Keyword used when none (or an empty one) is supplied.
pub const DEFAULT_KEYWORD: &str = "!";

/// Spam threshold used when the supplied value is not a positive integer.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Keyword and spam threshold of an open giveaway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveawaySettings {
    keyword: CompactString,
    /// Case-folded keyword, compared against case-folded message text.
    match_key: String,
    max_attempts: u32,
}

impl GiveawaySettings {
    /// Build settings from raw control input, substituting defaults for
    /// anything unusable. Never fails.
    pub fn sanitized(keyword: Option<&str>, max_attempts: Option<i64>) -> Self {
        let keyword = match keyword {
            Some(k) if !k.is_empty() => k,
            _ => DEFAULT_KEYWORD,
        };
        let max_attempts = match max_attempts {
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => DEFAULT_MAX_ATTEMPTS,
        };
        Self {
            keyword: CompactString::from(keyword),
            match_key: keyword.to_lowercase(),
            max_attempts,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn matches(&self, text: &str) -> bool {
        text.to_lowercase() == self.match_key
    }
}

impl Default for GiveawaySettings {
    fn default() -> Self {
        Self::sanitized(None, None)
    }
}

/// Result of applying one chat message to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The giveaway is not open.
    Inactive,
    /// The message is not the keyword.
    NotKeyword,
    /// The sender was appended to the roster.
    Entered,
    /// The sender was already on the roster and is still under the threshold.
    AlreadyEntered,
    /// The sender exceeded the threshold and was removed from the roster.
    Ejected,
    /// The sender is over the threshold and was not on the roster.
    Suppressed,
}

impl EntryOutcome {
    /// Whether viewers need a fresh roster.
    pub fn roster_changed(self) -> bool {
        matches!(self, EntryOutcome::Entered | EntryOutcome::Ejected)
    }
}

/// Read-only view of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub active: bool,
    pub participant_count: usize,
    pub keyword: CompactString,
    pub max_attempts: u32,
}

/// The giveaway state machine.
///
/// Generic over the random source so that winner draws can be made
/// deterministic in tests.
#[derive(Debug)]
pub struct Ledger<R = StdRng> {
    active: bool,
    settings: GiveawaySettings,
    participants: ParticipantSet,
    attempts: HashMap<CompactString, u32>,
    rng: R,
}

impl Ledger<StdRng> {
    /// Create an idle ledger with default settings, seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Ledger<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Ledger<R> {
    /// Create an idle ledger with default settings and the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            active: false,
            settings: GiveawaySettings::default(),
            participants: ParticipantSet::new(),
            attempts: HashMap::new(),
            rng,
        }
    }

    /// Open a new giveaway.
    ///
    /// Replaces the settings, wipes roster and counters and sets the
    /// giveaway active. Calling it on an open giveaway resets it again.
    pub fn start(&mut self, settings: GiveawaySettings) {
        self.settings = settings;
        self.participants.clear();
        self.attempts.clear();
        self.active = true;
    }

    /// Close the giveaway, keeping the roster for later draws.
    ///
    /// Returns `false` if it was already closed.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Apply one chat message.
    pub fn on_message(&mut self, event: &ChatEvent) -> EntryOutcome {
        if !self.active {
            return EntryOutcome::Inactive;
        }
        if !self.settings.matches(&event.text) {
            return EntryOutcome::NotKeyword;
        }

        let count = self.attempts.entry(event.identity.clone()).or_insert(0);
        *count = count.saturating_add(1);

        if *count > self.settings.max_attempts {
            return if self.participants.remove(&event.identity) {
                EntryOutcome::Ejected
            } else {
                EntryOutcome::Suppressed
            };
        }

        if self.participants.insert(&event.identity) {
            EntryOutcome::Entered
        } else {
            EntryOutcome::AlreadyEntered
        }
    }

    /// Draw a winner uniformly from the roster, with replacement.
    ///
    /// The roster is left untouched. Returns `None` when nobody has entered.
    pub fn reroll(&mut self) -> Option<CompactString> {
        if self.participants.is_empty() {
            return None;
        }
        let position = self.rng.random_range(0..self.participants.len());
        self.participants.get(position).cloned()
    }

    /// Wipe roster and counters, keeping the giveaway flag and settings.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.attempts.clear();
    }

    pub fn status(&self) -> Status {
        Status {
            active: self.active,
            participant_count: self.participants.len(),
            keyword: self.settings.keyword.clone(),
            max_attempts: self.settings.max_attempts,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn settings(&self) -> &GiveawaySettings {
        &self.settings
    }

    /// Current roster in arrival order.
    pub fn participants(&self) -> &[CompactString] {
        self.participants.as_slice()
    }

    /// Keyword messages counted for `identity` since the last reset.
    pub fn attempts(&self, identity: &str) -> u32 {
        self.attempts.get(identity).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn ledger() -> Ledger {
        Ledger::with_rng(StdRng::seed_from_u64(7))
    }

    fn msg(identity: &str, text: &str) -> ChatEvent {
        ChatEvent {
            channel: CompactString::from("streamer"),
            identity: CompactString::from(identity),
            display_name: identity.to_uppercase(),
            text: text.to_string(),
            sequence: 0,
            received_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn roster(ledger: &Ledger) -> Vec<&str> {
        ledger.participants().iter().map(|p| p.as_str()).collect()
    }

    fn assert_consistent(ledger: &Ledger) {
        assert!(ledger.participants.is_consistent());
    }

    #[test]
    fn test_initial_state() {
        let ledger = ledger();
        let status = ledger.status();
        assert!(!status.active);
        assert_eq!(status.keyword, "!");
        assert_eq!(status.max_attempts, 3);
        assert_eq!(status.participant_count, 0);
    }

    #[test]
    fn test_sanitized_defaults() {
        let s = GiveawaySettings::sanitized(Some(""), Some(0));
        assert_eq!(s.keyword(), DEFAULT_KEYWORD);
        assert_eq!(s.max_attempts(), DEFAULT_MAX_ATTEMPTS);

        let s = GiveawaySettings::sanitized(None, Some(-5));
        assert_eq!(s.max_attempts(), DEFAULT_MAX_ATTEMPTS);

        let s = GiveawaySettings::sanitized(Some("!Join"), Some(10));
        assert_eq!(s.keyword(), "!Join");
        assert_eq!(s.max_attempts(), 10);

        let s = GiveawaySettings::sanitized(Some("x"), Some(i64::MAX));
        assert_eq!(s.max_attempts(), u32::MAX);
    }

    #[test]
    fn test_idle_messages_change_nothing() {
        let mut ledger = ledger();
        for _ in 0..5 {
            assert_eq!(ledger.on_message(&msg("bob", "!")), EntryOutcome::Inactive);
        }
        assert!(ledger.participants().is_empty());
        assert_eq!(ledger.attempts("bob"), 0);

        ledger.start(GiveawaySettings::sanitized(Some("go"), None));
        ledger.on_message(&msg("bob", "go"));
        ledger.stop();
        ledger.on_message(&msg("bob", "go"));
        ledger.on_message(&msg("eve", "go"));
        assert_eq!(roster(&ledger), vec!["bob"]);
        assert_eq!(ledger.attempts("bob"), 1);
        assert_eq!(ledger.attempts("eve"), 0);
    }

    #[test]
    fn test_keyword_match_is_exact_and_case_insensitive() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("!Join"), None));

        assert_eq!(ledger.on_message(&msg("a", "!join now")), EntryOutcome::NotKeyword);
        assert_eq!(ledger.on_message(&msg("a", "!joi")), EntryOutcome::NotKeyword);
        assert_eq!(ledger.attempts("a"), 0);
        assert_eq!(ledger.on_message(&msg("a", "!JOIN")), EntryOutcome::Entered);
        assert_eq!(ledger.on_message(&msg("b", "!join")), EntryOutcome::Entered);
    }

    #[test]
    fn test_reentry_is_idempotent() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("!join"), Some(5)));
        assert_eq!(ledger.on_message(&msg("bob", "!join")), EntryOutcome::Entered);
        assert_eq!(
            ledger.on_message(&msg("bob", "!join")),
            EntryOutcome::AlreadyEntered
        );
        assert_eq!(roster(&ledger), vec!["bob"]);
        assert_eq!(ledger.attempts("bob"), 2);
    }

    #[test]
    fn test_spam_ejects_on_exceeding_threshold() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("!join"), Some(3)));

        for _ in 0..3 {
            ledger.on_message(&msg("bob", "!join"));
            assert_eq!(roster(&ledger), vec!["bob"]);
        }
        assert_eq!(ledger.on_message(&msg("bob", "!join")), EntryOutcome::Ejected);
        assert!(roster(&ledger).is_empty());
        assert_eq!(ledger.attempts("bob"), 4);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_ejection_is_sticky_until_reset() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(1)));
        ledger.on_message(&msg("amy", "go"));
        ledger.on_message(&msg("bob", "go"));
        ledger.on_message(&msg("cat", "go"));
        assert_eq!(ledger.on_message(&msg("bob", "go")), EntryOutcome::Ejected);
        assert_eq!(roster(&ledger), vec!["amy", "cat"]);
        assert_consistent(&ledger);
        for _ in 0..10 {
            assert_eq!(ledger.on_message(&msg("bob", "go")), EntryOutcome::Suppressed);
            assert!(!roster(&ledger).contains(&"bob"));
        }
        assert_consistent(&ledger);

        ledger.clear();
        assert_consistent(&ledger);
        assert_eq!(ledger.on_message(&msg("bob", "go")), EntryOutcome::Entered);
        assert_consistent(&ledger);

        ledger.on_message(&msg("bob", "go"));
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(1)));
        assert_consistent(&ledger);
        assert_eq!(ledger.on_message(&msg("bob", "go")), EntryOutcome::Entered);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_start_always_resets() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(2)));
        ledger.on_message(&msg("a", "go"));
        ledger.on_message(&msg("b", "go"));
        ledger.stop();

        ledger.start(GiveawaySettings::sanitized(Some("again"), Some(4)));
        assert!(ledger.participants().is_empty());
        assert_eq!(ledger.attempts("a"), 0);
        let status = ledger.status();
        assert!(status.active);
        assert_eq!(status.keyword, "again");
        assert_eq!(status.max_attempts, 4);

        ledger.on_message(&msg("a", "again"));
        ledger.start(GiveawaySettings::sanitized(Some("again"), Some(4)));
        assert!(ledger.participants().is_empty());
        assert_consistent(&ledger);
    }

    #[test]
    fn test_stop_keeps_roster_and_is_idempotent() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::default());
        ledger.on_message(&msg("a", "!"));
        assert!(ledger.stop());
        assert!(!ledger.stop());
        assert!(!ledger.is_active());
        assert_eq!(roster(&ledger), vec!["a"]);
        assert_eq!(ledger.attempts("a"), 1);
    }

    #[test]
    fn test_reroll_empty_returns_none() {
        let mut ledger = ledger();
        assert_eq!(ledger.reroll(), None);
        ledger.start(GiveawaySettings::default());
        assert_eq!(ledger.reroll(), None);
    }

    #[test]
    fn test_reroll_returns_member_without_mutation() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), None));
        for name in ["a", "b", "c"] {
            ledger.on_message(&msg(name, "go"));
        }
        let before: Vec<CompactString> = ledger.participants().to_vec();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let winner = ledger.reroll();
            let Some(winner) = winner else {
                unreachable!("roster is not empty");
            };
            assert!(before.contains(&winner));
            seen.insert(winner);
        }
        assert_eq!(ledger.participants(), before.as_slice());
        // With replacement: every member gets drawn eventually.
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_clear_keeps_flag_and_settings() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(2)));
        ledger.on_message(&msg("a", "go"));
        ledger.on_message(&msg("b", "go"));
        ledger.clear();

        let status = ledger.status();
        assert_eq!(status.participant_count, 0);
        assert!(status.active);
        assert_eq!(status.keyword, "go");
        assert_eq!(status.max_attempts, 2);
        assert_eq!(ledger.attempts("a"), 0);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_scenario_four_joins_with_threshold_three() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("!join"), Some(3)));
        let outcomes: Vec<EntryOutcome> = (0..4)
            .map(|_| ledger.on_message(&msg("bob", "!join")))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Entered,
                EntryOutcome::AlreadyEntered,
                EntryOutcome::AlreadyEntered,
                EntryOutcome::Ejected,
            ]
        );
        assert!(!ledger.participants().iter().any(|p| p == "bob"));
    }

    #[test]
    fn test_scenario_reroll_after_stop() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(2)));
        ledger.on_message(&msg("alice", "go"));
        ledger.on_message(&msg("carol", "GO"));
        ledger.stop();

        let winner = ledger.reroll();
        assert!(matches!(winner.as_deref(), Some("alice") | Some("carol")));
    }

    #[test]
    fn test_scenario_arrival_order_with_threshold_one() {
        let mut ledger = ledger();
        ledger.start(GiveawaySettings::sanitized(Some("go"), Some(1)));
        ledger.on_message(&msg("zed", "go"));
        ledger.on_message(&msg("amy", "go"));
        assert_eq!(roster(&ledger), vec!["zed", "amy"]);
    }

    #[test]
    fn test_roster_changed_flags() {
        assert!(EntryOutcome::Entered.roster_changed());
        assert!(EntryOutcome::Ejected.roster_changed());
        assert!(!EntryOutcome::AlreadyEntered.roster_changed());
        assert!(!EntryOutcome::Suppressed.roster_changed());
        assert!(!EntryOutcome::Inactive.roster_changed());
        assert!(!EntryOutcome::NotKeyword.roster_changed());
    }
}
