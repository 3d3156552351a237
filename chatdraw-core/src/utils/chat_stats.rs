//! Per-user chat activity, fed from every chat message.

use compact_str::CompactString;
use std::collections::HashMap;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub total_messages: u64,
    pub first_seen: OffsetDateTime,
    pub per_channel: HashMap<CompactString, u64>,
}

/// Message counters keyed by login. Lives for the process lifetime.
#[derive(Debug, Default)]
pub struct ChatStats {
    users: HashMap<CompactString, UserActivity>,
}

impl ChatStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, identity: &CompactString, channel: &CompactString, at: OffsetDateTime) {
        let activity = self
            .users
            .entry(identity.clone())
            .or_insert_with(|| UserActivity {
                total_messages: 0,
                first_seen: at,
                per_channel: HashMap::new(),
            });
        activity.total_messages += 1;
        *activity.per_channel.entry(channel.clone()).or_insert(0) += 1;
    }

    pub fn get(&self, identity: &str) -> Option<&UserActivity> {
        self.users.get(identity)
    }

    /// Messages seen from `identity`, zero if never seen.
    pub fn total_messages(&self, identity: &str) -> u64 {
        self.get(identity).map_or(0, |a| a.total_messages)
    }
}
