//! Bounded recent-chat buffer shown to newly connected viewers.

use chatdraw_sdk::objects::ChatLine;
use std::collections::VecDeque;

/// Number of chat lines kept for display.
pub const CHAT_HISTORY_LIMIT: usize = 100;

/// FIFO of the most recent chat lines; the oldest line is evicted first.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    lines: VecDeque<ChatLine>,
    limit: usize,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::with_limit(CHAT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, line: ChatLine) {
        if self.limit == 0 {
            return;
        }
        while self.lines.len() >= self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<ChatLine> {
        self.lines.iter().cloned().collect()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}
