pub mod backoff;
pub mod chat_history;
pub mod chat_stats;
pub mod risk;
