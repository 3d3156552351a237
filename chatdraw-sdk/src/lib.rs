//! Shared wire types for the chatdraw control API and viewer feed.
//!
//! Enable the `client` feature for typed HTTP and WebSocket clients.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
