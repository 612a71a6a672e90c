//! Chat client library for the fumi chat application.
//!
//! Keeps a local chat view consistent with a stream of asynchronous server
//! events while supporting optimistic local updates: per-chat state machine,
//! chat directory with unread accounting and presence, typing signals, and a
//! WebSocket session with reconnection. Message persistence is consumed
//! through the `store` collaborator traits, never owned here.

pub mod error;
pub mod formatter;
pub mod model;
pub mod runner;
pub mod session;
pub mod state;
pub mod store;
pub mod typing;

pub use runner::run_client;
