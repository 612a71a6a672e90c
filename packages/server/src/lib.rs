//! Realtime relay server for the fumi chat application.
//!
//! The server keeps an in-memory registry of which users are connected
//! through which WebSocket sessions, announces presence transitions, and
//! relays chat messages and typing signals addressed by user identity.
//! Message persistence lives outside this crate; delivery here is
//! best-effort only.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
