//! Shared utilities for the fumi chat application.
//!
//! Small pieces used by both the server and the client crates:
//! time handling (clock abstraction, display formatting) and logger setup.

pub mod logger;
pub mod time;
