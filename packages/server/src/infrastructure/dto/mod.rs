//! Data Transfer Objects (DTOs) for the chat application.
//!
//! DTOs are organized by protocol:
//! - `websocket`: realtime event DTOs (shared wire vocabulary with the client)

pub mod websocket;
