//! Infrastructure layer: concrete implementations of the domain traits
//! plus the wire-format DTOs.

pub mod dto;
pub mod message_pusher;
pub mod registry;

pub use message_pusher::WebSocketMessagePusher;
pub use registry::InMemoryConnectionRegistry;
