//! Domain layer: value objects and the interfaces the realtime core needs.
//!
//! The concrete implementations live in the Infrastructure layer
//! (dependency inversion); UseCases depend only on the traits defined here.

mod pusher;
mod registry;
mod value_object;

pub use pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use registry::{ConnectionRegistry, Disconnection, PresenceTransition};
pub use value_object::{SessionId, UserId, ValueObjectError};
