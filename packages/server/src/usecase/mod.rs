//! UseCase layer: orchestration of the registry and the pusher.
//!
//! One UseCase per realtime operation, mirroring the event vocabulary:
//! join, disconnect, message relay, typing relay. UseCases depend only on
//! the domain traits; JSON serialization of the events stays in the UI layer.

mod disconnect_session;
mod join_room;
mod relay_message;
mod relay_typing;

pub use disconnect_session::DisconnectSessionUseCase;
pub use join_room::JoinRoomUseCase;
pub use relay_message::RelayMessageUseCase;
pub use relay_typing::RelayTypingUseCase;
