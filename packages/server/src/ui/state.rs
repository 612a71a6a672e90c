//! Server state shared across connection handlers.

use std::sync::Arc;

use crate::usecase::{
    DisconnectSessionUseCase, JoinRoomUseCase, RelayMessageUseCase, RelayTypingUseCase,
};

/// Shared application state
///
/// Owns the UseCases (and through them the registry and the pusher) for the
/// lifetime of the process; constructed at startup, dropped at shutdown.
pub struct AppState {
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    pub relay_typing_usecase: Arc<RelayTypingUseCase>,
}
