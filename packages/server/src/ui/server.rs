//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    DisconnectSessionUseCase, JoinRoomUseCase, RelayMessageUseCase, RelayTypingUseCase,
};

use super::{
    handler::{http::health_check, websocket::websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// The realtime relay server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new server from its usecases
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        relay_typing_usecase: Arc<RelayTypingUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                join_room_usecase,
                disconnect_session_usecase,
                relay_message_usecase,
                relay_typing_usecase,
            }),
        }
    }

    /// Run the WebSocket relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
