//! Realtime relay server for two-party chat.
//!
//! Tracks presence and relays messages/typing signals between connected
//! clients, addressed by user identity. Message persistence is handled by
//! the clients' persistence collaborator, not by this process.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fumi-server
//! cargo run --bin fumi-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use fumi_server::{
    infrastructure::{InMemoryConnectionRegistry, WebSocketMessagePusher},
    ui::Server,
    usecase::{
        DisconnectSessionUseCase, JoinRoomUseCase, RelayMessageUseCase, RelayTypingUseCase,
    },
};
use fumi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "fumi-server")]
#[command(about = "Realtime relay server for two-party chat with presence", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry + Pusher
    // 2. UseCases
    // 3. Server

    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let relay_typing_usecase = Arc::new(RelayTypingUseCase::new(registry, message_pusher));

    let server = Server::new(
        join_room_usecase,
        disconnect_session_usecase,
        relay_message_usecase,
        relay_typing_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
