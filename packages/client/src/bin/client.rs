//! Two-party chat client with presence, typing indicators, and unread
//! accounting.
//!
//! Connects to the chat server over WebSocket, announces its identity, and
//! drives a rustyline prompt. Automatically reconnects on disconnection
//! (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fumi-client -- --user-id alice
//! cargo run --bin fumi-client -- -i bob
//! ```

use std::sync::Arc;

use clap::Parser;

use fumi_client::store::InMemoryStore;
use fumi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "fumi-client")]
#[command(about = "Two-party chat client with presence and typing indicators", long_about = None)]
struct Args {
    /// User ID to announce to the server
    #[arg(short = 'i', long)]
    user_id: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // In-memory persistence collaborator; a durable backend would be wired
    // in here without touching the realtime core.
    let store = Arc::new(InMemoryStore::new());

    if let Err(e) = fumi_client::run_client(
        args.url,
        args.user_id,
        store.clone(),
        store,
        Arc::new(SystemClock),
    )
    .await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
