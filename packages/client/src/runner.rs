//! Client execution logic with reconnection support.

use std::sync::Arc;
use std::time::Duration;

use fumi_shared::time::Clock;

use crate::{
    error::ClientError,
    session::run_client_session,
    store::{ChatDirectoryStore, MessageStore},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the WebSocket client with reconnection logic.
///
/// On reconnect the session re-announces its identity via `join-room`; the
/// server treats that like a fresh connection. Missed messages are picked up
/// from the persisted-history fetch, not replayed by the realtime layer.
pub async fn run_client(
    url: String,
    user_id: String,
    message_store: Arc<dyn MessageStore>,
    chat_store: Arc<dyn ChatDirectoryStore>,
    clock: Arc<dyn Clock>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            user_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(
            &url,
            &user_id,
            Arc::clone(&message_store),
            Arc::clone(&chat_store),
            Arc::clone(&clock),
        )
        .await
        {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(ClientError::ConnectionError(e)) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
            Err(e) => return Err(Box::new(e)),
        }
    }

    Ok(())
}
