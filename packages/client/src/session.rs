//! WebSocket client session management.
//!
//! `ChatClient` is the client core: it owns the directory, the open-chat
//! state machine, the selected-chat cell, and the typing timer, and reacts
//! to user actions and inbound server events. `run_client_session` wires it
//! to a live WebSocket and a rustyline prompt.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, warn};

use fumi_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent, TypingPayload};
use fumi_shared::time::Clock;

use crate::{
    error::ClientError,
    formatter::MessageFormatter,
    model::ChatMessage,
    state::{ChatView, Directory, SelectedChat},
    store::{ChatDirectoryStore, MessageStore},
    typing::TypingTimer,
};

/// The client-side realtime core.
///
/// All mutation goes through `&mut self`, so state transitions are
/// sequential; inbound events and user actions are fed to it one at a time
/// by the session loop.
pub struct ChatClient {
    user_id: String,
    directory: Directory,
    open_chat: Option<ChatView>,
    selected: SelectedChat,
    typing_timer: TypingTimer,
    /// Whether a `typing` event has been emitted for the current burst
    typing_announced: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    message_store: Arc<dyn MessageStore>,
    chat_store: Arc<dyn ChatDirectoryStore>,
    clock: Arc<dyn Clock>,
    /// Transient user-facing notices, drained by the session loop
    notices: Vec<String>,
}

impl ChatClient {
    pub fn new(
        user_id: String,
        outbound: mpsc::UnboundedSender<ClientEvent>,
        message_store: Arc<dyn MessageStore>,
        chat_store: Arc<dyn ChatDirectoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_id,
            directory: Directory::new(),
            open_chat: None,
            selected: SelectedChat::new(),
            typing_timer: TypingTimer::new(),
            typing_announced: Arc::new(AtomicBool::new(false)),
            outbound,
            message_store,
            chat_store,
            clock,
            notices: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn open_chat_view(&self) -> Option<&ChatView> {
        self.open_chat.as_ref()
    }

    /// The identity announcement sent right after (re)connecting
    pub fn join_event(&self) -> ClientEvent {
        ClientEvent::JoinRoom {
            user_id: self.user_id.clone(),
        }
    }

    /// Load the chat roster from the directory store; the user roster is
    /// seeded from the chats' peers.
    pub async fn initialize(&mut self) -> Result<(), ClientError> {
        let chats = self.chat_store.fetch_chats(&self.user_id).await?;
        let peers = chats
            .iter()
            .filter_map(|c| c.peer_of(&self.user_id).map(str::to_string))
            .collect();
        self.directory.set_users(peers);
        self.directory.set_chats(chats);
        Ok(())
    }

    /// Open a chat: cancel the previous chat's typing timer, update the
    /// selected-chat cell synchronously, then load history and mark read.
    pub async fn open_chat(&mut self, chat_id: &str) -> Result<(), ClientError> {
        // Switch is synchronous up to this point; only the history fetch
        // and the unread reset await.
        self.typing_timer.cancel();
        self.typing_announced.store(false, Ordering::SeqCst);

        let chat = self
            .directory
            .chat(chat_id)
            .ok_or_else(|| ClientError::UnknownChat(chat_id.to_string()))?;
        let peer_id = chat
            .peer_of(&self.user_id)
            .ok_or_else(|| ClientError::UnknownChat(chat_id.to_string()))?
            .to_string();

        self.selected.set(Some(chat_id.to_string()));
        let mut view = ChatView::new(chat_id.to_string(), peer_id);
        view.begin_loading();
        self.open_chat = Some(view);

        let history = self.message_store.fetch_messages(chat_id).await?;
        if let Some(view) = self.open_chat.as_mut().filter(|v| v.chat_id == chat_id) {
            view.history_loaded(history);
        }

        // Local reset first, then reconcile with what the store returns
        self.directory.mark_read_local(chat_id);
        match self.chat_store.clear_unread(chat_id).await {
            Ok(confirmed) => self.directory.reconcile_chat(confirmed),
            Err(e) => self.notices.push(format!("could not mark read: {}", e)),
        }
        Ok(())
    }

    /// Close the open chat, if any
    pub fn close_chat(&mut self) {
        self.typing_timer.cancel();
        self.typing_announced.store(false, Ordering::SeqCst);
        self.selected.set(None);
        self.open_chat = None;
    }

    /// Create a new two-party chat with `peer_id` and add it to the roster
    pub async fn create_chat(&mut self, peer_id: &str) -> Result<String, ClientError> {
        let chat = self
            .chat_store
            .create_chat([self.user_id.clone(), peer_id.to_string()])
            .await?;
        let chat_id = chat.id.clone();
        self.directory.add_user(peer_id);
        self.directory.add_chat(chat);
        Ok(chat_id)
    }

    /// Send a message in the open chat.
    ///
    /// The optimistic entry is appended before the outbound event and the
    /// persistence call; a persistence failure leaves it in place and only
    /// surfaces a notice.
    pub async fn send_message(&mut self, text: &str) -> Result<(), ClientError> {
        let (chat_id, members) = {
            let view = self.open_chat.as_ref().ok_or(ClientError::ChatNotOpen)?;
            let chat = self
                .directory
                .chat(&view.chat_id)
                .ok_or_else(|| ClientError::UnknownChat(view.chat_id.clone()))?;
            (view.chat_id.clone(), chat.members.clone())
        };

        let optimistic = ChatMessage::optimistic(
            chat_id.clone(),
            self.user_id.clone(),
            text.to_string(),
            self.clock.now_millis(),
        );

        // Perceived latency is governed here: append before anything awaits
        if let Some(view) = self.open_chat.as_mut() {
            view.push_optimistic(optimistic.clone());
        }
        self.directory
            .apply_incoming_message(&optimistic, Some(chat_id.as_str()));

        // Sending clears our own typing signal for this chat
        self.emit_stop_typing(&chat_id);
        self.typing_timer.cancel();

        if self
            .outbound
            .send(ClientEvent::SendMessage(optimistic.to_payload(members)))
            .is_err()
        {
            self.notices
                .push("not connected; message will sync later".to_string());
        }

        match self.message_store.persist_message(&optimistic).await {
            Ok(confirmed) => {
                if let Some(view) = self
                    .open_chat
                    .as_mut()
                    .filter(|v| v.chat_id == confirmed.chat_id)
                {
                    view.confirm_persisted(confirmed);
                }
            }
            Err(e) => {
                // Best-effort: the optimistic entry is not rolled back
                self.notices
                    .push(format!("message may not have been saved: {}", e));
            }
        }
        Ok(())
    }

    /// React to a keystroke in the open chat: announce `typing` once per
    /// burst and reschedule the stop-typing timer.
    pub fn handle_keystroke(&mut self) {
        let Some(view) = self.open_chat.as_ref() else {
            return;
        };
        let chat_id = view.chat_id.clone();
        let peer_id = view.peer_id.clone();

        if !self.typing_announced.swap(true, Ordering::SeqCst) {
            let _ = self.outbound.send(ClientEvent::Typing(TypingPayload {
                sender_id: self.user_id.clone(),
                receiver_id: peer_id.clone(),
                chat_id: chat_id.clone(),
            }));
        }

        let outbound = self.outbound.clone();
        let announced = Arc::clone(&self.typing_announced);
        let sender_id = self.user_id.clone();
        let timer_chat_id = chat_id.clone();
        self.typing_timer.reschedule(self.selected.clone(), chat_id, move || {
            announced.store(false, Ordering::SeqCst);
            let _ = outbound.send(ClientEvent::StopTyping(TypingPayload {
                sender_id,
                receiver_id: peer_id,
                chat_id: timer_chat_id,
            }));
        });
    }

    fn emit_stop_typing(&mut self, chat_id: &str) {
        if self.typing_announced.swap(false, Ordering::SeqCst) {
            if let Some(view) = self.open_chat.as_ref() {
                let _ = self.outbound.send(ClientEvent::StopTyping(TypingPayload {
                    sender_id: self.user_id.clone(),
                    receiver_id: view.peer_id.clone(),
                    chat_id: chat_id.to_string(),
                }));
            }
        }
    }

    /// Apply one inbound server event
    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::OnlineUsers { user_ids } => {
                self.directory.set_online_users(user_ids);
            }
            ServerEvent::UserOnline { user_id } => {
                if user_id != self.user_id {
                    self.directory.user_online(&user_id);
                    self.notices
                        .push(MessageFormatter::format_presence(&user_id, true));
                }
            }
            ServerEvent::UserOffline { user_id } => {
                self.directory.user_offline(&user_id);
                self.notices
                    .push(MessageFormatter::format_presence(&user_id, false));
            }
            ServerEvent::ReceiveMessage(payload) => {
                let message = ChatMessage::from_payload(&payload);
                // Read the selection at dispatch time, not capture time
                let selected = self.selected.get();
                self.directory
                    .apply_incoming_message(&message, selected.as_deref());
                if let Some(view) = self.open_chat.as_mut() {
                    view.apply_incoming(message);
                }
            }
            ServerEvent::Typing(payload) => {
                if let Some(view) = self.open_chat.as_mut() {
                    if view.chat_id == payload.chat_id && view.peer_id == payload.sender_id {
                        view.set_peer_typing();
                    }
                }
            }
            ServerEvent::StopTyping(payload) => {
                if let Some(view) = self.open_chat.as_mut() {
                    if view.chat_id == payload.chat_id {
                        view.clear_peer_typing();
                    }
                }
            }
        }
    }

    /// Drain pending user-facing notices
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

/// Run one WebSocket client session until the user exits or the connection
/// is lost. Returns `Err(ConnectionError)` when the transport drops, so the
/// caller can decide whether to reconnect.
pub async fn run_client_session(
    url: &str,
    user_id: &str,
    message_store: Arc<dyn MessageStore>,
    chat_store: Arc<dyn ChatDirectoryStore>,
    clock: Arc<dyn Clock>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Commands: /chats /users /open <chat-id> /new <peer> /close. \
         Plain text sends to the open chat. Ctrl+C to exit.\n",
        user_id
    );

    let (mut write, mut read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();

    // Serialize outbound events onto the socket
    let mut write_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(json.into())).await {
                warn!("Failed to send event: {}", e);
                break;
            }
        }
    });

    let mut client = ChatClient::new(
        user_id.to_string(),
        outbound_tx.clone(),
        message_store,
        chat_store,
        clock,
    );

    // Re-announce identity; the server treats this like a fresh connection
    let _ = outbound_tx.send(client.join_event());
    client.initialize().await?;

    // Blocking thread for rustyline (synchronous readline)
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt_user = user_id.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };
        let prompt = format!("{}> ", prompt_user);
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let result = loop {
        tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => client.handle_server_event(event),
                            Err(e) => debug!("unparseable server event dropped: {}", e),
                        }
                        render_open_chat(&client);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        break Err(ClientError::ConnectionError(
                            "Connection lost".to_string(),
                        ));
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket read error: {}", e);
                        break Err(ClientError::ConnectionError(e.to_string()));
                    }
                    Some(Ok(_)) => {}
                }
            }
            line = input_rx.recv() => {
                match line {
                    Some(line) => {
                        if let Err(e) = handle_input_line(&mut client, &line).await {
                            println!("! {}", e);
                        }
                    }
                    // Readline thread exited (Ctrl+C / Ctrl+D)
                    None => break Ok(()),
                }
            }
        }
        drain_notices(&mut client);
    };

    // The iteration that breaks the loop may have queued notices of its own
    drain_notices(&mut client);
    write_task.abort();
    result
}

fn drain_notices(client: &mut ChatClient) {
    for notice in client.take_notices() {
        println!("{}", notice);
    }
}

async fn handle_input_line(client: &mut ChatClient, line: &str) -> Result<(), ClientError> {
    match line.split_once(' ') {
        _ if line == "/chats" => {
            let now = fumi_shared::time::get_timestamp();
            for chat in client.directory().chats() {
                let peer_online = chat
                    .peer_of(client.user_id())
                    .is_some_and(|p| client.directory().is_online(p));
                println!(
                    "{}  {}",
                    chat.id,
                    MessageFormatter::format_chat_row(chat, client.user_id(), peer_online, now)
                );
            }
            Ok(())
        }
        _ if line == "/users" => {
            for user_id in client.directory().users() {
                let dot = if client.directory().is_online(user_id) {
                    "●"
                } else {
                    "○"
                };
                println!("{} {}", dot, user_id);
            }
            Ok(())
        }
        _ if line == "/close" => {
            client.close_chat();
            println!("(chat closed)");
            Ok(())
        }
        Some(("/open", chat_id)) => {
            client.open_chat(chat_id.trim()).await?;
            render_open_chat(client);
            Ok(())
        }
        Some(("/new", peer_id)) => {
            let chat_id = client.create_chat(peer_id.trim()).await?;
            println!("(created chat {})", chat_id);
            Ok(())
        }
        _ => client.send_message(line).await,
    }
}

fn render_open_chat(client: &ChatClient) {
    let Some(view) = client.open_chat_view() else {
        return;
    };
    let now = fumi_shared::time::get_timestamp();
    if let Some(last) = view.messages.last() {
        println!(
            "{}",
            MessageFormatter::format_message(last, client.user_id(), now)
        );
    }
    if view.peer_typing {
        println!(
            "{}",
            MessageFormatter::format_typing_indicator(&view.peer_id)
        );
    }
}
