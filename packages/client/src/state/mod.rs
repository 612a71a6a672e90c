//! Client-side state: per-open-chat state machine, chat directory, and the
//! shared selected-chat cell that event handlers read at dispatch time.

pub mod chat;
pub mod directory;
pub mod selected;

pub use chat::{ChatPhase, ChatView};
pub use directory::Directory;
pub use selected::SelectedChat;
