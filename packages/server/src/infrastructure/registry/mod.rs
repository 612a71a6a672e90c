//! Connection Registry 実装
//!
//! - `inmemory`: HashMap を使ったプロセス内実装
//! - 将来的に: プロセス間共有が必要になった場合は redis など

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;
