//! Repository の実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装（開発用）

pub mod inmemory;

pub use inmemory::{InMemoryAccountRepository, InMemoryRoomRepository};
