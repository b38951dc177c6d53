//! Barcart session core.
//!
//! - [`credential`]: the process-wide access/refresh token pair
//! - [`guard`]: authenticated REST calls with a single coordinated refresh
//! - [`directory`]: room queries used before a join
//! - [`chat`]: the room session over the chat socket
//! - [`context`]: wires the above together for an application

pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod credential;
pub mod directory;
pub mod error;
pub mod guard;
pub mod http;
