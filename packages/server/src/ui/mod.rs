//! UI 層: axum のルーター、REST / WebSocket のハンドラ
//!
//! - REST: `/auth/*`, `/chat/*`（`/auth/login`, `/auth/refresh` 以外は Bearer 必須）
//! - WebSocket: `/ws/chat`（ChatFrame の JSON テキストフレーム）

mod extractor;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
