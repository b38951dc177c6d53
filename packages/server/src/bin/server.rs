//! Barcart development server.
//!
//! In-memory accounts and rooms, opaque access/refresh tokens and the
//! `/ws/chat` relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin barcart-server
//! cargo run --bin barcart-server -- --host 0.0.0.0 --port 3000 --access-ttl-secs 30
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use barcart_server::{
    domain::{Account, NewRoom, RoomRepository},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryAccountRepository, InMemoryRoomRepository},
    },
    ui::{AppState, Server},
};
use barcart_shared::{
    logger::setup_logger,
    protocol::RoomType,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "barcart-server")]
#[command(about = "Barcart development backend: token auth, chat rooms and the WebSocket relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8111")]
    port: u16,

    /// Lifetime of issued access tokens in seconds
    #[arg(long, default_value_t = 900)]
    access_ttl_secs: u64,
}

/// Accounts available for login (`email` / `password`)
fn demo_accounts() -> Vec<Account> {
    vec![
        Account::new(1, "alice@barcart.dev", "alice", "alice"),
        Account::new(2, "bob@barcart.dev", "bob", "bob"),
        Account::new(3, "carol@barcart.dev", "carol", "carol"),
    ]
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Repository / MessagePusher
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts = Arc::new(InMemoryAccountRepository::new(demo_accounts()));
    let repository = Arc::new(InMemoryRoomRepository::new());
    for (name, room_type, capacity) in [
        ("Speakeasy", RoomType::Group, 8),
        ("Tasting Table", RoomType::Group, 2),
    ] {
        let room = repository
            .create_room(
                NewRoom {
                    name: name.to_string(),
                    room_type,
                    capacity,
                },
                clock.now_millis(),
            )
            .await;
        tracing::info!("Room '{}' created: {}", room.name, room.id);
    }
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 2. UseCases / Server
    let state = AppState::new(
        accounts,
        repository,
        message_pusher,
        clock,
        Duration::from_secs(args.access_ttl_secs),
    );
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
