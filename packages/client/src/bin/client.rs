//! Terminal client for the Barcart chat backend.
//!
//! Logs in, then either lists rooms or joins one and relays stdin lines as
//! chat messages. Token refresh happens transparently on 401.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin barcart-client -- -e alice@barcart.dev -p alice rooms
//! cargo run --bin barcart-client -- -e alice@barcart.dev -p alice chat --room <room-id>
//! cargo run --bin barcart-client -- -e bob@barcart.dev -p bob --reconnect-attempts 5 chat -r <room-id>
//! ```

use clap::{Parser, Subcommand};

use barcart_client::{
    cli::{CliError, run_chat, run_rooms},
    config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_WS_URL, ReconnectPolicy},
    context::ClientContext,
};
use barcart_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "barcart-client")]
#[command(about = "Barcart chat client with transparent token refresh", long_about = None)]
struct Args {
    /// REST base URL
    #[arg(short = 'b', long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Chat WebSocket URL
    #[arg(short = 'w', long, default_value = DEFAULT_WS_URL)]
    ws_url: String,

    /// Login email
    #[arg(short = 'e', long)]
    email: String,

    /// Login password
    #[arg(short = 'p', long)]
    password: String,

    /// Automatic reconnect attempts after an unexpected disconnect (0 disables)
    #[arg(long, default_value_t = 0)]
    reconnect_attempts: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all rooms
    Rooms,
    /// Join a room and chat
    Chat {
        /// Room ID to join
        #[arg(short = 'r', long)]
        room: String,
    },
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = ClientConfig {
        base_url: args.base_url,
        ws_url: args.ws_url,
        reconnect: ReconnectPolicy::bounded(args.reconnect_attempts),
        ..ClientConfig::default()
    };
    let (context, events) = ClientContext::new(config)?;

    context.login(&args.email, &args.password).await?;

    match args.command {
        Command::Rooms => run_rooms(&context).await,
        Command::Chat { room } => run_chat(&context, events, &room).await,
    }
}
