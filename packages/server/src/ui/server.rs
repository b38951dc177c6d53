//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        count_room_members, create_room, delete_room, get_room, health_check, list_my_rooms,
        list_rooms, login, me, refresh, room_messages, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Barcart development server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::new(accounts, rooms, pusher, clock, ttl));
/// server.run("127.0.0.1".to_string(), 8111).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/chat", get(websocket_handler))
            // 認証
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/auth/me", get(me))
            // 部屋
            .route("/chat/roomList", get(list_rooms))
            .route("/chat/myRooms", get(list_my_rooms))
            .route("/chat/room/{room_id}", get(get_room))
            .route("/chat/cntRoomMember/{room_id}", get(count_room_members))
            .route("/chat/message/{room_id}", get(room_messages))
            .route("/chat/new", post(create_room))
            .route("/chat/delRoom/{room_id}", delete(delete_room))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> std::io::Result<()> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws/chat", bind_addr);
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!("Barcart server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
