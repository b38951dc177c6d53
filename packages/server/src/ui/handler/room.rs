//! `/chat/*` endpoints and the health check.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use barcart_shared::protocol::{ChatFrame, CreateRoomRequest, RoomInfo};

use crate::{
    ui::{extractor::AuthMember, state::AppState},
    usecase::RoomQueryError,
};

fn status_of(e: RoomQueryError) -> StatusCode {
    match e {
        RoomQueryError::RoomNotFound => StatusCode::NOT_FOUND,
        RoomQueryError::InvalidRoom(reason) => {
            tracing::debug!("Invalid room request: {}", reason);
            StatusCode::BAD_REQUEST
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /chat/roomList`
pub async fn list_rooms(
    _member: AuthMember,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<RoomInfo>> {
    Json(state.rooms_usecase.list().await)
}

/// `GET /chat/myRooms`
pub async fn list_my_rooms(
    AuthMember(account): AuthMember,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<RoomInfo>> {
    Json(state.rooms_usecase.my_rooms(account.member_id).await)
}

/// `GET /chat/room/{room_id}`
pub async fn get_room(
    _member: AuthMember,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>, StatusCode> {
    state
        .rooms_usecase
        .get(&room_id)
        .await
        .map(Json)
        .map_err(status_of)
}

/// `GET /chat/cntRoomMember/{room_id}`
pub async fn count_room_members(
    _member: AuthMember,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<u32>, StatusCode> {
    state
        .rooms_usecase
        .member_count(&room_id)
        .await
        .map(Json)
        .map_err(status_of)
}

/// `GET /chat/message/{room_id}`
pub async fn room_messages(
    _member: AuthMember,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatFrame>>, StatusCode> {
    state
        .rooms_usecase
        .history(&room_id)
        .await
        .map(Json)
        .map_err(status_of)
}

/// `POST /chat/new`
pub async fn create_room(
    AuthMember(account): AuthMember,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<Json<RoomInfo>, StatusCode> {
    tracing::debug!("Member {} creates room '{}'", account.member_id, body.name);
    state
        .rooms_usecase
        .create(body)
        .await
        .map(Json)
        .map_err(status_of)
}

/// `DELETE /chat/delRoom/{room_id}`: `true` when deleted, `false` while occupied
pub async fn delete_room(
    _member: AuthMember,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<bool>, StatusCode> {
    state
        .rooms_usecase
        .delete(&room_id)
        .await
        .map(Json)
        .map_err(status_of)
}
