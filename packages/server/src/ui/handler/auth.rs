//! `/auth/*` endpoints.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use barcart_shared::protocol::{LoginRequest, MemberInfo, RefreshRequest, TokenResponse};

use crate::ui::{extractor::AuthMember, state::AppState};

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    state
        .auth_usecase
        .login(&body.email, &body.pwd)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::info!("Login rejected for {}: {}", body.email, e);
            StatusCode::UNAUTHORIZED
        })
}

/// `POST /auth/refresh`
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    state
        .auth_usecase
        .refresh(&body.refresh_token)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::info!("Refresh rejected: {}", e);
            StatusCode::UNAUTHORIZED
        })
}

/// `GET /auth/me`
pub async fn me(AuthMember(account): AuthMember) -> Json<MemberInfo> {
    Json(account.info())
}
