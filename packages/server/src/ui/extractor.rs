//! Bearer token extractor for the guarded REST endpoints.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::domain::Account;

use super::state::AppState;

/// The member authenticated by `Authorization: Bearer <accessToken>`.
///
/// Missing, unknown and expired tokens are all rejected with 401, which is
/// what triggers the client's token refresh.
#[derive(Debug, Clone)]
pub struct AuthMember(pub Account);

impl FromRequestParts<Arc<AppState>> for AuthMember {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        state
            .auth_usecase
            .authenticate(token)
            .await
            .map(AuthMember)
            .map_err(|e| {
                tracing::debug!("Rejected {} {}: {}", parts.method, parts.uri, e);
                StatusCode::UNAUTHORIZED
            })
    }
}
