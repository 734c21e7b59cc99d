//! Auth handlers: login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use ticketdesk_auth::RotationRejection;
use ticketdesk_core::error::AppError;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest};
use crate::dto::response::{LoginResponse, MessageResponse, TokenResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid login request: {e}")))?;

    let result = state
        .session_manager
        .login(&req.username, &req.password, req.remember)
        .await?;

    Ok(Json(LoginResponse {
        tokens: result.tokens.into(),
        user: result.identity.into(),
    }))
}

/// POST /api/auth/refresh
///
/// A missing or unreadable body is an invalid refresh token.
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable refresh request body");
        AppError::from(RotationRejection::InvalidRefresh)
    })?;

    let tokens = state.session_manager.refresh(&req.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// POST /api/auth/logout
///
/// Always answers 200, even for a missing or unreadable body.
pub async fn logout(
    State(state): State<AppState>,
    body: Result<Json<LogoutRequest>, JsonRejection>,
) -> Json<MessageResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    if !req.refresh_token.is_empty() {
        state.session_manager.logout(&req.refresh_token).await;
    }

    Json(MessageResponse {
        message: "logged_out".to_string(),
    })
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(auth.0.into())
}
