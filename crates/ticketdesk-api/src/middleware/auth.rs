//! Blanket authentication layer.
//!
//! Routes behind [`require_auth`] get the verified [`Identity`] in request
//! extensions, where the `AuthUser` extractor picks it up without
//! re-verifying.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use ticketdesk_core::traits::Identity;

use crate::error::ApiError;
use crate::extractors::auth::bearer_token;
use crate::state::AppState;

/// Rejects requests without a valid access credential.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers());
    let identity: Identity = state
        .session_manager
        .authenticate(token.as_deref())
        .await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
