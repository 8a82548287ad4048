use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AuthState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use py3ready_core::AppError;
use std::sync::Arc;

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

async fn authenticate(
    auth_state: &AuthState,
    token: Result<String, AppError>,
) -> Result<AuthUser, AppError> {
    let user_id = auth_state.jwt.verify_user_id(&token?)?;

    let user = auth_state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user".to_string()));
    }

    Ok(AuthUser { user })
}

/// Resolves the bearer token to an active user and stores it as [`AuthUser`].
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // The request is not Sync; nothing borrowed from it may live across an await.
    let token = bearer_token(&request).map(str::to_string);
    match authenticate(&auth_state, token).await {
        Ok(auth_user) => {
            tracing::debug!(user_id = %auth_user.id(), "Request authenticated");
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}
