use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use py3ready_core::models::{LoginRequest, NewUser, RegisterRequest, TokenResponse, UserResponse};
use py3ready_core::AppError;
use std::sync::Arc;
use validator::Validate;

/// bcrypt is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalWithSource {
            message: "Password task failed".to_string(),
            source: anyhow::Error::new(e),
        })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    if state.auth.users.find_by_email(&request.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()).into());
    }

    let cost = state.auth.password_cost;
    let password = request.password;
    let hashed_password = run_blocking(move || hash_password(&password, cost)).await??;

    let user = state
        .auth
        .users
        .create(NewUser {
            email: request.email,
            username: request.username,
            hashed_password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let rejected = || AppError::Unauthorized("Incorrect email or password".to_string());

    let user = state
        .auth
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(rejected)?;

    let password = request.password;
    let hashed = user.hashed_password.clone();
    if !run_blocking(move || verify_password(&password, &hashed)).await? {
        return Err(rejected().into());
    }

    let token = state.auth.jwt.issue(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Inactive user", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(auth_user: AuthUser) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(UserResponse::from(auth_user.user)))
}
