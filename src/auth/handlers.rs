use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::auth::dto::{
    AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenPair,
};
use crate::auth::service;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    let response = service::register(&state, payload.email, payload.password, payload.name).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    let response = service::login(&state, payload.email, payload.password).await?;
    Ok(Json(response))
}

// The body is optional so that an absent or unreadable body maps to the
// dedicated error instead of a generic extractor rejection.
#[instrument(skip(state, payload))]
async fn refresh_token(
    State(state): State<AppState>,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Json<TokenPair>, ApiError> {
    let refresh_token = payload.and_then(|Json(body)| body.refresh_token);
    let pair = service::refresh(&state, refresh_token).await?;
    Ok(Json(pair))
}

// Tokens are stateless, so logout is an acknowledgement and the client
// drops its pair.
#[instrument]
async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "success.logged_out",
    })
}
