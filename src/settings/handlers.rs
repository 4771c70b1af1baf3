use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::MessageResponse;
use crate::auth::extractors::CurrentUser;
use crate::error::ApiError;
use crate::settings::dto::{CreateSettingRequest, UpdateSettingRequest};
use crate::settings::repo::{Setting, SettingStore};
use crate::state::AppState;

pub fn setting_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", post(create_setting).get(list_settings))
        .route(
            "/settings/:id",
            get(get_setting).put(update_setting).delete(delete_setting),
        )
}

#[instrument(skip(state, payload))]
async fn create_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateSettingRequest>,
) -> Result<(StatusCode, Json<Setting>), ApiError> {
    let setting = state
        .settings
        .create(user.id, payload.into_new_setting())
        .await
        .map_err(|e| ApiError::internal("error.creating_setting", e, &state.config))?;
    Ok((StatusCode::CREATED, Json(setting)))
}

#[instrument(skip(state))]
async fn list_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Setting>>, ApiError> {
    let settings = state
        .settings
        .list_by_user(user.id)
        .await
        .map_err(|e| ApiError::internal("error.fetching_settings", e, &state.config))?;
    Ok(Json(settings))
}

#[instrument(skip(state))]
async fn get_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Setting>, ApiError> {
    let setting = state
        .settings
        .find_by_id(user.id, id)
        .await
        .map_err(|e| ApiError::internal("error.fetching_setting", e, &state.config))?
        .ok_or(ApiError::SettingNotFound)?;
    Ok(Json(setting))
}

#[instrument(skip(state, payload))]
async fn update_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSettingRequest>,
) -> Result<Json<Setting>, ApiError> {
    let setting = state
        .settings
        .update(user.id, id, payload.into_changes())
        .await
        .map_err(|e| ApiError::internal("error.updating_setting", e, &state.config))?
        .ok_or(ApiError::SettingNotFound)?;
    Ok(Json(setting))
}

#[instrument(skip(state))]
async fn delete_setting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .settings
        .delete(user.id, id)
        .await
        .map_err(|e| ApiError::internal("error.deleting_setting", e, &state.config))?;
    if !deleted {
        return Err(ApiError::SettingNotFound);
    }
    Ok(Json(MessageResponse {
        message: "success.setting_deleted",
    }))
}
