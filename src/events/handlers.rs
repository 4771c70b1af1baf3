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
use crate::events::dto::{parse_event_dates, CreateEventRequest, UpdateEventRequest};
use crate::events::repo::{Event, EventChanges, EventStore, NewEvent};
use crate::state::AppState;

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[instrument(skip(state, payload))]
async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let (start_date, end_date) = parse_event_dates(&payload.start_date, &payload.end_date)?;
    let event = state
        .events
        .create(
            user.id,
            NewEvent {
                title: payload.title,
                description: payload.description,
                start_date,
                end_date,
            },
        )
        .await
        .map_err(|e| ApiError::internal("error.creating_event", e, &state.config))?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[instrument(skip(state))]
async fn list_events(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .events
        .list_by_user(user.id)
        .await
        .map_err(|e| ApiError::internal("error.fetching_events", e, &state.config))?;
    Ok(Json(events))
}

#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .events
        .find_by_id(user.id, id)
        .await
        .map_err(|e| ApiError::internal("error.fetching_event", e, &state.config))?
        .ok_or(ApiError::EventNotFound)?;
    Ok(Json(event))
}

#[instrument(skip(state, payload))]
async fn update_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    // Dates are validated before touching the store, so a bad range on a
    // missing event still reports 400.
    let (start_date, end_date) = parse_event_dates(&payload.start_date, &payload.end_date)?;
    let event = state
        .events
        .update(
            user.id,
            id,
            EventChanges {
                title: payload.title,
                description: payload.description,
                start_date,
                end_date,
            },
        )
        .await
        .map_err(|e| ApiError::internal("error.updating_event", e, &state.config))?
        .ok_or(ApiError::EventNotFound)?;
    Ok(Json(event))
}

#[instrument(skip(state))]
async fn delete_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .events
        .delete(user.id, id)
        .await
        .map_err(|e| ApiError::internal("error.deleting_event", e, &state.config))?;
    if !deleted {
        return Err(ApiError::EventNotFound);
    }
    Ok(Json(MessageResponse {
        message: "success.event_deleted",
    }))
}
