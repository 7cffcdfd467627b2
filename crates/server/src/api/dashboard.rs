use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::{dto::RefreshDto, state::AppState};

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    Json(state.controller.snapshot().await).into_response()
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.controller.request_refresh().await;
    Json(RefreshDto::from(outcome)).into_response()
}

pub async fn toggle(
    Path(bus_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    if !state.controller.toggle_item(&bus_id).await {
        return Err(StatusCode::NOT_FOUND);
    }
    let view = state
        .controller
        .with_dashboard(|dashboard| dashboard.view(&bus_id).cloned())
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(view).into_response())
}
