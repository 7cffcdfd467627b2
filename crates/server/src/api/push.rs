use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fleetboard::prelude::*;
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

/// Entry point for the record service to deliver new snapshots.
pub async fn push(
    State(state): State<Arc<AppState>>,
    Json(push): Json<Push>,
) -> Result<Response, StatusCode> {
    state.pushes.send(push).await.map_err(|err| {
        error!("Push channel closed: {err}");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok(StatusCode::ACCEPTED.into_response())
}
