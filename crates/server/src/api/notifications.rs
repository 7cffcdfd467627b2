use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::AppState;

pub async fn notifications(State(state): State<Arc<AppState>>) -> Response {
    Json(state.notifications.drain()).into_response()
}
