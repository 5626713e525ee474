use crate::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use shared::domain::responses::HealthResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service health check passed", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse::healthy(&state.environment))
}
