//! HTTP endpoint handlers
//!
//! Each POST maps to one popup event and answers with the view rendered
//! after the event loop handled it.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use tracing::{error, info};

use super::responses::{HealthResponse, InputRequest, KeyRequest, StatusResponse};
use crate::{
    controller::Event,
    state::{AppState, View},
};

async fn dispatch_event(state: &AppState, event: Event) -> Result<Json<View>, StatusCode> {
    match state.dispatch(event).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            error!("Failed to handle popup event: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - Press the main button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<View>, StatusCode> {
    info!("Toggle endpoint called");
    dispatch_event(&state, Event::ToggleClicked).await
}

/// Handle POST /challenge/input - Replace the typed challenge text
pub async fn challenge_input_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> Result<Json<View>, StatusCode> {
    dispatch_event(&state, Event::ChallengeInput(request.text)).await
}

/// Handle POST /challenge/confirm - Press the confirm button
pub async fn challenge_confirm_handler(State(state): State<Arc<AppState>>) -> Result<Json<View>, StatusCode> {
    info!("Challenge confirm endpoint called");
    dispatch_event(&state, Event::ConfirmClicked).await
}

/// Handle POST /challenge/key - Press a key inside the challenge input
pub async fn challenge_key_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<View>, StatusCode> {
    dispatch_event(&state, Event::KeyDown(request.key)).await
}

/// Handle GET /view - Return the last rendered view
pub async fn view_handler(State(state): State<Arc<AppState>>) -> Json<View> {
    Json(state.current_view())
}

/// Handle GET /status - Return the view with server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        view: state.current_view(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        timestamp: Utc::now(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
