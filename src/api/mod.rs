//! HTTP API module
//!
//! This module exposes the popup surface over HTTP: reads of the rendered
//! view and one endpoint per user action.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/toggle", post(toggle_handler))
        .route("/challenge/input", post(challenge_input_handler))
        .route("/challenge/confirm", post(challenge_confirm_handler))
        .route("/challenge/key", post(challenge_key_handler))
        .route("/view", get(view_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
