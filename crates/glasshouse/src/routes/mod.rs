//! HTTP route handlers for Glasshouse.

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use glasshouse_common::GlasshouseError;

use crate::state::AppState;

mod auth;
mod captcha;
mod health;
mod home;
mod secrets;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Home page with the demo forms and flash messages
        .route("/", get(home::index))

        // CAPTCHA image
        .route("/captcha", get(captcha::issue))

        // Secrets
        .route("/messages", get(secrets::query))
        .route("/submit", post(secrets::submit))

        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))

        // Health
        .route("/health", get(health::health_check))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Map a component error onto its HTTP status
pub(crate) fn error_status(err: &GlasshouseError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
