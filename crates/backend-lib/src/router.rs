// ============================
// authkit-backend/src/router.rs
// ============================
//! HTTP router.
use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{login, register};
use crate::AppState;

/// Create the authentication router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
