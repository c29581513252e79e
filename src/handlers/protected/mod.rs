// handlers/protected/mod.rs - endpoints behind the session gate
//
// Security Level: live session required
// Middleware: session_auth_middleware (401 before any handler runs)

use axum::Router;

use crate::app::AppState;

pub mod auth;
pub mod dashboard;
pub mod investments;
pub mod policies;

/// Routes that the caller wraps in the session gate
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(policies::routes())
        .merge(investments::routes())
        .merge(dashboard::routes())
}
