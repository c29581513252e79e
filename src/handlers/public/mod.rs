// handlers/public/mod.rs - endpoints that need no session
//
// Security Level: none
// Middleware: none

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub mod auth;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "fintrack-api",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant tracker for insurance policies and investments",
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login, /api/auth/logout (public); /api/auth/me, /api/auth/password",
                "policies": "/api/policies[/:id[/document]]",
                "investments": "/api/investments[/:id]",
                "dashboard": "/api/dashboard/stats, /api/dashboard/analytics",
                "admin": "/api/admin/users[/:id[/role|/password]] (admin only)",
                "health": "/health (public)"
            }
        }
    }))
}

/// GET /health - liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.tenants.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
