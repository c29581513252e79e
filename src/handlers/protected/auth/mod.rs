// handlers/protected/auth/mod.rs - self-service account endpoints

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::AccountProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::account::ChangePasswordPayload;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(me_get))
        .route("/api/auth/password", put(password_put))
}

/// GET /api/auth/me - profile of the caller plus the tenant's domain
pub async fn me_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<AccountProfile> {
    let profile = state.auth.me(user.principal()).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/auth/password - `{ currentPassword, newPassword }`
pub async fn password_put(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<ChangePasswordPayload>, ApiError>,
) -> ApiResult<Value> {
    state.auth.change_password(user.principal(), payload).await?;
    Ok(ApiResponse::message("Password updated"))
}
