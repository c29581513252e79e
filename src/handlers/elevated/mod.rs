// handlers/elevated/mod.rs - tenant administration
//
// Security Level: live session and the admin role
// Middleware: session_auth_middleware, then require_admin

use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::AccountProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::UserId;
use crate::validation::account::{ResetPasswordPayload, RolePayload};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(users_get))
        .route("/api/admin/users/:id", delete(user_delete))
        .route("/api/admin/users/:id/role", put(user_role_put))
        .route("/api/admin/users/:id/password", put(user_password_put))
}

/// GET /api/admin/users - members of the caller's tenant
pub async fn users_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<AccountProfile>> {
    Ok(ApiResponse::success(state.admin.list_members(user.principal()).await?))
}

/// PUT /api/admin/users/:id/role - `{ role: "admin" | "user" }`; admins cannot demote themselves
pub async fn user_role_put(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<UserId>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<RolePayload>, ApiError>,
) -> ApiResult<AccountProfile> {
    let profile = state.admin.change_role(user.principal(), id, payload).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/admin/users/:id/password - `{ newPassword }`
pub async fn user_password_put(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<UserId>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<ResetPasswordPayload>, ApiError>,
) -> ApiResult<Value> {
    state.admin.reset_password(user.principal(), id, payload).await?;
    Ok(ApiResponse::message("Password reset"))
}

/// DELETE /api/admin/users/:id - detach a member from the tenant
pub async fn user_delete(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<UserId>, ApiError>,
) -> ApiResult<Value> {
    state.admin.remove_member(user.principal(), id).await?;
    Ok(ApiResponse::message("User removed from tenant"))
}
