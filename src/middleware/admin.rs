use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use super::auth::AuthUser;
use crate::error::ApiError;

/// Admin surface guard. Runs after the session gate, so the role is the one
/// currently stored for the account.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    if !user.principal().role.is_admin() {
        warn!("Non-admin {} tried to reach {}", user.principal().user_id, request.uri().path());
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
