// handlers/public/auth/logout.rs - POST /api/auth/logout

use axum::extract::State;
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// Destroy the current session, if any, and clear the cookie. Safe to repeat.
pub async fn logout_post(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let token = state.cookies.token(&jar);
    state.auth.logout(token.as_deref()).await?;
    Ok((state.cookies.clear(jar), ApiResponse::message("Logged out")))
}
