// handlers/public/auth/login.rs - POST /api/auth/login

use axum::{extract::State, Json};
use axum_extra::extract::{CookieJar, WithRejection};

use crate::app::AppState;
use crate::database::models::AccountProfile;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::validation::account::LoginPayload;

/// Verify `{ email, password }` and open a session.
///
/// Every credential failure answers the same 401 "Invalid email or password".
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginPayload>, ApiError>,
) -> Result<(CookieJar, ApiResponse<AccountProfile>), ApiError> {
    let outcome = state.auth.login(payload).await?;
    let jar = state.cookies.issue(jar, &outcome.session);
    Ok((jar, ApiResponse::success(outcome.profile)))
}
