// handlers/public/auth/register.rs - POST /api/auth/register

use axum::{extract::State, Json};
use axum_extra::extract::{CookieJar, WithRejection};

use crate::app::AppState;
use crate::database::models::AccountProfile;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::validation::account::RegisterPayload;

/// Create an account under the tenant for `domain`, creating the tenant on
/// first use. The first account of a tenant becomes its admin.
///
/// Input: `{ email, password, domain, firstName?, lastName?, tenantName?, subdomain? }`
///
/// Output: 201 with the account profile; the session cookie is set.
pub async fn register_post(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterPayload>, ApiError>,
) -> Result<(CookieJar, ApiResponse<AccountProfile>), ApiError> {
    let outcome = state.auth.register(payload).await?;
    let jar = state.cookies.issue(jar, &outcome.session);
    Ok((jar, ApiResponse::created(outcome.profile)))
}
