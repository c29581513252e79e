use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::app::AppState;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::services::{IssuedSession, Principal};
use crate::types::TenantId;

/// Authenticated caller, placed in request extensions by [`session_auth_middleware`]
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    /// The caller's tenant, or 403 for unaffiliated accounts
    pub fn tenant(&self) -> Result<TenantId, ApiError> {
        Ok(self.0.tenant()?)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

/// Rejects requests without a live session before any handler runs
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = state
        .cookies
        .token(&jar)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let principal = state.auth.authenticate(&token).await?;
    debug!("Resolved session for user {}", principal.user_id);

    request.extensions_mut().insert(AuthUser(principal));
    Ok(next.run(request).await)
}

/// How the session cookie is written and read
#[derive(Clone, Debug)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    max_age_seconds: i64,
}

impl SessionCookies {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            max_age_seconds: config.ttl_hours * 3600,
        }
    }

    pub fn token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn issue(&self, jar: CookieJar, session: &IssuedSession) -> CookieJar {
        let cookie = Cookie::build((self.name.clone(), session.token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(self.max_age_seconds));
        jar.add(cookie)
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.name.clone()).path("/"))
    }
}
