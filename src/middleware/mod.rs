pub mod admin;
pub mod auth;
pub mod response;

pub use admin::require_admin;
pub use auth::{session_auth_middleware, AuthUser, SessionCookies};
pub use response::{ApiResponse, ApiResult};
