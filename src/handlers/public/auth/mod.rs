// handlers/public/auth/mod.rs - session acquisition and release
//
// register and login set the session cookie; logout clears it.

use axum::Router;
use axum::routing::post;

use crate::app::AppState;

pub mod login;
pub mod logout;
pub mod register;

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register_post))
        .route("/api/auth/login", post(login_post))
        .route("/api/auth/logout", post(logout_post))
}
