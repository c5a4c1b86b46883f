//! Handles POST /auth/logout - clears the staff session cookies

use axum::{Json, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::cookies::{clear_display_cookie, clear_session_cookie};

/// Handle logout
/// POST /auth/logout - Always succeeds, whether or not a session was present
pub async fn handle_auth_logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_session_cookie()).add(clear_display_cookie());

    (
        jar,
        Json(json!({
            "success": true,
            "message": "Successfully logged out",
        })),
    )
}
