//! Handles GET /auth/login - starts a staff login by redirecting to the provider

use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use super::{context::AppState, cookies::state_cookie, utils_response::found};

/// Handle login start
/// GET /auth/login - Sets the oauth_state cookie and answers 302 to the authorization URL
pub async fn handle_auth_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> impl IntoResponse {
    let start = state.login_flow.start();
    tracing::debug!("starting staff login");

    (
        jar.add(state_cookie(start.state)),
        found(start.authorization_url.to_string()),
    )
}
