//! Handles GET /auth/callback - completes a staff login from the provider redirect

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::{
    context::AppState,
    cookies::{OAUTH_STATE_COOKIE, clear_state_cookie, display_cookie, session_cookie},
    utils_response::found,
};
use crate::login::CallbackParams;

/// Handle the provider callback
/// GET /auth/callback?code&state - Issues the session cookies and redirects to the dashboard.
/// The state cookie is cleared on every outcome.
pub async fn handle_auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let stored_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let jar = jar.add(clear_state_cookie());

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unparseable callback query");
            CallbackParams::default()
        }
    };

    let issued = match state
        .login_flow
        .complete(params, stored_state.as_deref())
        .await
    {
        Ok(issued) => issued,
        Err(err) => return (jar, err).into_response(),
    };

    let display = match issued.display_json() {
        Ok(display) => display,
        Err(err) => return (jar, err).into_response(),
    };

    let jar = jar
        .add(session_cookie(issued.token))
        .add(display_cookie(display));

    (
        jar,
        found(state.config.login_redirect_path.as_ref().to_string()),
    )
        .into_response()
}
