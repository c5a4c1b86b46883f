//! Cookies exchanged with the browser during login and on protected requests.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::session::SESSION_LIFETIME_SECONDS;

/// Anti-CSRF state for one pending login attempt
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Signed session token
pub const SESSION_COOKIE: &str = "staff_session";

/// Client readable display data: id, username and avatar only
pub const DISPLAY_COOKIE: &str = "staff_user";

/// State cookies only travel to the login and callback endpoints
const OAUTH_STATE_PATH: &str = "/auth";

const OAUTH_STATE_MAX_AGE_SECONDS: i64 = 600;

pub fn state_cookie(state: String) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(OAUTH_STATE_MAX_AGE_SECONDS))
        .build()
}

pub fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(SESSION_LIFETIME_SECONDS))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
}

/// Display cookie. Deliberately not HttpOnly so the dashboard can read it.
pub fn display_cookie(display_json: String) -> Cookie<'static> {
    Cookie::build((DISPLAY_COOKIE, display_json))
        .path("/")
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(SESSION_LIFETIME_SECONDS))
        .build()
}

pub fn clear_display_cookie() -> Cookie<'static> {
    Cookie::build((DISPLAY_COOKIE, ""))
        .path("/")
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
}
