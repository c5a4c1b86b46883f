//! Standardized error types following the `error-guildgate-<domain>-<number>` format.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::access::AccessLevel;

/// Path browsers are sent to when they need to (re)start the login flow.
pub const LOGIN_PATH: &str = "/auth/login";

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-guildgate-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when PORT cannot be parsed
    #[error("error-guildgate-config-2 Parsing HTTP_PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-guildgate-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-guildgate-config-4 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when a URL value cannot be parsed
    #[error("error-guildgate-config-5 Failed to parse URL '{0}': {1}")]
    UrlParsingFailed(String, url::ParseError),

    /// Error when a URL cannot carry path segments
    #[error("error-guildgate-config-6 URL '{0}' cannot be used as an API base")]
    UrlNotBase(String),

    /// Error when the session signing secret is too weak to be used
    #[error("error-guildgate-config-7 JWT_SECRET must be at least {minimum} bytes, got {actual}")]
    SigningSecretTooShort { minimum: usize, actual: usize },

    /// Error when an access level name is not recognized
    #[error(
        "error-guildgate-config-8 Unknown access level '{0}': expected user, moderator, admin or owner"
    )]
    UnknownAccessLevel(String),

    /// Error when the post-login redirect is not a local path
    #[error("error-guildgate-config-9 LOGIN_REDIRECT_PATH must be a local path, got '{0}'")]
    RedirectPathInvalid(String),

    /// Error when no OAuth scopes are configured
    #[error("error-guildgate-config-10 OAUTH_SCOPES must name at least one scope")]
    ScopesEmpty,
}

/// Errors raised while talking to the OAuth provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The authorization code could not be exchanged for an access token
    #[error("error-guildgate-provider-1 Token exchange failed: {0}")]
    TokenExchange(String),

    /// The authenticated identity could not be fetched
    #[error("error-guildgate-provider-2 Identity fetch failed: {0}")]
    IdentityFetch(String),

    /// The identity is not a member of the configured guild
    #[error("error-guildgate-provider-3 Identity is not a member of the guild")]
    NotAMember,

    /// The guild membership could not be fetched for another reason
    #[error("error-guildgate-provider-4 Membership fetch failed: {0}")]
    MembershipFetch(String),

    /// A provider endpoint URL could not be built
    #[error("error-guildgate-provider-5 Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Session token creation and verification errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The signature does not match the header and payload
    #[error("error-guildgate-session-1 Invalid signature")]
    InvalidSignature,

    /// The token could not be parsed
    #[error("error-guildgate-session-2 Malformed token: {0}")]
    Malformed(String),

    /// The token's expiry claim is in the past
    #[error("error-guildgate-session-3 Token expired")]
    Expired,

    /// The token could not be signed or the key is unusable
    #[error("error-guildgate-session-4 Signing failed: {0}")]
    Signing(String),
}

/// Login flow failures, each terminal for the attempt
#[derive(Debug, Error)]
pub enum LoginError {
    /// State parameter or state cookie missing, or the two differ
    #[error("error-guildgate-login-1 State mismatch: {0}")]
    StateMismatch(&'static str),

    /// The provider redirected back with an error instead of a code
    #[error("error-guildgate-login-2 Authorization denied by provider: {0}")]
    AuthorizationDenied(String),

    /// The callback carried a valid state but no code
    #[error("error-guildgate-login-3 Missing authorization code")]
    MissingCode,

    /// A provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The resolved access level is below the configured login minimum
    #[error("error-guildgate-login-4 Access level {actual} is below required {required}")]
    InsufficientRole {
        actual: AccessLevel,
        required: AccessLevel,
    },

    /// The session could not be minted
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The display cookie could not be serialized
    #[error("error-guildgate-login-5 Failed to encode display cookie: {0}")]
    DisplayEncoding(String),
}

/// Gate failures for protected requests
#[derive(Debug, Error)]
pub enum GateError {
    /// No session cookie was presented
    #[error("error-guildgate-gate-1 Missing session cookie")]
    MissingSession,

    /// The session cookie failed verification
    #[error("error-guildgate-gate-2 Session rejected: {0}")]
    InvalidSession(SessionError),

    /// The session is valid but its access level is too low
    #[error("error-guildgate-gate-3 Access level {actual} is below required {required}")]
    InsufficientRole {
        actual: AccessLevel,
        required: AccessLevel,
    },

    /// Something went wrong that is not the caller's fault
    #[error("error-guildgate-gate-4 Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for GateError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(message) => GateError::Internal(message),
            other => GateError::InvalidSession(other),
        }
    }
}

/// Build a JSON error body with an optional human readable message
fn error_body(status: StatusCode, error: &str, message: Option<&str>) -> Response {
    let body = match message {
        Some(message) => json!({ "error": error, "message": message }),
        None => json!({ "error": error }),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match &self {
            LoginError::StateMismatch(reason) => {
                tracing::warn!(reason, "rejecting oauth callback");
                error_body(StatusCode::BAD_REQUEST, "Invalid state parameter", None)
            }
            LoginError::MissingCode => {
                tracing::warn!("oauth callback without code");
                error_body(
                    StatusCode::BAD_REQUEST,
                    "Missing authorization code",
                    None,
                )
            }
            LoginError::AuthorizationDenied(reason) => {
                tracing::info!(reason, "provider denied authorization");
                error_body(
                    StatusCode::FORBIDDEN,
                    "Access denied",
                    Some("Authorization was not granted."),
                )
            }
            LoginError::Provider(ProviderError::NotAMember) => error_body(
                StatusCode::FORBIDDEN,
                "Access denied",
                Some("You must be a member of our Discord server to access staff resources."),
            ),
            LoginError::InsufficientRole { actual, required } => {
                tracing::info!(%actual, %required, "login below minimum access level");
                error_body(
                    StatusCode::FORBIDDEN,
                    "Insufficient permissions",
                    Some("You must have a staff role to access these resources."),
                )
            }
            LoginError::Provider(_) | LoginError::Session(_) | LoginError::DisplayEncoding(_) => {
                tracing::error!(error = ?self, "login failed");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed",
                    None,
                )
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match &self {
            GateError::MissingSession | GateError::InvalidSession(_) => {
                tracing::debug!(error = %self, "unauthenticated request");
                let body = json!({
                    "error": "Authentication required",
                    "redirect": LOGIN_PATH,
                });
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            GateError::InsufficientRole { required, .. } => {
                tracing::debug!(error = %self, "forbidden request");
                error_body(
                    StatusCode::FORBIDDEN,
                    "Insufficient permissions",
                    Some(&format!("Access level '{required}' required")),
                )
            }
            GateError::Internal(_) => {
                tracing::error!(error = ?self, "authorization failed");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed",
                    None,
                )
            }
        }
    }
}

/// Answer for any route hit with a method it does not serve
pub async fn method_not_allowed() -> Response {
    error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}
