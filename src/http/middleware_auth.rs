//! Session cookie authentication for staff endpoints.
//!
//! Two ways to protect a route, both backed by [`authorize`]:
//!
//! - [`require_access_level`], a middleware applied with
//!   `axum::middleware::from_fn_with_state` and an [`AccessRequirement`]. It stores the
//!   [`RequestIdentity`] in the request extensions for the handler to extract.
//! - [`Authorized`], an extractor declared in the handler signature with a marker type
//!   from [`levels`].
//!
//! ```ignore
//! use guildgate::http::middleware_auth::{Authorized, levels::Moderator};
//!
//! async fn staff_only(authorized: Authorized<Moderator>) -> String {
//!     format!("hello {}", authorized.identity.username)
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::{HeaderMap, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::access::AccessLevel;
use crate::errors::GateError;
use crate::http::cookies::SESSION_COOKIE;
use crate::session::{SessionClaims, SessionCodec};

/// Verified session claims attached to one in-flight request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestIdentity(pub SessionClaims);

impl Deref for RequestIdentity {
    type Target = SessionClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Check the session cookie in `headers` and enforce `required`
pub fn authorize(
    session_codec: &SessionCodec,
    headers: &HeaderMap,
    required: AccessLevel,
) -> Result<RequestIdentity, GateError> {
    let jar = CookieJar::from_headers(headers);
    let session = jar
        .get(SESSION_COOKIE)
        .filter(|cookie| !cookie.value().is_empty())
        .ok_or(GateError::MissingSession)?;

    let claims = session_codec.verify(session.value())?;

    if !claims.access_level.satisfies(required) {
        return Err(GateError::InsufficientRole {
            actual: claims.access_level,
            required,
        });
    }

    Ok(RequestIdentity(claims))
}

/// Minimum access level enforced by [`require_access_level`]
#[derive(Clone)]
pub struct AccessRequirement {
    session_codec: Arc<SessionCodec>,
    required: AccessLevel,
}

impl AccessRequirement {
    pub fn new(session_codec: Arc<SessionCodec>, required: AccessLevel) -> Self {
        Self {
            session_codec,
            required,
        }
    }
}

/// Middleware that rejects requests below the configured access level
pub async fn require_access_level(
    State(requirement): State<AccessRequirement>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(
        &requirement.session_codec,
        request.headers(),
        requirement.required,
    ) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = GateError;

    /// Read the identity stored by the access middleware. A handler mounted without
    /// the middleware fails with 500 instead of running unauthenticated.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or_else(|| GateError::Internal("no access gate in front of handler".to_string()))
    }
}

/// Static access level requirement for [`Authorized`]
pub trait RequiredLevel: Send + Sync + 'static {
    const LEVEL: AccessLevel;
}

/// Marker types naming each access level
pub mod levels {
    use super::RequiredLevel;
    use crate::access::AccessLevel;

    pub struct User;
    pub struct Moderator;
    pub struct Admin;
    pub struct Owner;

    impl RequiredLevel for User {
        const LEVEL: AccessLevel = AccessLevel::User;
    }

    impl RequiredLevel for Moderator {
        const LEVEL: AccessLevel = AccessLevel::Moderator;
    }

    impl RequiredLevel for Admin {
        const LEVEL: AccessLevel = AccessLevel::Admin;
    }

    impl RequiredLevel for Owner {
        const LEVEL: AccessLevel = AccessLevel::Owner;
    }
}

/// Extractor admitting only sessions at or above `L::LEVEL`
pub struct Authorized<L: RequiredLevel> {
    pub identity: RequestIdentity,
    level: PhantomData<fn() -> L>,
}

impl<S, L> FromRequestParts<S> for Authorized<L>
where
    Arc<SessionCodec>: FromRef<S>,
    S: Send + Sync,
    L: RequiredLevel,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session_codec = Arc::<SessionCodec>::from_ref(state);
        let identity = authorize(&session_codec, &parts.headers, L::LEVEL)?;
        parts.extensions.insert(identity.clone());

        Ok(Self {
            identity,
            level: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::levels::{Admin, Moderator};
    use super::*;
    use crate::config::test_config;
    use crate::http::context::AppState;
    use crate::oauth::{DiscordClient, DiscordSettings, ProviderIdentity};
    use axum::body::{Body, to_bytes};
    use axum::http::{StatusCode, header};
    use axum::{Json, Router, middleware, routing::get};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_state() -> AppState {
        let config = Arc::new(test_config());
        let provider = Arc::new(DiscordClient::new(
            reqwest::Client::new(),
            DiscordSettings::from(config.as_ref()),
        ));
        AppState::new(config, provider)
    }

    fn token(state: &AppState, level: AccessLevel, issued: chrono::DateTime<Utc>) -> String {
        let identity = ProviderIdentity {
            id: "42".to_string(),
            username: "kestrel".to_string(),
            discriminator: None,
            avatar: None,
        };
        let claims = state
            .session_codec
            .claims_for(&identity, vec!["r".to_string()], level, issued);
        state.session_codec.create(&claims).unwrap()
    }

    async fn extractor_handler(authorized: Authorized<Moderator>) -> Json<Value> {
        Json(json!({ "id": authorized.identity.user_id }))
    }

    async fn extension_handler(identity: RequestIdentity) -> Json<Value> {
        Json(json!({ "id": identity.user_id, "level": identity.access_level }))
    }

    fn router(state: &AppState) -> Router {
        let layered = Router::new()
            .route("/layered", get(extension_handler))
            .route_layer(middleware::from_fn_with_state(
                AccessRequirement::new(state.session_codec.clone(), AccessLevel::Moderator),
                require_access_level,
            ));

        Router::new()
            .route("/extracted", get(extractor_handler))
            .route("/ungated", get(extension_handler))
            .merge(layered)
            .with_state(state.clone())
    }

    async fn call(router: Router, path: &str, session: Option<&str>) -> (StatusCode, Value) {
        let mut request = axum::http::Request::builder().uri(path);
        if let Some(session) = session {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE}={session}"));
        }
        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_both_forms_share_the_same_decisions() {
        let state = app_state();
        let user = token(&state, AccessLevel::User, Utc::now());
        let admin = token(&state, AccessLevel::Admin, Utc::now());
        let expired = token(&state, AccessLevel::Owner, Utc::now() - Duration::days(2));

        for path in ["/extracted", "/layered"] {
            let (status, body) = call(router(&state), path, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["redirect"], "/auth/login");

            let (status, _) = call(router(&state), path, Some(&user)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{path}");

            let (status, body) = call(router(&state), path, Some(&admin)).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body["id"], "42");

            let (status, _) = call(router(&state), path, Some(&expired)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn test_expired_and_forged_bodies_are_identical() {
        let state = app_state();
        let expired = token(&state, AccessLevel::Owner, Utc::now() - Duration::days(2));

        let (_, expired_body) = call(router(&state), "/extracted", Some(&expired)).await;
        let (_, forged_body) = call(router(&state), "/extracted", Some("x.y.z")).await;
        let (_, missing_body) = call(router(&state), "/extracted", None).await;

        assert_eq!(expired_body, forged_body);
        assert_eq!(forged_body, missing_body);
    }

    #[tokio::test]
    async fn test_identity_reaches_layered_handler() {
        let state = app_state();
        let admin = token(&state, AccessLevel::Admin, Utc::now());

        let (status, body) = call(router(&state), "/layered", Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], "admin");
    }

    #[tokio::test]
    async fn test_handler_without_gate_fails_closed() {
        let state = app_state();
        let admin = token(&state, AccessLevel::Admin, Utc::now());

        let (status, _) = call(router(&state), "/ungated", Some(&admin)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_authorize_levels() {
        let state = app_state();
        let moderator = token(&state, AccessLevel::Moderator, Utc::now());
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("theme=dark; {SESSION_COOKIE}={moderator}")
                .parse()
                .unwrap(),
        );

        let identity = authorize(&state.session_codec, &headers, AccessLevel::User).unwrap();
        assert_eq!(identity.access_level, AccessLevel::Moderator);
        assert!(authorize(&state.session_codec, &headers, AccessLevel::Moderator).is_ok());
        assert!(matches!(
            authorize(&state.session_codec, &headers, Admin::LEVEL),
            Err(GateError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_authorize_empty_cookie_is_missing() {
        let state = app_state();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, format!("{SESSION_COOKIE}=").parse().unwrap());

        assert!(matches!(
            authorize(&state.session_codec, &headers, AccessLevel::User),
            Err(GateError::MissingSession)
        ));
    }
}
