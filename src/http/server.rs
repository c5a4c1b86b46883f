//! Main router configuration assembling the login and staff endpoints.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    context::AppState,
    handler_admin_session::handle_admin_session,
    handler_auth_callback::handle_auth_callback,
    handler_auth_login::handle_auth_login,
    handler_auth_logout::handle_auth_logout,
    handler_staff_status::handle_staff_status,
    middleware_auth::{AccessRequirement, require_access_level},
};
use crate::access::AccessLevel;
use crate::errors::method_not_allowed;

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", get(handle_auth_login).fallback(method_not_allowed))
        .route(
            "/callback",
            get(handle_auth_callback).fallback(method_not_allowed),
        )
        .route(
            "/logout",
            post(handle_auth_logout).fallback(method_not_allowed),
        );

    // The gate wraps the method routes only, so a method mismatch stays 405
    let admin_gate = middleware::from_fn_with_state(
        AccessRequirement::new(ctx.session_codec.clone(), AccessLevel::Admin),
        require_access_level,
    );
    let admin_routes = Router::new().route(
        "/session",
        get(handle_admin_session)
            .route_layer(admin_gate)
            .fallback(method_not_allowed),
    );

    // Staff routes enforce their level through the Authorized extractor
    let staff_routes = Router::new().route(
        "/status",
        get(handle_staff_status).fallback(method_not_allowed),
    );

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
