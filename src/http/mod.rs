//! Axum HTTP layer: login endpoints, session cookies and the staff access gate.

pub mod context;
pub mod cookies;
mod handler_admin_session;
mod handler_auth_callback;
mod handler_auth_login;
mod handler_auth_logout;
mod handler_staff_status;
pub mod middleware_auth;
pub mod server;
mod utils_response;

pub use context::AppState;
pub use middleware_auth::{
    AccessRequirement, Authorized, RequestIdentity, RequiredLevel, authorize, levels,
    require_access_level,
};
pub use server::build_router;
