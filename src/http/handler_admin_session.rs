//! Handles GET /api/admin/session - session details for administrators

use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::middleware_auth::RequestIdentity;

/// Handle admin session lookup
/// GET /api/admin/session - Mounted behind the admin access middleware
pub async fn handle_admin_session(identity: RequestIdentity) -> Json<Value> {
    let issued_at = DateTime::<Utc>::from_timestamp(identity.issued_at, 0);
    let expires_at = DateTime::<Utc>::from_timestamp(identity.expires_at, 0);

    Json(json!({
        "user": {
            "id": identity.user_id,
            "username": identity.username,
            "discriminator": identity.discriminator,
            "avatar": identity.avatar,
            "accessLevel": identity.access_level,
            "roles": identity.roles,
        },
        "issuedAt": issued_at.map(|t| t.to_rfc3339()),
        "expiresAt": expires_at.map(|t| t.to_rfc3339()),
    }))
}
