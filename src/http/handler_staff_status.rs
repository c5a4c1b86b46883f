//! Handles GET /api/staff/status - moderator-only status endpoint

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

use super::middleware_auth::{Authorized, levels::Moderator};

/// Handle staff status
/// GET /api/staff/status - Returns the caller's identity as carried by the session
pub async fn handle_staff_status(authorized: Authorized<Moderator>) -> Json<Value> {
    let identity = authorized.identity;

    Json(json!({
        "success": true,
        "user": {
            "id": identity.user_id,
            "username": identity.username,
            "accessLevel": identity.access_level,
            "roles": identity.roles,
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
