use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

/// 302 Found to `location`. `axum::response::Redirect` only offers 303, 307 and 308.
pub(crate) fn found(location: impl Into<String>) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location.into())])
}
