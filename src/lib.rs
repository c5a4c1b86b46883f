//! Staff login gateway library crate.
//!
//! Authenticates staff through Discord OAuth, maps guild roles to an access level and
//! issues a signed session cookie that gates the staff HTTP endpoints.

pub mod access;
pub mod config;
pub mod errors;
pub mod http;
pub mod login;
pub mod oauth;
pub mod session;
