//! Staff login flow.
//!
//! `start` issues a fresh OAuth state and the provider URL to send the browser to.
//! `complete` handles the provider callback: it checks the state, exchanges the code,
//! looks up identity and guild membership, resolves the access level and mints a
//! session. Nothing is issued unless every step succeeds.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::access::{AccessLevel, RoleMapping};
use crate::errors::LoginError;
use crate::oauth::{generate_state, provider::IdentityProvider};
use crate::session::{SessionClaims, SessionCodec};

/// Query parameters the provider sends to the callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// A started login attempt
#[derive(Debug)]
pub struct LoginStart {
    pub state: String,
    pub authorization_url: Url,
}

/// Non-sensitive identity for client side display. Never carries roles or level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUser {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

/// Everything the HTTP layer needs to finish a successful login
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
    pub display: DisplayUser,
}

impl IssuedSession {
    /// JSON for the display cookie
    pub fn display_json(&self) -> Result<String, LoginError> {
        serde_json::to_string(&self.display).map_err(|e| LoginError::DisplayEncoding(e.to_string()))
    }
}

pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    session_codec: Arc<SessionCodec>,
    role_mapping: RoleMapping,
    minimum_level: AccessLevel,
}

impl LoginFlow {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        session_codec: Arc<SessionCodec>,
        role_mapping: RoleMapping,
        minimum_level: AccessLevel,
    ) -> Self {
        Self {
            provider,
            session_codec,
            role_mapping,
            minimum_level,
        }
    }

    /// Begin a new attempt. Any earlier pending state is superseded by the caller
    /// overwriting the state cookie.
    pub fn start(&self) -> LoginStart {
        let state = generate_state();
        let authorization_url = self.provider.authorization_url(&state);
        LoginStart {
            state,
            authorization_url,
        }
    }

    /// Finish an attempt from the callback parameters and the stored state value
    pub async fn complete(
        &self,
        params: CallbackParams,
        stored_state: Option<&str>,
    ) -> Result<IssuedSession, LoginError> {
        let presented = params
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(LoginError::StateMismatch("state parameter missing"))?;
        let stored = stored_state
            .filter(|s| !s.is_empty())
            .ok_or(LoginError::StateMismatch("state cookie missing"))?;
        if presented != stored {
            return Err(LoginError::StateMismatch("state does not match cookie"));
        }

        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or_default();
            return Err(LoginError::AuthorizationDenied(format!("{error}: {description}")));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(LoginError::MissingCode)?;

        let access_token = self.provider.exchange_code(&code).await?;
        let identity = self.provider.fetch_identity(&access_token).await?;
        let membership = self.provider.fetch_membership(&identity.id).await?;

        let access_level = self.role_mapping.resolve(&membership.roles);
        if !access_level.satisfies(self.minimum_level) {
            return Err(LoginError::InsufficientRole {
                actual: access_level,
                required: self.minimum_level,
            });
        }

        let claims =
            self.session_codec
                .claims_for(&identity, membership.roles, access_level, Utc::now());
        let token = self.session_codec.create(&claims)?;

        tracing::info!(
            user_id = %claims.user_id,
            access_level = %claims.access_level,
            guild_id = %membership.guild_id,
            "staff session issued"
        );

        Ok(IssuedSession {
            token,
            display: DisplayUser {
                id: identity.id,
                username: identity.username,
                avatar: identity.avatar,
            },
            claims,
        })
    }
}
