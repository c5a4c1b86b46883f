//! Stateless staff session tokens.
//!
//! A session is an HS256 JWT carrying the staff identity, its guild roles and the
//! resolved access level. The token is the only session state; nothing is stored
//! server side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::access::AccessLevel;
use crate::config::SigningSecret;
use crate::errors::SessionError;
use crate::oauth::types::ProviderIdentity;

/// Session lifetime, shared by the `exp` claim and the cookie Max-Age
pub const SESSION_LIFETIME_SECONDS: i64 = 86_400;

/// Claims carried in a staff session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Provider user id
    #[serde(rename = "sub")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub access_level: AccessLevel,
    /// Issued at, seconds since the epoch
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry, seconds since the epoch
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionClaims {
    /// Claims for `identity` valid for `lifetime` from `now`
    pub fn new(
        identity: &ProviderIdentity,
        roles: Vec<String>,
        access_level: AccessLevel,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            user_id: identity.id.clone(),
            username: identity.username.clone(),
            discriminator: identity.discriminator.clone(),
            avatar: identity.avatar.clone(),
            roles,
            access_level,
            issued_at: now.timestamp(),
            expires_at: (now + lifetime).timestamp(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.expires_at
    }
}

/// Signs and verifies session tokens with the server secret
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionCodec {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `verify_at` against the supplied clock, with no leeway.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            lifetime: Duration::seconds(SESSION_LIFETIME_SECONDS),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Build claims for a fresh session starting at `now`
    pub fn claims_for(
        &self,
        identity: &ProviderIdentity,
        roles: Vec<String>,
        access_level: AccessLevel,
        now: DateTime<Utc>,
    ) -> SessionClaims {
        SessionClaims::new(identity, roles, access_level, now, self.lifetime)
    }

    /// Serialize and sign `claims` as `header.payload.signature`
    pub fn create(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token's signature, then its expiry against `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => SessionError::InvalidSignature,
                ErrorKind::ExpiredSignature => SessionError::Expired,
                ErrorKind::InvalidKeyFormat => SessionError::Signing(e.to_string()),
                _ => SessionError::Malformed(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.is_expired_at(now) {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}
