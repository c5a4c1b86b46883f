//! Identity provider abstraction used by the login flow.

use async_trait::async_trait;
use url::Url;

use crate::errors::ProviderError;
use crate::oauth::types::{MembershipRecord, ProviderAccessToken, ProviderIdentity};

/// Trait for the external OAuth provider that proves staff identity
///
/// Each call is a single attempt. Implementations must not retry: a failed step ends
/// the login attempt and the browser restarts from the login endpoint.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the URL the browser is redirected to, carrying `state`
    fn authorization_url(&self, state: &str) -> Url;

    /// Exchange an authorization code for a user access token
    async fn exchange_code(&self, code: &str) -> Result<ProviderAccessToken, ProviderError>;

    /// Fetch the identity the access token belongs to
    async fn fetch_identity(
        &self,
        access_token: &ProviderAccessToken,
    ) -> Result<ProviderIdentity, ProviderError>;

    /// Fetch the identity's roles in the configured guild using the service credential
    ///
    /// Returns [`ProviderError::NotAMember`] when the provider reports the identity is
    /// not in the guild.
    async fn fetch_membership(&self, identity_id: &str)
    -> Result<MembershipRecord, ProviderError>;
}
