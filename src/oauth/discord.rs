//! Discord OAuth 2.0 client.
//!
//! Performs the authorization code exchange and reads the user and guild member
//! resources from the Discord REST API.

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use crate::config::Config;
use crate::errors::ProviderError;
use crate::oauth::provider::IdentityProvider;
use crate::oauth::types::{
    DiscordGuildMember, DiscordUser, MembershipRecord, ProviderAccessToken, ProviderIdentity,
    ResponseType, TokenResponse,
};

/// Discord client credentials and endpoints
#[derive(Clone)]
pub struct DiscordSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub guild_id: String,
    pub bot_token: String,
    pub api_base: Url,
    pub authorize_url: Url,
    pub token_url: Url,
    pub scopes: String,
}

impl From<&Config> for DiscordSettings {
    fn from(config: &Config) -> Self {
        Self {
            client_id: config.discord_client_id.clone(),
            client_secret: config.discord_client_secret.clone(),
            redirect_uri: config.discord_redirect_uri.as_ref().clone(),
            guild_id: config.discord_guild_id.clone(),
            bot_token: config.discord_bot_token.clone(),
            api_base: config.discord_api_base.as_ref().clone(),
            authorize_url: config.discord_authorize_url.as_ref().clone(),
            token_url: config.discord_token_url.as_ref().clone(),
            scopes: config.oauth_scopes.joined(),
        }
    }
}

/// Discord implementation of [`IdentityProvider`]
#[derive(Clone)]
pub struct DiscordClient {
    http_client: reqwest::Client,
    settings: DiscordSettings,
}

impl DiscordClient {
    pub fn new(http_client: reqwest::Client, settings: DiscordSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    /// Append path segments to the API base, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.settings.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::InvalidEndpoint(self.settings.api_base.as_str().to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read a failed response body for logging, never for the client
async fn failure_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("status {status}: {body}")
}

#[async_trait]
impl IdentityProvider for DiscordClient {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.settings.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", self.settings.redirect_uri.as_str())
            .append_pair("response_type", ResponseType::Code.as_str())
            .append_pair("scope", &self.settings.scopes)
            .append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderAccessToken, ProviderError> {
        let form = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(self.settings.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::TokenExchange(
                failure_detail(response).await,
            ));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::TokenExchange(format!("malformed response: {e}")))?;

        tracing::debug!(
            token_type = %token_response.token_type,
            scope = ?token_response.scope,
            expires_in = ?token_response.expires_in,
            "exchanged authorization code"
        );

        Ok(token_response.into())
    }

    async fn fetch_identity(
        &self,
        access_token: &ProviderAccessToken,
    ) -> Result<ProviderIdentity, ProviderError> {
        let url = self.endpoint(&["users", "@me"])?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&access_token.token)
            .send()
            .await
            .map_err(|e| ProviderError::IdentityFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::IdentityFetch(
                failure_detail(response).await,
            ));
        }

        let user = response
            .json::<DiscordUser>()
            .await
            .map_err(|e| ProviderError::IdentityFetch(format!("malformed response: {e}")))?;

        Ok(user.into())
    }

    async fn fetch_membership(
        &self,
        identity_id: &str,
    ) -> Result<MembershipRecord, ProviderError> {
        let url = self.endpoint(&["guilds", &self.settings.guild_id, "members", identity_id])?;

        let response = self
            .http_client
            .get(url)
            .header(
                http::header::AUTHORIZATION,
                format!("Bot {}", self.settings.bot_token),
            )
            .send()
            .await
            .map_err(|e| ProviderError::MembershipFetch(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::info!(identity_id, status = %response.status(), "identity is not a guild member");
                return Err(ProviderError::NotAMember);
            }
            _ => {
                return Err(ProviderError::MembershipFetch(
                    failure_detail(response).await,
                ));
            }
        }

        let member = response
            .json::<DiscordGuildMember>()
            .await
            .map_err(|e| ProviderError::MembershipFetch(format!("malformed response: {e}")))?;

        Ok(MembershipRecord {
            guild_id: self.settings.guild_id.clone(),
            roles: member.roles,
        })
    }
}
