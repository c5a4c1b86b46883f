//! Provider facing data types.
//!
//! Wire shapes for the token, user and guild member endpoints, and the provider
//! neutral records the login flow works with.

use serde::{Deserialize, Serialize};

/// OAuth 2.0 Response Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Code,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Code => "code",
        }
    }
}

/// Token endpoint response
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// User access token obtained from the code exchange.
///
/// Only lives for the duration of one callback.
#[derive(Clone)]
pub struct ProviderAccessToken {
    pub token: String,
    pub token_type: String,
}

impl From<TokenResponse> for ProviderAccessToken {
    fn from(value: TokenResponse) -> Self {
        Self {
            token: value.access_token,
            token_type: value.token_type,
        }
    }
}

/// `/users/@me` response
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `/guilds/{guild}/members/{user}` response
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordGuildMember {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Authenticated identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub id: String,
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
}

impl From<DiscordUser> for ProviderIdentity {
    fn from(value: DiscordUser) -> Self {
        Self {
            id: value.id,
            username: value.username,
            discriminator: value.discriminator,
            avatar: value.avatar,
        }
    }
}

/// Role ids an identity holds in the configured guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    pub guild_id: String,
    pub roles: Vec<String>,
}
