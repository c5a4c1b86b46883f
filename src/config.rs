//! Environment-based configuration types for guildgate runtime settings.

use anyhow::Result;
use std::time::Duration;
use url::Url;

use crate::access::{AccessLevel, RoleMapping};
use crate::errors::ConfigError;

/// Shortest accepted HMAC signing secret, in bytes
pub const MINIMUM_SIGNING_SECRET_LENGTH: usize = 32;

/// HTTP server port configuration
#[derive(Clone)]
pub struct HttpPort(u16);

/// HTTP client timeout configuration
#[derive(Clone)]
pub struct HttpClientTimeout(Duration);

/// Absolute URL of a provider endpoint
#[derive(Clone)]
pub struct ProviderUrl(Url);

/// Base URL of the provider REST API. Endpoint paths are appended as segments.
#[derive(Clone)]
pub struct ApiBase(Url);

/// Scopes requested during authorization
#[derive(Clone)]
pub struct OAuthScopes(Vec<String>);

/// Secret key for session token signatures
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

/// Where the browser lands after a successful login
#[derive(Clone)]
pub struct LoginRedirectPath(String);

/// Lowest access level allowed to receive a session
#[derive(Clone)]
pub struct LoginMinimumLevel(AccessLevel);

/// Main application configuration
#[derive(Clone)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub http_client_timeout: HttpClientTimeout,
    pub user_agent: String,
    pub discord_client_id: String,
    pub discord_client_secret: String,
    pub discord_redirect_uri: ProviderUrl,
    pub discord_guild_id: String,
    pub discord_bot_token: String,
    pub discord_api_base: ApiBase,
    pub discord_authorize_url: ProviderUrl,
    pub discord_token_url: ProviderUrl,
    pub oauth_scopes: OAuthScopes,
    pub session_signing_secret: SigningSecret,
    pub role_mapping: RoleMapping,
    pub login_redirect_path: LoginRedirectPath,
    pub login_minimum_level: LoginMinimumLevel,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let default_user_agent = format!("guildgate/{}", version()?);
        let http_port: HttpPort = default_env("HTTP_PORT", "8080").try_into()?;
        let http_client_timeout: HttpClientTimeout =
            default_env("HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let user_agent = default_env("USER_AGENT", &default_user_agent);

        let discord_client_id = require_env("DISCORD_CLIENT_ID")?;
        let discord_client_secret = require_env("DISCORD_CLIENT_SECRET")?;
        let discord_redirect_uri: ProviderUrl = require_env("DISCORD_REDIRECT_URI")?.try_into()?;
        let discord_guild_id = require_env("DISCORD_GUILD_ID")?;
        let discord_bot_token = require_env("DISCORD_BOT_TOKEN")?;
        let discord_api_base: ApiBase =
            default_env("DISCORD_API_BASE", "https://discord.com/api/v10").try_into()?;
        let discord_authorize_url: ProviderUrl =
            default_env("DISCORD_AUTHORIZE_URL", "https://discord.com/oauth2/authorize")
                .try_into()?;
        let discord_token_url: ProviderUrl =
            default_env("DISCORD_TOKEN_URL", "https://discord.com/api/oauth2/token").try_into()?;
        let oauth_scopes: OAuthScopes =
            default_env("OAUTH_SCOPES", "identify guilds guilds.members.read").try_into()?;

        // Required, no default.
        let session_signing_secret: SigningSecret = require_env("JWT_SECRET")?.try_into()?;

        let role_mapping = RoleMapping::new(
            optional_env("OWNER_ROLE_ID"),
            optional_env("ADMIN_ROLE_ID"),
            optional_env("MODERATOR_ROLE_ID"),
        );
        let login_redirect_path: LoginRedirectPath =
            default_env("LOGIN_REDIRECT_PATH", "/staff/dashboard").try_into()?;
        let login_minimum_level: LoginMinimumLevel =
            default_env("LOGIN_MINIMUM_LEVEL", "user").try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            http_client_timeout,
            user_agent,
            discord_client_id,
            discord_client_secret,
            discord_redirect_uri,
            discord_guild_id,
            discord_bot_token,
            discord_api_base,
            discord_authorize_url,
            discord_token_url,
            oauth_scopes,
            session_signing_secret,
            role_mapping,
            login_redirect_path,
            login_minimum_level,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::EnvVarRequired(name.to_string()).into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(10)));
        }
        let duration = duration_str::parse(&value)
            .map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))?;
        Ok(Self(duration))
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl TryFrom<String> for ProviderUrl {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let url = Url::parse(&value).map_err(|e| ConfigError::UrlParsingFailed(value, e))?;
        Ok(Self(url))
    }
}

impl AsRef<Url> for ProviderUrl {
    fn as_ref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for ApiBase {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let url =
            Url::parse(&value).map_err(|e| ConfigError::UrlParsingFailed(value.clone(), e))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::UrlNotBase(value).into());
        }
        Ok(Self(url))
    }
}

impl AsRef<Url> for ApiBase {
    fn as_ref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for OAuthScopes {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let scopes = value
            .split_whitespace()
            .map(|s| s.to_string())
            .collect::<Vec<String>>();
        if scopes.is_empty() {
            return Err(ConfigError::ScopesEmpty.into());
        }
        Ok(Self(scopes))
    }
}

impl AsRef<Vec<String>> for OAuthScopes {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl OAuthScopes {
    /// Space separated form used in the authorization URL
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

impl TryFrom<String> for SigningSecret {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let actual = value.len();
        if actual < MINIMUM_SIGNING_SECRET_LENGTH {
            return Err(ConfigError::SigningSecretTooShort {
                minimum: MINIMUM_SIGNING_SECRET_LENGTH,
                actual,
            }
            .into());
        }
        Ok(Self(value.into_bytes()))
    }
}

impl AsRef<[u8]> for SigningSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<String> for LoginRedirectPath {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // "//host" is protocol relative and browsers read "/\host" the same way.
        if !value.starts_with('/') || value.starts_with("//") || value.starts_with("/\\") {
            return Err(ConfigError::RedirectPathInvalid(value).into());
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for LoginRedirectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LoginMinimumLevel {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Self(value.parse::<AccessLevel>()?))
    }
}

impl AsRef<AccessLevel> for LoginMinimumLevel {
    fn as_ref(&self) -> &AccessLevel {
        &self.0
    }
}

/// Configuration with fixed values for unit tests. Provider URLs point at a closed port.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        version: "test".to_string(),
        http_port: "3000".to_string().try_into().unwrap(),
        http_client_timeout: "2s".to_string().try_into().unwrap(),
        user_agent: "guildgate-test".to_string(),
        discord_client_id: "client-123".to_string(),
        discord_client_secret: "client-secret".to_string(),
        discord_redirect_uri: "https://staff.example.com/auth/callback"
            .to_string()
            .try_into()
            .unwrap(),
        discord_guild_id: "guild-1".to_string(),
        discord_bot_token: "bot-token".to_string(),
        discord_api_base: "http://127.0.0.1:9/api/v10".to_string().try_into().unwrap(),
        discord_authorize_url: "https://discord.com/oauth2/authorize"
            .to_string()
            .try_into()
            .unwrap(),
        discord_token_url: "http://127.0.0.1:9/api/oauth2/token"
            .to_string()
            .try_into()
            .unwrap(),
        oauth_scopes: "identify guilds guilds.members.read"
            .to_string()
            .try_into()
            .unwrap(),
        session_signing_secret: "0123456789abcdef0123456789abcdef"
            .to_string()
            .try_into()
            .unwrap(),
        role_mapping: RoleMapping::new(
            Some("role-owner".to_string()),
            Some("role-admin".to_string()),
            Some("role-moderator".to_string()),
        ),
        login_redirect_path: "/staff/dashboard".to_string().try_into().unwrap(),
        login_minimum_level: "user".to_string().try_into().unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_secret_minimum_length() {
        let short = SigningSecret::try_from("your-secret-key".to_string());
        assert!(short.is_err());
        if let Err(e) = short {
            assert!(e.to_string().contains("at least 32 bytes"));
        }

        let empty = SigningSecret::try_from(String::new());
        assert!(empty.is_err(), "empty secret must be rejected");

        let ok = SigningSecret::try_from("x".repeat(MINIMUM_SIGNING_SECRET_LENGTH)).unwrap();
        assert_eq!(ok.as_ref().len(), MINIMUM_SIGNING_SECRET_LENGTH);
    }

    #[test]
    fn test_http_client_timeout_parsing() {
        let timeout = HttpClientTimeout::try_from("5s".to_string()).unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(5));

        let timeout = HttpClientTimeout::try_from("2m".to_string()).unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(120));

        let timeout = HttpClientTimeout::try_from(String::new()).unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(10));

        assert!(HttpClientTimeout::try_from("soon".to_string()).is_err());
    }

    #[test]
    fn test_http_port_parsing() {
        assert_eq!(*HttpPort::try_from("9000".to_string()).unwrap().as_ref(), 9000);
        assert_eq!(*HttpPort::try_from(String::new()).unwrap().as_ref(), 8080);
        assert!(HttpPort::try_from("70000".to_string()).is_err());
    }

    #[test]
    fn test_api_base_must_be_hierarchical() {
        assert!(ApiBase::try_from("https://discord.com/api/v10".to_string()).is_ok());
        assert!(ApiBase::try_from("mailto:staff@example.com".to_string()).is_err());
        assert!(ApiBase::try_from("not a url".to_string()).is_err());
    }

    #[test]
    fn test_oauth_scopes() {
        let scopes = OAuthScopes::try_from("identify  guilds.members.read".to_string()).unwrap();
        assert_eq!(scopes.as_ref().len(), 2);
        assert_eq!(scopes.joined(), "identify guilds.members.read");

        assert!(OAuthScopes::try_from("   ".to_string()).is_err());
    }

    #[test]
    fn test_login_redirect_path_must_be_local() {
        assert!(LoginRedirectPath::try_from("/staff/dashboard".to_string()).is_ok());
        assert!(LoginRedirectPath::try_from("https://evil.example".to_string()).is_err());
        assert!(LoginRedirectPath::try_from("//evil.example".to_string()).is_err());
        assert!(LoginRedirectPath::try_from("/\\evil.example".to_string()).is_err());
        assert!(LoginRedirectPath::try_from("/staff\\dashboard".to_string()).is_ok());
        assert!(LoginRedirectPath::try_from("staff".to_string()).is_err());
    }

    #[test]
    fn test_login_minimum_level_is_strict() {
        let level = LoginMinimumLevel::try_from("moderator".to_string()).unwrap();
        assert_eq!(*level.as_ref(), AccessLevel::Moderator);

        let unknown = LoginMinimumLevel::try_from("staff".to_string());
        assert!(unknown.is_err());
    }
}
