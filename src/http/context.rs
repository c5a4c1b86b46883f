//! Application state shared by every request.

use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::Config;
use crate::login::LoginFlow;
use crate::oauth::IdentityProvider;
use crate::session::SessionCodec;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Session codec holding the signing secret, read only after startup
    pub session_codec: Arc<SessionCodec>,
    pub login_flow: Arc<LoginFlow>,
}

impl AppState {
    /// Wire the codec and login flow from configuration and a provider
    pub fn new(config: Arc<Config>, provider: Arc<dyn IdentityProvider>) -> Self {
        let session_codec = Arc::new(SessionCodec::new(&config.session_signing_secret));
        let login_flow = Arc::new(LoginFlow::new(
            provider,
            session_codec.clone(),
            config.role_mapping.clone(),
            *config.login_minimum_level.as_ref(),
        ));

        Self {
            config,
            session_codec,
            login_flow,
        }
    }
}

impl FromRef<AppState> for Arc<SessionCodec> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session_codec.clone()
    }
}
