//! OAuth 2.0 client side of the staff login: state values, the provider abstraction
//! and its Discord implementation.

pub mod discord;
pub mod provider;
pub mod state;
pub mod types;

pub use discord::{DiscordClient, DiscordSettings};
pub use provider::IdentityProvider;
pub use state::{generate_state, generate_token};
pub use types::{MembershipRecord, ProviderAccessToken, ProviderIdentity};
