//! Staff access levels and the guild role mapping that derives them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Ordered staff tier. Declaration order is the privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AccessLevel {
    User,
    Moderator,
    Admin,
    Owner,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::User => "user",
            AccessLevel::Moderator => "moderator",
            AccessLevel::Admin => "admin",
            AccessLevel::Owner => "owner",
        }
    }

    /// Whether this level meets `required` under `user < moderator < admin < owner`.
    pub fn satisfies(self, required: AccessLevel) -> bool {
        self >= required
    }

    /// Parse a level name, falling back to the lowest rank for anything unrecognized.
    pub fn from_name_or_lowest(name: &str) -> Self {
        name.parse().unwrap_or(AccessLevel::User)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(AccessLevel::User),
            "moderator" => Ok(AccessLevel::Moderator),
            "admin" => Ok(AccessLevel::Admin),
            "owner" => Ok(AccessLevel::Owner),
            _ => Err(ConfigError::UnknownAccessLevel(value.to_string())),
        }
    }
}

// Tokens are decoded through this, so unknown names never elevate.
impl From<String> for AccessLevel {
    fn from(value: String) -> Self {
        AccessLevel::from_name_or_lowest(&value)
    }
}

/// Deployment specific guild role ids for each staff tier.
///
/// A tier without a configured role id cannot be reached through membership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMapping {
    pub owner: Option<String>,
    pub admin: Option<String>,
    pub moderator: Option<String>,
}

impl RoleMapping {
    pub fn new(owner: Option<String>, admin: Option<String>, moderator: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            owner: clean(owner),
            admin: clean(admin),
            moderator: clean(moderator),
        }
    }

    /// Resolve the highest tier whose role id appears in `role_ids`.
    pub fn resolve<S: AsRef<str>>(&self, role_ids: &[S]) -> AccessLevel {
        let tiers = [
            (AccessLevel::Owner, &self.owner),
            (AccessLevel::Admin, &self.admin),
            (AccessLevel::Moderator, &self.moderator),
        ];

        tiers
            .into_iter()
            .find_map(|(level, role_id)| {
                let role_id = role_id.as_deref()?;
                role_ids
                    .iter()
                    .any(|held| held.as_ref() == role_id)
                    .then_some(level)
            })
            .unwrap_or(AccessLevel::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AccessLevel; 4] = [
        AccessLevel::User,
        AccessLevel::Moderator,
        AccessLevel::Admin,
        AccessLevel::Owner,
    ];

    fn mapping() -> RoleMapping {
        RoleMapping::new(
            Some("900".to_string()),
            Some("800".to_string()),
            Some("700".to_string()),
        )
    }

    #[test]
    fn test_every_level_satisfies_user() {
        for level in ALL {
            assert!(level.satisfies(AccessLevel::User), "{level} should satisfy user");
        }
    }

    #[test]
    fn test_owner_satisfies_everything() {
        for level in ALL {
            assert!(AccessLevel::Owner.satisfies(level));
        }
    }

    #[test]
    fn test_user_does_not_satisfy_admin() {
        assert!(!AccessLevel::User.satisfies(AccessLevel::Admin));
        assert!(!AccessLevel::Moderator.satisfies(AccessLevel::Admin));
        assert!(AccessLevel::Admin.satisfies(AccessLevel::Moderator));
    }

    #[test]
    fn test_highest_role_wins() {
        let roles = vec!["700".to_string(), "900".to_string()];
        assert_eq!(mapping().resolve(&roles), AccessLevel::Owner);

        let roles = vec!["123", "700", "800"];
        assert_eq!(mapping().resolve(&roles), AccessLevel::Admin);
    }

    #[test]
    fn test_unmapped_roles_resolve_to_user() {
        assert_eq!(mapping().resolve(&["1", "2"]), AccessLevel::User);
        assert_eq!(mapping().resolve::<&str>(&[]), AccessLevel::User);
    }

    #[test]
    fn test_unconfigured_tier_is_unreachable() {
        let mapping = RoleMapping::new(None, Some("".to_string()), Some("700".to_string()));
        assert_eq!(mapping.admin, None);
        assert_eq!(mapping.resolve(&["", "700"]), AccessLevel::Moderator);
        assert_eq!(mapping.resolve(&[""]), AccessLevel::User);
    }

    #[test]
    fn test_unknown_names_fail_closed() {
        assert_eq!(AccessLevel::from_name_or_lowest("superuser"), AccessLevel::User);
        assert_eq!(AccessLevel::from_name_or_lowest(""), AccessLevel::User);
        assert_eq!(AccessLevel::from_name_or_lowest("Admin"), AccessLevel::Admin);
        assert!("root".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let encoded = serde_json::to_string(&AccessLevel::Moderator).unwrap();
        assert_eq!(encoded, "\"moderator\"");

        let decoded: AccessLevel = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(decoded, AccessLevel::Owner);

        let decoded: AccessLevel = serde_json::from_str("\"god-mode\"").unwrap();
        assert_eq!(decoded, AccessLevel::User);
    }
}
