//! Membership tiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MembershipError;

/// The three membership tiers, identified on the wire by their kebab-case
/// ids: `free-jawn`, `pow-wow`, `tribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipTier {
    FreeJawn,
    PowWow,
    Tribe,
}

impl MembershipTier {
    pub const ALL: [MembershipTier; 3] = [Self::FreeJawn, Self::PowWow, Self::Tribe];

    /// Stable id used in storage, routes, and analytics.
    pub fn id(&self) -> &'static str {
        match self {
            Self::FreeJawn => "free-jawn",
            Self::PowWow => "pow-wow",
            Self::Tribe => "tribe",
        }
    }

    /// Human-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FreeJawn => "Free Jawn",
            Self::PowWow => "Pow Wow",
            Self::Tribe => "Tribe",
        }
    }

    /// Free tiers get an anonymous session minted at selection time; paid
    /// tiers go through checkout first.
    pub fn is_free(&self) -> bool {
        matches!(self, Self::FreeJawn)
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for MembershipTier {
    type Err = MembershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free-jawn" => Ok(Self::FreeJawn),
            "pow-wow" => Ok(Self::PowWow),
            "tribe" => Ok(Self::Tribe),
            other => Err(MembershipError::UnknownTier(other.to_string())),
        }
    }
}
