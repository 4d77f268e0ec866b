use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::task::UnknownVariant;

/// Pricing tier offered on the pricing page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Standard,
    Pro,
    Lifetime,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Self::Standard, Self::Pro, Self::Lifetime];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Pro => "pro",
            Self::Lifetime => "lifetime",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Pro => "Pro",
            Self::Lifetime => "Lifetime",
        }
    }

    /// Recurring plans are billed monthly; lifetime is a one-time payment.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Lifetime)
    }

    /// Path of the checkout-session endpoint for this plan.
    pub fn endpoint_path(&self) -> String {
        format!("/api/create-{}-session", self.id())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Plan {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.id() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
