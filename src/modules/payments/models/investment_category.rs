use serde::{Deserialize, Serialize};

/// Investment category a payment is made under
///
/// Closed set: the category drives the domain effect applied at settlement,
/// so an unrecognized value is rejected at parse time rather than silently
/// falling through. `property` and `co-vest` are accepted as legacy aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentCategory {
    /// Outright purchase; the property is marked sold to the payer
    #[serde(rename = "sale", alias = "property")]
    Sale,
    /// Fractional share purchase against an issuable unit count
    #[serde(rename = "shares")]
    Shares,
    /// Joint-venture contribution toward a funding goal
    #[serde(rename = "joint_venture", alias = "joint-venture", alias = "co-vest")]
    JointVenture,
    /// Rent payment; creates a rental window, leaves the property untouched
    #[serde(rename = "rent")]
    Rent,
    /// Flip purchase; same effect as a sale
    #[serde(rename = "flip")]
    Flip,
}

impl InvestmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Shares => "shares",
            Self::JointVenture => "joint_venture",
            Self::Rent => "rent",
            Self::Flip => "flip",
        }
    }
}

impl std::fmt::Display for InvestmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvestmentCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sale" | "property" => Ok(Self::Sale),
            "shares" => Ok(Self::Shares),
            "joint_venture" | "joint-venture" | "co-vest" => Ok(Self::JointVenture),
            "rent" => Ok(Self::Rent),
            "flip" => Ok(Self::Flip),
            _ => Err(format!("Invalid investment category: {}", s)),
        }
    }
}

impl TryFrom<String> for InvestmentCategory {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}
