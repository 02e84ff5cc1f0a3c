use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A textual account or flow type that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Kind of account being onboarded. Drives which conditional steps appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Individual,
    Business,
    Hybrid,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [
        AccountType::Individual,
        AccountType::Business,
        AccountType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Individual => "individual",
            AccountType::Business => "business",
            AccountType::Hybrid => "hybrid",
        }
    }
}

/// Which surface a session belongs to. Together with the user id it forms the
/// persistence key of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowType {
    Registration,
    SellerOnboarding,
    VendorKyc,
}

impl FlowType {
    pub const ALL: [FlowType; 3] = [
        FlowType::Registration,
        FlowType::SellerOnboarding,
        FlowType::VendorKyc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Registration => "registration",
            FlowType::SellerOnboarding => "seller-onboarding",
            FlowType::VendorKyc => "vendor-kyc",
        }
    }
}

impl std::fmt::Display for FlowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FlowType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FlowType::ALL
            .into_iter()
            .find(|flow| flow.as_str() == value.trim())
            .ok_or_else(|| UnknownVariant {
                kind: "flow type",
                value: value.to_string(),
            })
    }
}

impl std::str::FromStr for AccountType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AccountType::ALL
            .into_iter()
            .find(|account| account.as_str() == value.trim())
            .ok_or_else(|| UnknownVariant {
                kind: "account type",
                value: value.to_string(),
            })
    }
}
