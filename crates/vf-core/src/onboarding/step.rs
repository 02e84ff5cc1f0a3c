use serde::{Deserialize, Serialize};

use super::AccountType;

/// Identity of a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Welcome,
    Profile,
    BusinessSetup,
    Preferences,
    Notifications,
    SellerTools,
    Security,
    Completion,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Welcome => "welcome",
            StepId::Profile => "profile",
            StepId::BusinessSetup => "business-setup",
            StepId::Preferences => "preferences",
            StepId::Notifications => "notifications",
            StepId::SellerTools => "seller-tools",
            StepId::Security => "security",
            StepId::Completion => "completion",
        }
    }

    /// Static definition of the step. Account-type applicability is filled in
    /// by the sequencer rule table.
    pub fn definition(self) -> Step {
        let (title, required) = match self {
            StepId::Welcome => ("Welcome", false),
            StepId::Profile => ("Your profile", true),
            StepId::BusinessSetup => ("Business details", true),
            StepId::Preferences => ("Preferences", false),
            StepId::Notifications => ("Notifications", false),
            StepId::SellerTools => ("Seller tools", false),
            StepId::Security => ("Secure your account", true),
            StepId::Completion => ("All set", false),
        };
        Step {
            id: self,
            title,
            required,
            depends_on_account_type: AccountPredicate::Always,
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over the account type deciding whether a step applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountPredicate {
    Always,
    AnyOf(&'static [AccountType]),
}

impl AccountPredicate {
    pub fn matches(&self, account_type: AccountType) -> bool {
        match self {
            AccountPredicate::Always => true,
            AccountPredicate::AnyOf(types) => types.contains(&account_type),
        }
    }
}

/// One discrete, independently validatable unit of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    pub title: &'static str,
    pub required: bool,
    pub depends_on_account_type: AccountPredicate,
}
