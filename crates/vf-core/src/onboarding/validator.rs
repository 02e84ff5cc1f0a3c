//! Step field validation.
//!
//! Each step owns a list of composable [`FieldRule`]s. Validation never fails as an
//! `Err`: it yields a field-keyed map of [`ValidationErrorCode`]s, empty when the
//! step is valid. Codes are taxonomy values so the UI can localize messages.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AccountType, FieldData, StepId};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

// Digits only, optional leading '+', after separators are stripped.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    Required,
    InvalidEmail,
    InvalidPhone,
    TooShort,
    Mismatch,
}

impl ValidationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorCode::Required => "required",
            ValidationErrorCode::InvalidEmail => "invalid_email",
            ValidationErrorCode::InvalidPhone => "invalid_phone",
            ValidationErrorCode::TooShort => "too_short",
            ValidationErrorCode::Mismatch => "mismatch",
        }
    }
}

impl std::fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed errors for one step. Empty means valid.
pub type ValidationErrors = BTreeMap<String, ValidationErrorCode>;

/// A single composable validation rule.
///
/// Format rules (`Email`, `Phone`, `MinLength`) only apply when the field is present;
/// pair them with `Required` to make the field mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required(&'static str),
    RequiredFor {
        field: &'static str,
        account_types: &'static [AccountType],
    },
    Email(&'static str),
    Phone(&'static str),
    MinLength {
        field: &'static str,
        min: usize,
    },
    Matches {
        field: &'static str,
        other: &'static str,
    },
}

impl FieldRule {
    fn field(&self) -> &'static str {
        match self {
            FieldRule::Required(field)
            | FieldRule::Email(field)
            | FieldRule::Phone(field)
            | FieldRule::RequiredFor { field, .. }
            | FieldRule::MinLength { field, .. }
            | FieldRule::Matches { field, .. } => field,
        }
    }

    fn check(&self, data: &FieldData, account_type: AccountType) -> Option<ValidationErrorCode> {
        match *self {
            FieldRule::Required(field) => {
                (!is_present(data.get(field))).then_some(ValidationErrorCode::Required)
            }
            FieldRule::RequiredFor {
                field,
                account_types,
            } => (account_types.contains(&account_type) && !is_present(data.get(field)))
                .then_some(ValidationErrorCode::Required),
            FieldRule::Email(field) => text(data, field)
                .filter(|value| !EMAIL_RE.is_match(value))
                .map(|_| ValidationErrorCode::InvalidEmail),
            FieldRule::Phone(field) => text(data, field)
                .filter(|value| !is_valid_phone(value))
                .map(|_| ValidationErrorCode::InvalidPhone),
            FieldRule::MinLength { field, min } => text(data, field)
                .filter(|value| value.chars().count() < min)
                .map(|_| ValidationErrorCode::TooShort),
            FieldRule::Matches { field, other } => {
                if !is_present(data.get(field)) {
                    return Some(ValidationErrorCode::Required);
                }
                (data.get(field) != data.get(other)).then_some(ValidationErrorCode::Mismatch)
            }
        }
    }
}

const PROFILE_RULES: &[FieldRule] = &[
    FieldRule::Required("firstName"),
    FieldRule::Required("lastName"),
    FieldRule::Required("email"),
    FieldRule::Email("email"),
    FieldRule::Phone("phone"),
];

const BUSINESS_SETUP_RULES: &[FieldRule] = &[
    FieldRule::Required("businessName"),
    FieldRule::RequiredFor {
        field: "companyName",
        account_types: &[AccountType::Business],
    },
];

const SELLER_TOOLS_RULES: &[FieldRule] = &[FieldRule::Required("storeName")];

const SECURITY_RULES: &[FieldRule] = &[
    FieldRule::Required("password"),
    FieldRule::MinLength {
        field: "password",
        min: MIN_PASSWORD_LEN,
    },
    FieldRule::Matches {
        field: "confirmPassword",
        other: "password",
    },
];

/// Rules attached to a step. Steps without data collection have none.
pub fn rules_for(step: StepId) -> &'static [FieldRule] {
    match step {
        StepId::Profile => PROFILE_RULES,
        StepId::BusinessSetup => BUSINESS_SETUP_RULES,
        StepId::SellerTools => SELLER_TOOLS_RULES,
        StepId::Security => SECURITY_RULES,
        StepId::Welcome | StepId::Preferences | StepId::Notifications | StepId::Completion => &[],
    }
}

/// Validates step field sets for one account type.
#[derive(Debug, Clone, Copy)]
pub struct StepValidator {
    account_type: AccountType,
}

impl StepValidator {
    pub fn new(account_type: AccountType) -> Self {
        Self { account_type }
    }

    pub fn validate(&self, step: StepId, data: &FieldData) -> ValidationErrors {
        self.validate_rules(rules_for(step), data)
    }

    /// Runs an arbitrary rule list. The first failing rule for a field wins.
    pub fn validate_rules(&self, rules: &[FieldRule], data: &FieldData) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for rule in rules {
            if errors.contains_key(rule.field()) {
                continue;
            }
            if let Some(code) = rule.check(data, self.account_type) {
                errors.insert(rule.field().to_string(), code);
            }
        }
        errors
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn text<'a>(data: &'a FieldData, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Accepts common separators (spaces, dashes, dots, parentheses) around digits.
pub fn is_valid_phone(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&normalized)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}
