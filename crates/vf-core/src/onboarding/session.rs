use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AccountType, FlowType, StepId};
use crate::ids::UserId;

/// Field values collected across all steps, keyed by field name.
pub type FieldData = BTreeMap<String, Value>;

/// In-flight onboarding progress of one user for one flow.
///
/// Step position and completion are only changed through [`super::StepSequencer`];
/// field values are written by the UI through [`OnboardingSession::set_field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSession {
    user_id: UserId,
    flow_type: FlowType,
    account_type: AccountType,
    current_step_index: usize,
    completed_step_ids: BTreeSet<StepId>,
    #[serde(default)]
    field_data: FieldData,
    last_activity_at: DateTime<Utc>,
}

impl OnboardingSession {
    pub fn new(
        user_id: UserId,
        flow_type: FlowType,
        account_type: AccountType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            flow_type,
            account_type,
            current_step_index: 0,
            completed_step_ids: BTreeSet::new(),
            field_data: FieldData::new(),
            last_activity_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow_type
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<StepId> {
        &self.completed_step_ids
    }

    pub fn is_step_completed(&self, step: StepId) -> bool {
        self.completed_step_ids.contains(&step)
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.field_data.get(name)
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    /// Writes a field value. Returns `true` when the stored value changed.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value, now: DateTime<Utc>) -> bool {
        self.last_activity_at = now;
        let name = name.into();
        if self.field_data.get(&name) == Some(&value) {
            return false;
        }
        self.field_data.insert(name, value);
        true
    }

    /// Removes a field value. Returns `true` when a value was present.
    pub fn clear_field(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        self.last_activity_at = now;
        self.field_data.remove(name).is_some()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
    }

    pub(crate) fn set_account_type(&mut self, account_type: AccountType) {
        self.account_type = account_type;
    }

    pub(crate) fn set_current_step_index(&mut self, index: usize) {
        self.current_step_index = index;
    }

    pub(crate) fn mark_completed(&mut self, step: StepId) {
        self.completed_step_ids.insert(step);
    }
}
