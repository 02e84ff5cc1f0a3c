//! Step sequencing.
//!
//! The step list is derived from a declarative rule table: a fixed base sequence
//! plus predicate-guarded insertions. The list is computed once per account type
//! and cached on the sequencer; advance/skip/back never branch on account type.
//!
//! ```text
//! base:   welcome → profile → preferences → notifications → security → completion
//! rules:  business-setup  after  profile   when business | hybrid
//!         seller-tools    before security  when business
//! ```

use serde::Serialize;

use super::{
    AccountPredicate, AccountType, OnboardingSession, Step, StepId, StepValidator,
    ValidationErrors,
};

const BASE_STEPS: [StepId; 6] = [
    StepId::Welcome,
    StepId::Profile,
    StepId::Preferences,
    StepId::Notifications,
    StepId::Security,
    StepId::Completion,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    After(StepId),
    Before(StepId),
}

/// Conditional insertion of a step into the base sequence.
#[derive(Debug, Clone, Copy)]
pub struct StepRule {
    pub step: StepId,
    pub placement: Placement,
    pub when: AccountPredicate,
}

pub const STEP_RULES: &[StepRule] = &[
    StepRule {
        step: StepId::BusinessSetup,
        placement: Placement::After(StepId::Profile),
        when: AccountPredicate::AnyOf(&[AccountType::Business, AccountType::Hybrid]),
    },
    StepRule {
        step: StepId::SellerTools,
        placement: Placement::Before(StepId::Security),
        when: AccountPredicate::AnyOf(&[AccountType::Business]),
    },
];

/// Completion summary for progress indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

/// Computes the step list for an account type and enforces advance/skip rules.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    account_type: AccountType,
    steps: Vec<Step>,
}

impl StepSequencer {
    pub fn for_account(account_type: AccountType) -> Self {
        Self {
            account_type,
            steps: Self::compute_steps(account_type),
        }
    }

    /// Evaluates the rule table for `account_type`.
    pub fn compute_steps(account_type: AccountType) -> Vec<Step> {
        let mut steps: Vec<Step> = BASE_STEPS.iter().map(|id| id.definition()).collect();

        for rule in STEP_RULES {
            if !rule.when.matches(account_type) {
                continue;
            }
            let anchor = match rule.placement {
                Placement::After(id) | Placement::Before(id) => id,
            };
            let Some(position) = steps.iter().position(|step| step.id == anchor) else {
                continue;
            };
            let index = match rule.placement {
                Placement::After(_) => position + 1,
                Placement::Before(_) => position,
            };
            let mut step = rule.step.definition();
            step.depends_on_account_type = rule.when;
            steps.insert(index, step);
        }

        steps
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn validator(&self) -> StepValidator {
        StepValidator::new(self.account_type)
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn position_of(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn current_step(&self, session: &OnboardingSession) -> Step {
        let index = session.current_step_index().min(self.last_index());
        self.steps[index]
    }

    pub fn is_terminal(&self, session: &OnboardingSession) -> bool {
        session.current_step_index() >= self.last_index()
    }

    /// Validator errors for the current step's field set.
    pub fn current_errors(&self, session: &OnboardingSession) -> ValidationErrors {
        let step = self.current_step(session);
        self.validator().validate(step.id, session.field_data())
    }

    pub fn can_advance(&self, session: &OnboardingSession) -> bool {
        let step = self.current_step(session);
        !step.required || self.current_errors(session).is_empty()
    }

    /// Marks the current step completed and moves forward. No-op when the step is
    /// required and invalid; callers surface [`Self::current_errors`] in that case.
    pub fn advance(&self, mut session: OnboardingSession) -> OnboardingSession {
        if !self.can_advance(&session) {
            return session;
        }
        self.step_forward(&mut session);
        session
    }

    /// Moves past an optional step without validation. No-op on required steps.
    pub fn skip(&self, mut session: OnboardingSession) -> OnboardingSession {
        if self.current_step(&session).required {
            return session;
        }
        self.step_forward(&mut session);
        session
    }

    /// Explicit backward navigation. Completed steps stay completed.
    pub fn back(&self, mut session: OnboardingSession) -> OnboardingSession {
        let index = session
            .current_step_index()
            .min(self.last_index())
            .saturating_sub(1);
        session.set_current_step_index(index);
        session
    }

    /// Switches the account type, recomputing the step list once.
    ///
    /// The session stays on the same step when it still exists, otherwise on
    /// the next step of the old list that survives. It is then pulled back to
    /// the first required step before that position which was never completed,
    /// so a switch can never jump over newly inserted required steps.
    pub fn change_account_type(
        &mut self,
        mut session: OnboardingSession,
        account_type: AccountType,
    ) -> OnboardingSession {
        if account_type == self.account_type && session.account_type() == account_type {
            return session;
        }
        let old_index = session.current_step_index().min(self.last_index());
        let old_steps = std::mem::replace(&mut self.steps, Self::compute_steps(account_type));
        self.account_type = account_type;

        let target = old_steps[old_index..]
            .iter()
            .find_map(|step| self.position_of(step.id))
            .unwrap_or_else(|| self.last_index());
        let index = self.first_open_required_before(&session, target).unwrap_or(target);

        session.set_account_type(account_type);
        session.set_current_step_index(index);
        session
    }

    fn first_open_required_before(&self, session: &OnboardingSession, end: usize) -> Option<usize> {
        self.steps[..end]
            .iter()
            .position(|step| step.required && !session.is_step_completed(step.id))
    }

    pub fn progress(&self, session: &OnboardingSession) -> StepProgress {
        let total = self.steps.len();
        let completed = self
            .steps
            .iter()
            .filter(|step| session.is_step_completed(step.id))
            .count();
        let percent = if total == 0 {
            0
        } else {
            ((completed * 100) / total) as u8
        };
        StepProgress {
            completed,
            total,
            percent,
        }
    }

    fn step_forward(&self, session: &mut OnboardingSession) {
        let step = self.current_step(session);
        session.mark_completed(step.id);
        let next = (session.current_step_index() + 1).min(self.last_index());
        session.set_current_step_index(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::onboarding::{FlowType, ValidationErrorCode};
    use chrono::Utc;
    use serde_json::json;

    fn ids(account_type: AccountType) -> Vec<StepId> {
        StepSequencer::compute_steps(account_type)
            .iter()
            .map(|step| step.id)
            .collect()
    }

    fn session(account_type: AccountType) -> OnboardingSession {
        OnboardingSession::new(
            UserId::from("user-1"),
            FlowType::Registration,
            account_type,
            Utc::now(),
        )
    }

    #[test]
    fn compute_steps_honours_conditional_rules_for_every_account_type() {
        for account_type in AccountType::ALL {
            let steps = ids(account_type);
            assert!(steps.contains(&StepId::Security), "{account_type}");
            assert_eq!(steps.last(), Some(&StepId::Completion), "{account_type}");
            assert_eq!(
                steps.contains(&StepId::BusinessSetup),
                account_type != AccountType::Individual,
                "{account_type}"
            );
            assert_eq!(
                steps.contains(&StepId::SellerTools),
                account_type == AccountType::Business,
                "{account_type}"
            );
        }
    }

    #[test]
    fn conditional_steps_are_inserted_at_their_anchors() {
        assert_eq!(
            ids(AccountType::Business),
            vec![
                StepId::Welcome,
                StepId::Profile,
                StepId::BusinessSetup,
                StepId::Preferences,
                StepId::Notifications,
                StepId::SellerTools,
                StepId::Security,
                StepId::Completion,
            ]
        );
        assert_eq!(
            ids(AccountType::Individual),
            BASE_STEPS.to_vec()
        );
    }

    #[test]
    fn business_setup_without_business_name_blocks_advance() {
        let sequencer = StepSequencer::for_account(AccountType::Business);
        let mut session = session(AccountType::Business);
        session.set_current_step_index(sequencer.position_of(StepId::BusinessSetup).unwrap());

        assert!(!sequencer.can_advance(&session));
        let errors = sequencer.current_errors(&session);
        assert_eq!(
            errors.get("businessName"),
            Some(&ValidationErrorCode::Required)
        );

        let after = sequencer.advance(session.clone());
        assert_eq!(after, session, "invalid required step must not advance");
    }

    #[test]
    fn advance_marks_completed_and_moves_forward() {
        let sequencer = StepSequencer::for_account(AccountType::Individual);
        let session = sequencer.advance(session(AccountType::Individual));

        assert_eq!(session.current_step_index(), 1);
        assert!(session.is_step_completed(StepId::Welcome));
    }

    #[test]
    fn skip_is_refused_on_required_steps() {
        let sequencer = StepSequencer::for_account(AccountType::Individual);
        let session = sequencer.advance(session(AccountType::Individual));
        assert_eq!(sequencer.current_step(&session).id, StepId::Profile);

        let skipped = sequencer.skip(session.clone());
        assert_eq!(skipped.current_step_index(), session.current_step_index());
    }

    #[test]
    fn advance_clamps_at_terminal_step() {
        let sequencer = StepSequencer::for_account(AccountType::Individual);
        let mut session = session(AccountType::Individual);
        session.set_current_step_index(sequencer.last_index());

        let session = sequencer.advance(session);
        assert_eq!(session.current_step_index(), sequencer.last_index());
        assert!(session.is_step_completed(StepId::Completion));
        assert!(sequencer.is_terminal(&session));
    }

    #[test]
    fn back_keeps_completed_steps() {
        let sequencer = StepSequencer::for_account(AccountType::Individual);
        let session = sequencer.advance(session(AccountType::Individual));
        let session = sequencer.back(session);

        assert_eq!(session.current_step_index(), 0);
        assert!(session.is_step_completed(StepId::Welcome));
        assert_eq!(sequencer.back(session).current_step_index(), 0);
    }

    fn completed_through(
        sequencer: &StepSequencer,
        account_type: AccountType,
        stop_at: StepId,
    ) -> OnboardingSession {
        let mut session = session(account_type);
        for step in sequencer.steps() {
            if step.id == stop_at {
                break;
            }
            session.mark_completed(step.id);
        }
        session.set_current_step_index(sequencer.position_of(stop_at).unwrap());
        session
    }

    #[test]
    fn changing_account_type_keeps_current_step_when_nothing_new_is_required() {
        let mut sequencer = StepSequencer::for_account(AccountType::Business);
        let session = completed_through(&sequencer, AccountType::Business, StepId::Notifications);

        let session = sequencer.change_account_type(session, AccountType::Hybrid);

        assert_eq!(session.account_type(), AccountType::Hybrid);
        assert_eq!(sequencer.current_step(&session).id, StepId::Notifications);
    }

    #[test]
    fn switch_to_business_returns_to_uncompleted_business_setup() {
        let mut sequencer = StepSequencer::for_account(AccountType::Individual);
        let session = completed_through(&sequencer, AccountType::Individual, StepId::Security);

        let session = sequencer.change_account_type(session, AccountType::Business);

        assert_eq!(session.account_type(), AccountType::Business);
        assert_eq!(sequencer.current_step(&session).id, StepId::BusinessSetup);
        assert!(sequencer.position_of(StepId::SellerTools).is_some());
        assert!(!sequencer.is_terminal(&session));
    }

    #[test]
    fn removed_current_step_lands_on_next_surviving_step() {
        let mut sequencer = StepSequencer::for_account(AccountType::Business);
        let session = completed_through(&sequencer, AccountType::Business, StepId::SellerTools);

        let session = sequencer.change_account_type(session, AccountType::Individual);

        assert_eq!(sequencer.current_step(&session).id, StepId::Security);
        assert!(!session.is_step_completed(StepId::Security));
        assert!(!sequencer.is_terminal(&session));
    }

    #[test]
    fn account_switch_never_passes_an_uncompleted_required_step() {
        for from in AccountType::ALL {
            for to in AccountType::ALL {
                for stop_at in ids(from) {
                    let mut sequencer = StepSequencer::for_account(from);
                    let session = completed_through(&sequencer, from, stop_at);

                    let session = sequencer.change_account_type(session, to);

                    let skipped = sequencer.steps()[..session.current_step_index()]
                        .iter()
                        .find(|step| step.required && !session.is_step_completed(step.id));
                    assert!(skipped.is_none(), "{from} -> {to} at {stop_at}: skipped {skipped:?}");
                }
            }
        }
    }

    #[test]
    fn progress_counts_completed_steps() {
        let sequencer = StepSequencer::for_account(AccountType::Individual);
        let mut session = session(AccountType::Individual);
        session.set_field("firstName", json!("Ada"), Utc::now());
        let session = sequencer.advance(session);

        let progress = sequencer.progress(&session);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 6);
        assert_eq!(progress.percent, 16);
    }
}
