//! Form model: field values, validation state and submission status

use crate::fields::{FieldName, FormFields, LoanApplication};
use crate::submission::{SubmissionClient, SubmissionError, FALLBACK_MESSAGE};
use crate::validation::{RuleSet, ValidationResult};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Message shown once an application went through
pub const SUCCESS_MESSAGE: &str = "Your loan application has been submitted successfully!";

const AMOUNT_NOT_A_NUMBER: &str = "Loan amount must be a number";

/// Lifecycle of the current submit attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A request is outstanding
    Submitting,
    /// Last attempt was accepted
    Succeeded,
    /// Last attempt failed with a user-facing message
    Failed(String),
}

impl SubmissionStatus {
    /// True while a request is outstanding
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting)
    }

    /// True in any state from which a new attempt may start
    pub fn is_resting(&self) -> bool {
        !self.is_submitting()
    }
}

/// Result of one call to [`FormModel::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Accepted by the endpoint; fields were reset
    Submitted,
    /// Rejected locally, no request was made
    Invalid(ValidationResult),
    /// Request made but failed; fields retained
    Failed(SubmissionError),
    /// Another attempt is still outstanding; nothing happened
    AlreadySubmitting,
}

#[derive(Debug, Default)]
struct FormState {
    fields: FormFields,
    errors: ValidationResult,
    status: SubmissionStatus,
}

/// Loan application form.
///
/// All methods take `&self`; the state lock is never held across the network
/// call, so concurrent callers observe `Submitting` and are turned away.
pub struct FormModel {
    state: Mutex<FormState>,
    rules: RuleSet,
    client: Arc<dyn SubmissionClient>,
}

impl FormModel {
    /// Form with the canonical rule set
    pub fn new(client: Arc<dyn SubmissionClient>) -> Self {
        Self::with_rules(client, RuleSet::canonical())
    }

    /// Form with a custom rule set
    pub fn with_rules(client: Arc<dyn SubmissionClient>, rules: RuleSet) -> Self {
        Self {
            state: Mutex::new(FormState::default()),
            rules,
            client,
        }
    }

    /// Replace a field by name. Unknown names are ignored.
    pub fn set_field(&self, name: &str, value: impl Into<String>) {
        match name.parse::<FieldName>() {
            Ok(field) => self.set(field, value),
            Err(e) => tracing::debug!("Ignoring edit: {}", e),
        }
    }

    /// Replace a field
    pub fn set(&self, field: FieldName, value: impl Into<String>) {
        self.state.lock().fields.set(field, value);
    }

    /// Snapshot of the field values
    pub fn fields(&self) -> FormFields {
        self.state.lock().fields.clone()
    }

    /// Current submission status
    pub fn status(&self) -> SubmissionStatus {
        self.state.lock().status.clone()
    }

    /// Errors from the most recent validation run
    pub fn errors(&self) -> ValidationResult {
        self.state.lock().errors.clone()
    }

    /// Whether the submit trigger must be disabled
    pub fn is_busy(&self) -> bool {
        self.state.lock().status.is_submitting()
    }

    /// Rules in force
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Validate the current fields from scratch
    pub fn validate(&self) -> ValidationResult {
        let mut state = self.state.lock();
        state.errors = self.rules.validate(&state.fields);
        state.errors.clone()
    }

    /// Run the validate → submit → resolve workflow once
    pub async fn submit(&self) -> SubmissionOutcome {
        let application = {
            let mut state = self.state.lock();
            if state.status.is_submitting() {
                tracing::debug!("Submit ignored, a request is outstanding");
                return SubmissionOutcome::AlreadySubmitting;
            }

            state.errors = self.rules.validate(&state.fields);
            if !state.errors.is_valid() {
                tracing::debug!("Submit blocked by {} validation error(s)", state.errors.len());
                return SubmissionOutcome::Invalid(state.errors.clone());
            }

            // Custom rule sets may leave the amount unchecked
            let Some(application) = LoanApplication::from_fields(&state.fields) else {
                state.errors.record(FieldName::LoanAmount, AMOUNT_NOT_A_NUMBER);
                return SubmissionOutcome::Invalid(state.errors.clone());
            };

            state.status = SubmissionStatus::Submitting;
            application
        };

        let mut in_flight = InFlight { state: &self.state, resolved: false };
        let result = self.client.submit(&application).await;
        in_flight.resolved = true;

        let mut state = self.state.lock();
        match result {
            Ok(()) => {
                state.status = SubmissionStatus::Succeeded;
                state.fields.clear();
                state.errors = ValidationResult::default();
                SubmissionOutcome::Submitted
            }
            Err(err) => {
                state.status = SubmissionStatus::Failed(err.user_message());
                SubmissionOutcome::Failed(err)
            }
        }
    }

    /// Clear fields and errors and return to `Idle`. No-op while submitting.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if state.status.is_submitting() {
            return;
        }
        *state = FormState::default();
    }
}

/// Puts the form back into a resting state if the submit future is dropped
/// before the client answered.
struct InFlight<'a> {
    state: &'a Mutex<FormState>,
    resolved: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        let mut state = self.state.lock();
        if state.status.is_submitting() {
            tracing::warn!("Submit abandoned before the endpoint answered");
            state.status = SubmissionStatus::Failed(FALLBACK_MESSAGE.to_string());
        }
    }
}
