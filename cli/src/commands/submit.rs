//! Submit and validate commands

use super::{CommandError, CommandResult};
use crate::{output::OutputFormat, ApplicationArgs};
use loanapp_client::{
    AppConfig, FieldName, FormFields, FormModel, SubmissionOutcome, SubmissionStatus,
    ValidationResult, SUCCESS_MESSAGE,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SubmitReport {
    status: SubmissionStatus,
    #[serde(skip_serializing_if = "ValidationResult::is_empty")]
    errors: ValidationResult,
}

impl ApplicationArgs {
    fn into_fields(self) -> FormFields {
        let mut fields = FormFields::default();
        fields.set(FieldName::FullName, self.full_name);
        fields.set(FieldName::Email, self.email);
        fields.set(FieldName::Phone, self.phone);
        fields.set(FieldName::LoanAmount, self.amount);
        fields.set(FieldName::LoanPurpose, self.purpose);
        fields
    }
}

fn invalid(errors: &ValidationResult) -> CommandError {
    let fields: Vec<_> = errors.iter().map(|(f, _)| f.as_str()).collect();
    CommandError::Invalid(format!("invalid fields: {}", fields.join(", ")))
}

pub async fn handle(args: ApplicationArgs, settings: &AppConfig, format: OutputFormat) -> CommandResult {
    let client = settings.build_client().map_err(|e| e.to_string())?;
    let form = FormModel::with_rules(client, settings.rules());
    let fields = args.into_fields();
    for field in FieldName::ALL {
        form.set(field, fields.get(field));
    }

    let outcome = form.submit().await;
    format.print(&SubmitReport {
        status: form.status(),
        errors: form.errors(),
    });

    match outcome {
        SubmissionOutcome::Submitted => {
            format.notice(true, SUCCESS_MESSAGE);
            Ok(())
        }
        SubmissionOutcome::Invalid(errors) => Err(invalid(&errors)),
        SubmissionOutcome::Failed(err) => Err(CommandError::Failed(format!(
            "Error submitting form: {}",
            err.user_message()
        ))),
        SubmissionOutcome::AlreadySubmitting => {
            Err(CommandError::Failed("a submission is already in progress".into()))
        }
    }
}

pub fn validate(args: ApplicationArgs, settings: &AppConfig, format: OutputFormat) -> CommandResult {
    let errors = settings.rules().validate(&args.into_fields());
    format.print(&errors);
    if errors.is_valid() {
        format.notice(true, "All fields are valid");
        Ok(())
    } else {
        Err(invalid(&errors))
    }
}
