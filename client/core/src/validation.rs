//! Field validation rules
//!
//! A [`RuleSet`] is an ordered list of pure, field-scoped predicates. Every
//! rule runs on every validation pass; a field that passes all of its rules
//! is absent from the [`ValidationResult`].

use crate::fields::{parse_amount, FieldName, FormFields};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A predicate over one field's value plus the message shown when it fails
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    /// Field the rule inspects
    pub field: FieldName,
    /// Message surfaced when `check` returns false
    pub message: &'static str,
    /// Returns true when the value is acceptable
    pub check: fn(&str) -> bool,
}

impl ValidationRule {
    /// Create a rule
    pub const fn new(field: FieldName, message: &'static str, check: fn(&str) -> bool) -> Self {
        Self { field, message, check }
    }

    /// Apply to a value
    pub fn passes(&self, value: &str) -> bool {
        (self.check)(value)
    }
}

/// Per-field error messages; empty means the form can be submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldName, String>,
}

impl ValidationResult {
    /// True when no field failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error message for a field, if it failed
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Whether a field failed
    pub fn contains(&self, field: FieldName) -> bool {
        self.errors.contains_key(&field)
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Same as [`ValidationResult::is_valid`]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failing fields in form order
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub(crate) fn record(&mut self, field: FieldName, message: &str) {
        self.errors.entry(field).or_insert_with(|| message.to_string());
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.errors.iter().map(|(f, m)| (f.as_str(), m)))
    }
}

/// Ordered collection of validation rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<ValidationRule>,
}

impl RuleSet {
    /// Rules of the loan form, with the loan purpose required
    pub fn canonical() -> Self {
        let mut rules = Self::purpose_optional();
        rules.rules.push(LOAN_PURPOSE_REQUIRED);
        rules
    }

    /// Rules of the loan form, leaving the loan purpose optional
    pub fn purpose_optional() -> Self {
        Self {
            rules: vec![
                ValidationRule::new(FieldName::FullName, "Full name is required", not_blank),
                ValidationRule::new(FieldName::Email, "Invalid email", email_shape),
                ValidationRule::new(FieldName::Phone, "Phone number is required", not_blank),
                ValidationRule::new(
                    FieldName::LoanAmount,
                    "Loan amount must be greater than 0",
                    positive_amount,
                ),
            ],
        }
    }

    /// An empty rule set; everything validates
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Run every rule against the fields. The first failing rule of a field
    /// supplies its message.
    pub fn validate(&self, fields: &FormFields) -> ValidationResult {
        let mut result = ValidationResult::default();
        for rule in &self.rules {
            if !rule.passes(fields.get(rule.field)) {
                result.record(rule.field, rule.message);
            }
        }
        result
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::canonical()
    }
}

const LOAN_PURPOSE_REQUIRED: ValidationRule =
    ValidationRule::new(FieldName::LoanPurpose, "Loan purpose is required", not_blank);

/// Non-empty after trimming whitespace
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// `<non-space>@<non-space>.<non-space>` with a single `@`
pub fn email_shape(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// A finite number strictly greater than zero
pub fn positive_amount(value: &str) -> bool {
    parse_amount(value).is_some_and(|amount| amount > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> FormFields {
        FormFields {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+1234567890".into(),
            loan_amount: "5000".into(),
            loan_purpose: "Car".into(),
        }
    }

    #[test]
    fn test_valid_fields_produce_empty_result() {
        let result = RuleSet::canonical().validate(&valid_fields());
        assert!(result.is_valid());
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_blank_required_fields_are_reported() {
        let mut fields = valid_fields();
        fields.full_name = "   ".into();
        fields.phone = String::new();
        fields.loan_purpose = "\t\n".into();

        let result = RuleSet::canonical().validate(&fields);
        assert_eq!(result.get(FieldName::FullName), Some("Full name is required"));
        assert_eq!(result.get(FieldName::Phone), Some("Phone number is required"));
        assert_eq!(result.get(FieldName::LoanPurpose), Some("Loan purpose is required"));
        assert!(!result.contains(FieldName::Email));
        assert!(!result.contains(FieldName::LoanAmount));
    }

    #[test]
    fn test_all_rules_run_independently() {
        let result = RuleSet::canonical().validate(&FormFields::default());
        assert_eq!(result.len(), 5);
        let order: Vec<_> = result.iter().map(|(f, _)| f).collect();
        assert_eq!(order, FieldName::ALL.to_vec());
    }

    #[test]
    fn test_loan_amount_rule() {
        for bad in ["", "abc", "0", "-5", "0.0", "NaN", "inf", "-inf", "1,000"] {
            assert!(!positive_amount(bad), "{bad:?} should be rejected");
        }
        for good in ["1", "5000", "0.01", " 250 ", "1e3"] {
            assert!(positive_amount(good), "{good:?} should be accepted");
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(email_shape("a@b.c"));
        assert!(email_shape("jane.doe@mail.example.com"));
        for bad in ["", "jane", "jane@example", "@b.c", "a@.c", "a@b.", "a b@c.d", "a@b@c.d"] {
            assert!(!email_shape(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_purpose_optional_rule_set() {
        let mut fields = valid_fields();
        fields.loan_purpose = String::new();

        assert!(RuleSet::purpose_optional().validate(&fields).is_valid());
        assert!(RuleSet::canonical().validate(&fields).contains(FieldName::LoanPurpose));
    }

    #[test]
    fn test_first_failing_rule_message_wins() {
        let rules = RuleSet::canonical().with_rule(ValidationRule::new(
            FieldName::FullName,
            "Name is too short",
            |v| v.trim().len() > 2,
        ));

        let mut fields = valid_fields();
        fields.full_name = String::new();
        assert_eq!(rules.validate(&fields).get(FieldName::FullName), Some("Full name is required"));

        fields.full_name = "Al".into();
        assert_eq!(rules.validate(&fields).get(FieldName::FullName), Some("Name is too short"));
    }

    #[test]
    fn test_result_serializes_by_form_name() {
        let mut fields = valid_fields();
        fields.loan_amount = "-5".into();
        let json = serde_json::to_value(RuleSet::canonical().validate(&fields)).unwrap();
        assert_eq!(json, serde_json::json!({ "loanAmount": "Loan amount must be greater than 0" }));
    }
}
