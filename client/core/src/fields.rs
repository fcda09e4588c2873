//! Form fields and the outbound application payload

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    /// Applicant's full name
    FullName,
    /// Contact email
    Email,
    /// Contact phone number
    Phone,
    /// Requested amount, entered as text
    LoanAmount,
    /// Free-text purpose of the loan
    LoanPurpose,
}

impl FieldName {
    /// All fields in form order
    pub const ALL: [FieldName; 5] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::LoanAmount,
        FieldName::LoanPurpose,
    ];

    /// Form name (camelCase)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FullName => "fullName",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::LoanAmount => "loanAmount",
            FieldName::LoanPurpose => "loanPurpose",
        }
    }

    /// JSON key used on the wire (PascalCase)
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldName::FullName => "FullName",
            FieldName::Email => "Email",
            FieldName::Phone => "Phone",
            FieldName::LoanAmount => "LoanAmount",
            FieldName::LoanPurpose => "LoanPurpose",
        }
    }

    /// Human label
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::FullName => "Full Name",
            FieldName::Email => "Email Address",
            FieldName::Phone => "Phone Number",
            FieldName::LoanAmount => "Loan Amount (USD)",
            FieldName::LoanPurpose => "Purpose of Loan",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s || f.wire_name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Current field values; every field starts empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    /// Applicant's full name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone, optionally with a leading `+`
    pub phone: String,
    /// Requested amount as typed
    pub loan_amount: String,
    /// What the loan is for
    pub loan_purpose: String,
}

impl FormFields {
    /// Value of one field
    pub fn get(&self, name: FieldName) -> &str {
        match name {
            FieldName::FullName => &self.full_name,
            FieldName::Email => &self.email,
            FieldName::Phone => &self.phone,
            FieldName::LoanAmount => &self.loan_amount,
            FieldName::LoanPurpose => &self.loan_purpose,
        }
    }

    /// Replace one field's value
    pub fn set(&mut self, name: FieldName, value: impl Into<String>) {
        let slot = match name {
            FieldName::FullName => &mut self.full_name,
            FieldName::Email => &mut self.email,
            FieldName::Phone => &mut self.phone,
            FieldName::LoanAmount => &mut self.loan_amount,
            FieldName::LoanPurpose => &mut self.loan_purpose,
        };
        *slot = value.into();
    }

    /// Reset every field to the empty string
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when no field holds any text
    pub fn is_empty(&self) -> bool {
        FieldName::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// Parse a loan amount the way the form accepts it
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Payload sent to the remote endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoanApplication {
    /// `FullName`
    pub full_name: String,
    /// `Email`
    pub email: String,
    /// `Phone`
    pub phone: String,
    /// `LoanAmount`, sent as a JSON number
    pub loan_amount: f64,
    /// `LoanPurpose`, possibly empty
    pub loan_purpose: String,
}

impl LoanApplication {
    /// Build the payload from validated fields. String fields are carried
    /// verbatim; `None` when the amount is not a finite number.
    pub fn from_fields(fields: &FormFields) -> Option<Self> {
        Some(Self {
            full_name: fields.full_name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            loan_amount: parse_amount(&fields.loan_amount)?,
            loan_purpose: fields.loan_purpose.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_parses_both_spellings() {
        assert_eq!("fullName".parse::<FieldName>().unwrap(), FieldName::FullName);
        assert_eq!("LoanAmount".parse::<FieldName>().unwrap(), FieldName::LoanAmount);
        assert!("nickname".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_set_replaces_whole_value() {
        let mut fields = FormFields::default();
        assert!(fields.is_empty());

        fields.set(FieldName::Phone, "+1234");
        fields.set(FieldName::Phone, "+5678");
        assert_eq!(fields.get(FieldName::Phone), "+5678");
        assert!(!fields.is_empty());

        fields.clear();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_payload_wire_shape() {
        let fields = FormFields {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+1234567890".into(),
            loan_amount: "5000".into(),
            loan_purpose: "Car".into(),
        };
        let payload = LoanApplication::from_fields(&fields).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["FullName"], "Jane Doe");
        assert_eq!(json["LoanAmount"], 5000.0);
        assert!(json["LoanAmount"].is_number());
        assert_eq!(json["LoanPurpose"], "Car");
    }

    #[test]
    fn test_payload_rejects_non_numeric_amount() {
        let fields = FormFields {
            loan_amount: "lots".into(),
            ..Default::default()
        };
        assert!(LoanApplication::from_fields(&fields).is_none());
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }
}
