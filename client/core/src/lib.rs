//! Loan Application Client
//!
//! Form model and submission workflow for the single-page loan application.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     LOAN APPLICATION CLIENT                  │
//! │                                                              │
//! │  ┌──────────────┐   validate   ┌──────────────┐              │
//! │  │  FormModel   │─────────────▶│   RuleSet    │              │
//! │  │  (fields +   │              └──────────────┘              │
//! │  │   status)    │   submit     ┌──────────────────────────┐  │
//! │  │              │─────────────▶│ SubmissionClient (trait) │  │
//! │  └──────────────┘              │  proxy │ records adapter │  │
//! │                                └──────────────────────────┘  │
//! │  ┌──────────────┐              ┌──────────────┐              │
//! │  │  AppConfig   │              │PlatformBridge│              │
//! │  │  (env/file)  │              │ tg │ fb │ web │              │
//! │  └──────────────┘              └──────────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod fields;
pub mod form;
pub mod platform;
pub mod submission;
pub mod validation;

use thiserror::Error;

pub use config::{AppConfig, ConfigError, RecordsConfig};
pub use fields::{FieldName, FormFields, LoanApplication};
pub use form::{FormModel, SubmissionOutcome, SubmissionStatus, SUCCESS_MESSAGE};
pub use platform::{bridge_for, LaunchContext, PlatformBridge, PlatformError, PlatformKind};
pub use submission::{HttpSubmissionClient, SubmissionClient, SubmissionError};
pub use validation::{RuleSet, ValidationResult, ValidationRule};

/// Crate version, sent as part of the user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client error types
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be resolved
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Remote endpoint rejected or never answered
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),
    /// Host platform bridge failed
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;
