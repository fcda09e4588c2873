//! Submission client
//!
//! One call to [`SubmissionClient::submit`] makes exactly one outbound
//! request and classifies its result. Retries, backoff and timeouts belong to
//! the HTTP transport.

use crate::fields::LoanApplication;
use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Message used when the server supplies none
pub const FALLBACK_MESSAGE: &str = "Failed to submit application.";

/// Default base URL of the hosted records API
pub const DEFAULT_RECORDS_API_URL: &str = "https://api.airtable.com/v0";

/// Why a submission did not go through
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// No response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("rejected with status {status}: {}", .message.as_deref().unwrap_or(FALLBACK_MESSAGE))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message parsed from the response body, when present
        message: Option<String>,
    },
}

impl SubmissionError {
    /// Message to show the applicant
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Rejected { message: Some(message), .. } => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// HTTP status, if the endpoint answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SubmissionError::Rejected { status, .. } => Some(*status),
            SubmissionError::Transport(_) => None,
        }
    }
}

/// Boundary performing the single outbound request of a submit attempt
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Send the application; `Ok` means the record was accepted
    async fn submit(&self, application: &LoanApplication) -> Result<(), SubmissionError>;
}

/// Pull an error message out of a failure body.
///
/// Accepts `{"error": "text"}` and `{"error": {"message": "text"}}`.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    let error = json.get("error")?;
    let message = match error {
        serde_json::Value::String(s) => s.as_str(),
        other => other.get("message")?.as_str()?,
    };
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Body layout expected by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// The application object itself (proxy endpoint)
    Flat,
    /// Wrapped as `{"fields": {...}}` (records API)
    RecordFields,
}

#[derive(Serialize)]
struct RecordFields<'a> {
    fields: &'a LoanApplication,
}

/// `reqwest`-backed submission client
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    endpoint: Url,
    api_key: Option<String>,
    shape: PayloadShape,
    http: reqwest::Client,
}

impl HttpSubmissionClient {
    /// Client for a proxy endpoint taking the flat payload
    pub fn proxy(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SubmissionError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SubmissionError::Transport(format!("invalid endpoint: {}", e)))?;
        Self::build(endpoint, api_key, PayloadShape::Flat, timeout)
    }

    /// Client talking straight to the records API table
    pub fn records(
        api_url: &str,
        base_id: &str,
        table_name: &str,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, SubmissionError> {
        let endpoint = records_url(api_url, base_id, table_name)?;
        Self::build(endpoint, Some(api_key), PayloadShape::RecordFields, timeout)
    }

    fn build(
        endpoint: Url,
        api_key: Option<String>,
        shape: PayloadShape,
        timeout: Option<Duration>,
    ) -> Result<Self, SubmissionError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(format!("loanapp/{}", crate::VERSION));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        Ok(Self { endpoint, api_key, shape, http })
    }

    /// Endpoint the client posts to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Body layout in use
    pub fn shape(&self) -> PayloadShape {
        self.shape
    }
}

fn records_url(api_url: &str, base_id: &str, table_name: &str) -> Result<Url, SubmissionError> {
    let mut url = Url::parse(api_url)
        .map_err(|e| SubmissionError::Transport(format!("invalid records API url: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| SubmissionError::Transport("records API url cannot be a base".into()))?
        .pop_if_empty()
        .push(base_id)
        .push(table_name);
    Ok(url)
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, application: &LoanApplication) -> Result<(), SubmissionError> {
        let mut request = self.http.post(self.endpoint.clone());
        request = match self.shape {
            PayloadShape::Flat => request.json(application),
            PayloadShape::RecordFields => request.json(&RecordFields { fields: application }),
        };
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::info!("Submitting loan application to {}", self.endpoint);

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Submission transport failure: {}", e);
                return Err(SubmissionError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!("Loan application accepted ({})", status);
            return Ok(());
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::warn!(
            "Loan application rejected ({}): {}",
            status,
            message.as_deref().unwrap_or("no message")
        );

        Err(SubmissionError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
