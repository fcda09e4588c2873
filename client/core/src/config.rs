//! Client configuration

use crate::platform::{PlatformError, PlatformKind};
use crate::submission::{HttpSubmissionClient, SubmissionClient, SubmissionError, DEFAULT_RECORDS_API_URL};
use crate::validation::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a proxy endpoint nor records API settings are set
    #[error("no submission endpoint configured")]
    MissingEndpoint,
    /// Records API settings lack a required value
    #[error("records API needs {0}")]
    IncompleteRecords(&'static str),
    /// A setting could not be parsed
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Raw value
        value: String,
    },
    /// Forced platform name not recognized
    #[error("platform: {0}")]
    Platform(#[from] PlatformError),
    /// HTTP client could not be built
    #[error("client: {0}")]
    Client(#[from] SubmissionError),
    /// Config file could not be read or written
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Direct records API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// API base URL
    pub api_url: String,
    /// Base identifier
    pub base_id: String,
    /// Table identifier or name
    pub table_name: String,
    /// Bearer key
    pub api_key: String,
}

/// Application configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Proxy endpoint receiving the flat payload
    pub endpoint_url: Option<String>,
    /// Bearer token for the proxy endpoint
    pub api_key: Option<String>,
    /// Talk to the records API instead of the proxy
    pub records: Option<RecordsConfig>,
    /// Whether the loan purpose must be filled in
    pub purpose_required: bool,
    /// Transport timeout; none by default
    pub timeout_secs: Option<u64>,
    /// Force a host platform instead of detecting it
    pub platform: Option<PlatformKind>,
    /// Logging level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_key: None,
            records: None,
            purpose_required: true,
            timeout_secs: None,
            platform: None,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Read from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(k, v)| k.starts_with("LOANAPP_") && !v.trim().is_empty())
            .collect();
        let get = |key: &str| vars.get(key).cloned();

        let mut config = Self {
            endpoint_url: get("LOANAPP_ENDPOINT_URL"),
            api_key: get("LOANAPP_API_KEY"),
            ..Self::default()
        };

        let base_id = get("LOANAPP_RECORDS_BASE_ID");
        let table_name = get("LOANAPP_RECORDS_TABLE");
        let records_key = get("LOANAPP_RECORDS_API_KEY");
        config.records = match (base_id, table_name, records_key) {
            (None, None, None) => None,
            (Some(base_id), Some(table_name), Some(api_key)) => Some(RecordsConfig {
                api_url: get("LOANAPP_RECORDS_API_URL")
                    .unwrap_or_else(|| DEFAULT_RECORDS_API_URL.into()),
                base_id,
                table_name,
                api_key,
            }),
            (None, _, _) => return Err(ConfigError::IncompleteRecords("LOANAPP_RECORDS_BASE_ID")),
            (_, None, _) => return Err(ConfigError::IncompleteRecords("LOANAPP_RECORDS_TABLE")),
            (_, _, None) => return Err(ConfigError::IncompleteRecords("LOANAPP_RECORDS_API_KEY")),
        };

        if let Some(value) = get("LOANAPP_PURPOSE_OPTIONAL") {
            config.purpose_required = !parse_flag("LOANAPP_PURPOSE_OPTIONAL", &value)?;
        }
        if let Some(value) = get("LOANAPP_TIMEOUT_SECS") {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOANAPP_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.timeout_secs = Some(secs);
        }
        if let Some(value) = get("LOANAPP_PLATFORM") {
            config.platform = Some(value.parse()?);
        }
        if let Some(level) = get("LOANAPP_LOG") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Transport timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validation rules selected by this configuration
    pub fn rules(&self) -> RuleSet {
        if self.purpose_required {
            RuleSet::canonical()
        } else {
            RuleSet::purpose_optional()
        }
    }

    /// Build the submission client. The records API wins when configured.
    pub fn build_client(&self) -> Result<Arc<dyn SubmissionClient>, ConfigError> {
        if let Some(records) = &self.records {
            tracing::warn!("Submitting straight to the records API; the key leaves this process");
            let client = HttpSubmissionClient::records(
                &records.api_url,
                &records.base_id,
                &records.table_name,
                records.api_key.clone(),
                self.timeout(),
            )?;
            return Ok(Arc::new(client));
        }

        let endpoint = self.endpoint_url.as_deref().ok_or(ConfigError::MissingEndpoint)?;
        let client = HttpSubmissionClient::proxy(endpoint, self.api_key.clone(), self.timeout())?;
        Ok(Arc::new(client))
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldName;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.purpose_required);
        assert!(config.timeout().is_none());
        assert!(matches!(config.build_client(), Err(ConfigError::MissingEndpoint)));
    }

    #[test]
    fn test_proxy_from_env() {
        let config = AppConfig::from_vars(vars(&[
            ("LOANAPP_ENDPOINT_URL", "https://proxy.test/submit"),
            ("LOANAPP_PURPOSE_OPTIONAL", "true"),
            ("LOANAPP_TIMEOUT_SECS", "15"),
            ("LOANAPP_PLATFORM", "telegram"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url.as_deref(), Some("https://proxy.test/submit"));
        assert!(!config.purpose_required);
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.platform, Some(PlatformKind::Telegram));
        assert!(config.rules().rules().iter().all(|r| r.field != FieldName::LoanPurpose));
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_records_from_env() {
        let config = AppConfig::from_vars(vars(&[
            ("LOANAPP_RECORDS_BASE_ID", "appBase"),
            ("LOANAPP_RECORDS_TABLE", "Applications"),
            ("LOANAPP_RECORDS_API_KEY", "key123"),
        ]))
        .unwrap();

        let records = config.records.clone().unwrap();
        assert_eq!(records.api_url, DEFAULT_RECORDS_API_URL);
        assert_eq!(records.base_id, "appBase");
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_incomplete_records() {
        let err = AppConfig::from_vars(vars(&[
            ("LOANAPP_RECORDS_BASE_ID", "appBase"),
            ("LOANAPP_RECORDS_API_KEY", "key123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteRecords("LOANAPP_RECORDS_TABLE")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_vars(vars(&[("LOANAPP_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidValue { key: "LOANAPP_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            AppConfig::from_vars(vars(&[("LOANAPP_PURPOSE_OPTIONAL", "maybe")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_vars(vars(&[("LOANAPP_PLATFORM", "wechat")])),
            Err(ConfigError::Platform(_))
        ));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("loanapp-config-{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = AppConfig {
            endpoint_url: Some("https://proxy.test".into()),
            purpose_required: false,
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"endpoint_url":"https://proxy.test"}"#).unwrap();
        assert!(config.purpose_required);
        assert_eq!(config.log_level, "info");
    }
}
