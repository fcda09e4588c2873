//! CLI Configuration

use crate::Cli;
use loanapp_client::{AppConfig, PlatformKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Profile stored under `~/.loanapp`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub records_api_url: Option<String>,
    pub records_base_id: Option<String>,
    pub records_table: Option<String>,
    pub records_api_key: Option<String>,
    pub purpose_optional: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub platform: Option<String>,
    pub log_level: Option<String>,
}

/// Keys accepted by `config set/get`
pub const KEYS: [&str; 10] = [
    "endpoint_url",
    "api_key",
    "records_api_url",
    "records_base_id",
    "records_table",
    "records_api_key",
    "purpose_optional",
    "timeout_secs",
    "platform",
    "log_level",
];

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self, String> {
        let path = Self::config_path(profile)?;
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            toml::from_str(&content).map_err(|e| e.to_string())
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, String> {
        let path = Self::config_path(profile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, content).map_err(|e| e.to_string())?;
        Ok(path)
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Cannot find home directory")?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".loanapp").join(filename))
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        match key {
            "endpoint_url" => self.endpoint_url = Some(value),
            "api_key" => self.api_key = Some(value),
            "records_api_url" => self.records_api_url = Some(value),
            "records_base_id" => self.records_base_id = Some(value),
            "records_table" => self.records_table = Some(value),
            "records_api_key" => self.records_api_key = Some(value),
            "purpose_optional" => {
                let flag = value
                    .parse()
                    .map_err(|_| format!("purpose_optional must be true or false, got {}", value))?;
                self.purpose_optional = Some(flag);
            }
            "timeout_secs" => {
                let secs = value
                    .parse()
                    .map_err(|_| format!("timeout_secs must be a whole number, got {}", value))?;
                self.timeout_secs = Some(secs);
            }
            "platform" => {
                value.parse::<PlatformKind>().map_err(|e| e.to_string())?;
                self.platform = Some(value);
            }
            "log_level" => self.log_level = Some(value),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Value for display; keys are masked
    pub fn get(&self, key: &str) -> Result<Option<String>, String> {
        let value = match key {
            "endpoint_url" => self.endpoint_url.clone(),
            "api_key" => self.api_key.as_deref().map(mask),
            "records_api_url" => self.records_api_url.clone(),
            "records_base_id" => self.records_base_id.clone(),
            "records_table" => self.records_table.clone(),
            "records_api_key" => self.records_api_key.as_deref().map(mask),
            "purpose_optional" => self.purpose_optional.map(|b| b.to_string()),
            "timeout_secs" => self.timeout_secs.map(|s| s.to_string()),
            "platform" => self.platform.clone(),
            "log_level" => self.log_level.clone(),
            _ => return Err(format!("Unknown config key: {}", key)),
        };
        Ok(value)
    }

    /// Merge this profile, the `LOANAPP_*` environment and the command line
    /// flags, in increasing order of precedence.
    pub fn resolve(&self, cli: &Cli) -> Result<AppConfig, String> {
        self.merge(cli, std::env::vars())
    }

    fn merge<I>(&self, cli: &Cli, env: I) -> Result<AppConfig, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = self.as_vars().into_iter().collect();
        vars.extend(env.into_iter().filter(|(_, v)| !v.trim().is_empty()));
        let mut app = AppConfig::from_vars(vars).map_err(|e| e.to_string())?;

        if let Some(url) = &cli.endpoint_url {
            app.endpoint_url = Some(url.clone());
        }
        if let Some(key) = &cli.api_key {
            app.api_key = Some(key.clone());
        }
        if cli.purpose_optional {
            app.purpose_required = false;
        }
        if let Some(secs) = cli.timeout {
            app.timeout_secs = Some(secs);
        }

        Ok(app)
    }

    /// Profile values under their environment variable names
    fn as_vars(&self) -> Vec<(String, String)> {
        let pairs = [
            ("LOANAPP_ENDPOINT_URL", self.endpoint_url.clone()),
            ("LOANAPP_API_KEY", self.api_key.clone()),
            ("LOANAPP_RECORDS_API_URL", self.records_api_url.clone()),
            ("LOANAPP_RECORDS_BASE_ID", self.records_base_id.clone()),
            ("LOANAPP_RECORDS_TABLE", self.records_table.clone()),
            ("LOANAPP_RECORDS_API_KEY", self.records_api_key.clone()),
            ("LOANAPP_PURPOSE_OPTIONAL", self.purpose_optional.map(|b| b.to_string())),
            ("LOANAPP_TIMEOUT_SECS", self.timeout_secs.map(|s| s.to_string())),
            ("LOANAPP_PLATFORM", self.platform.clone()),
            ("LOANAPP_LOG", self.log_level.clone()),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
            .collect()
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(8).collect();
    format!("{}****", visible)
}
