//! Configuration schema types

use crate::config::SecretString;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Root configuration, mapping one-to-one onto the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Slack Web API access
    pub slack: SlackConfig,

    /// BigQuery destination
    pub bigquery: BigQueryConfig,

    /// Secret Manager endpoint used to resolve `slack.api_key_secret`
    #[serde(default)]
    pub secret_manager: SecretManagerConfig,

    /// What to export and where
    pub job: JobSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SlackExportConfig {
    /// Validates every section
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.slack.validate()?;
        self.bigquery.validate()?;
        self.secret_manager.validate()?;
        self.job.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Service name attached to every log line
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Human-readable console logs instead of JSON
    #[serde(default)]
    pub development: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.service_name.is_empty() {
            return Err("application.service_name cannot be empty".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            development: false,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err(format!("{section}.retry.max_retries must be > 0"));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!("{section}.retry.backoff_multiplier must be >= 1.0"));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "{section}.retry.initial_delay_ms cannot exceed {section}.retry.max_delay_ms"
            ));
        }
        Ok(())
    }

    /// Delay before the retry following `attempt` failed attempts, capped at `max_delay_ms`
    pub fn delay_ms(&self, attempt: usize) -> u64 {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        (delay as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Slack Web API configuration
///
/// Exactly one of `token` and `api_key_secret` must be set. `api_key_secret` is a
/// Secret Manager version name such as
/// `projects/my-project/secrets/slack-token/versions/latest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot or user token, usually `${SLACK_TOKEN}`
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Secret Manager secret version holding the token
    #[serde(default)]
    pub api_key_secret: Option<String>,

    /// Web API base URL
    #[serde(default = "default_slack_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Items requested per page (`limit`)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl SlackConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let has_token = self
            .token
            .as_ref()
            .map(|t| !t.expose_secret().is_empty())
            .unwrap_or(false);
        let has_secret = self
            .api_key_secret
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false);

        match (has_token, has_secret) {
            (false, false) => {
                return Err("one of slack.token or slack.api_key_secret must be set".to_string())
            }
            (true, true) => {
                return Err(
                    "slack.token and slack.api_key_secret are mutually exclusive".to_string()
                )
            }
            _ => {}
        }

        validate_url("slack.base_url", &self.base_url)?;

        if self.timeout_seconds == 0 {
            return Err("slack.timeout_seconds must be > 0".to_string());
        }

        if !(1..=1000).contains(&self.page_size) {
            return Err("slack.page_size must be between 1 and 1000".to_string());
        }

        self.retry.validate("slack")
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_key_secret: None,
            base_url: default_slack_base_url(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            retry: RetryConfig::default(),
        }
    }
}

/// BigQuery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// Project owning the dataset
    pub project_id: String,

    /// REST API base URL
    #[serde(default = "default_bigquery_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Static OAuth access token. When unset, tokens come from the metadata server.
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Compute metadata server base URL
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Retries of throttled, failed and unreachable requests
    #[serde(default)]
    pub retry: RetryConfig,
}

impl BigQueryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.project_id.is_empty() {
            return Err("bigquery.project_id cannot be empty".to_string());
        }
        validate_url("bigquery.base_url", &self.base_url)?;
        validate_url("bigquery.metadata_url", &self.metadata_url)?;
        if self.timeout_seconds == 0 {
            return Err("bigquery.timeout_seconds must be > 0".to_string());
        }
        self.retry.validate("bigquery")
    }
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            base_url: default_bigquery_base_url(),
            timeout_seconds: default_timeout_seconds(),
            access_token: None,
            metadata_url: default_metadata_url(),
            retry: RetryConfig::default(),
        }
    }
}

/// Secret Manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretManagerConfig {
    /// REST API base URL
    #[serde(default = "default_secret_manager_base_url")]
    pub base_url: String,
}

impl SecretManagerConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("secret_manager.base_url", &self.base_url)
    }
}

impl Default for SecretManagerConfig {
    fn default() -> Self {
        Self {
            base_url: default_secret_manager_base_url(),
        }
    }
}

/// Export job settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSettings {
    /// Organization tag written into users, usergroups and channels rows
    pub org: String,

    /// Destination dataset
    pub dataset: String,

    /// Run date used in table names. Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Suffix every table name with the run id
    #[serde(default)]
    pub append_id_suffix: bool,
}

impl JobSettings {
    fn validate(&self) -> Result<(), String> {
        if self.org.is_empty() {
            return Err("job.org cannot be empty".to_string());
        }
        if self.dataset.is_empty() {
            return Err("job.dataset cannot be empty".to_string());
        }
        // BigQuery dataset ids: letters, digits and underscores
        if !self
            .dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "Invalid job.dataset '{}'. Only letters, digits and underscores are allowed",
                self.dataset
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    let parsed = url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions
fn default_service_name() -> String {
    "slack-export".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_page_size() -> u32 {
    200
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_slack_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_bigquery_base_url() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

fn default_metadata_url() -> String {
    "http://metadata.google.internal/computeMetadata/v1".to_string()
}

fn default_secret_manager_base_url() -> String {
    "https://secretmanager.googleapis.com/v1".to_string()
}

fn default_local_path() -> String {
    "/var/log/slack-export".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
