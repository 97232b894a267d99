//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SlackExportConfig;
use super::secret::secret_string;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`SlackExportConfig`]
/// 4. Applies environment variable overrides (`SLACK_EXPORT_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ExportError::Configuration`] if the file is missing or unreadable,
/// a referenced environment variable is unset, the TOML is malformed, or a
/// setting is invalid.
///
/// # Examples
///
/// ```no_run
/// use slack_export::config::load_config;
///
/// let config = load_config("slack-export.toml").expect("Failed to load config");
/// println!("exporting into {}", config.job.dataset);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SlackExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<SlackExportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SlackExportConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`.
/// Comment lines are left untouched; all missing variables are reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, val: &str) -> Result<bool> {
    val.parse()
        .map_err(|_| ExportError::Configuration(format!("{name} must be true or false, got '{val}'")))
}

fn parse_number<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| ExportError::Configuration(format!("{name} must be a number, got '{val}'")))
}

/// Applies environment variable overrides using the `SLACK_EXPORT_` prefix
///
/// Variables follow the pattern `SLACK_EXPORT_<SECTION>_<KEY>`, for example
/// `SLACK_EXPORT_JOB_DATASET` or `SLACK_EXPORT_BIGQUERY_PROJECT_ID`.
fn apply_env_overrides(config: &mut SlackExportConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("SLACK_EXPORT_APPLICATION_SERVICE_NAME") {
        config.application.service_name = val;
    }
    if let Some(val) = var("SLACK_EXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("SLACK_EXPORT_APPLICATION_DEVELOPMENT") {
        config.application.development =
            parse_bool("SLACK_EXPORT_APPLICATION_DEVELOPMENT", &val)?;
    }

    // Slack overrides
    if let Some(val) = var("SLACK_EXPORT_SLACK_TOKEN") {
        config.slack.token = Some(secret_string(val));
    }
    if let Some(val) = var("SLACK_EXPORT_SLACK_API_KEY_SECRET") {
        config.slack.api_key_secret = Some(val);
    }
    if let Some(val) = var("SLACK_EXPORT_SLACK_BASE_URL") {
        config.slack.base_url = val;
    }
    if let Some(val) = var("SLACK_EXPORT_SLACK_PAGE_SIZE") {
        config.slack.page_size = parse_number("SLACK_EXPORT_SLACK_PAGE_SIZE", &val)?;
    }

    // BigQuery overrides
    if let Some(val) = var("SLACK_EXPORT_BIGQUERY_PROJECT_ID") {
        config.bigquery.project_id = val;
    }
    if let Some(val) = var("SLACK_EXPORT_BIGQUERY_BASE_URL") {
        config.bigquery.base_url = val;
    }
    if let Some(val) = var("SLACK_EXPORT_BIGQUERY_ACCESS_TOKEN") {
        config.bigquery.access_token = Some(secret_string(val));
    }

    // Secret Manager overrides
    if let Some(val) = var("SLACK_EXPORT_SECRET_MANAGER_BASE_URL") {
        config.secret_manager.base_url = val;
    }

    // Job overrides
    if let Some(val) = var("SLACK_EXPORT_JOB_ORG") {
        config.job.org = val;
    }
    if let Some(val) = var("SLACK_EXPORT_JOB_DATASET") {
        config.job.dataset = val;
    }
    if let Some(val) = var("SLACK_EXPORT_JOB_DATE") {
        let date = NaiveDate::parse_from_str(&val, "%Y-%m-%d").map_err(|e| {
            ExportError::Configuration(format!(
                "SLACK_EXPORT_JOB_DATE must be YYYY-MM-DD, got '{val}': {e}"
            ))
        })?;
        config.job.date = Some(date);
    }
    if let Some(val) = var("SLACK_EXPORT_JOB_APPEND_ID_SUFFIX") {
        config.job.append_id_suffix = parse_bool("SLACK_EXPORT_JOB_APPEND_ID_SUFFIX", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("SLACK_EXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("SLACK_EXPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("SLACK_EXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
