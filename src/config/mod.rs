//! Configuration management.
//!
//! The job reads one TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SLACK_EXPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [slack]
//! api_key_secret = "projects/acme-data/secrets/slack-token/versions/latest"
//!
//! [bigquery]
//! project_id = "acme-data"
//!
//! [job]
//! org = "acme"
//! dataset = "slack"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use slack_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("slack-export.toml")?;
//! println!("project: {}", config.bigquery.project_id);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BigQueryConfig, JobSettings, LoggingConfig, RetryConfig,
    SecretManagerConfig, SlackConfig, SlackExportConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
