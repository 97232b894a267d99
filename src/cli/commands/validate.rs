//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already runs validation, so a load failure covers both
    /// unreadable files and invalid settings.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Service: {}", config.application.service_name);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Slack API: {}", config.slack.base_url);
        println!(
            "  Slack Token: {}",
            if config.slack.token.is_some() {
                "inline".to_string()
            } else {
                format!(
                    "secret {}",
                    config.slack.api_key_secret.as_deref().unwrap_or_default()
                )
            }
        );
        println!("  Page Size: {}", config.slack.page_size);
        println!("  BigQuery Project: {}", config.bigquery.project_id);
        println!("  Dataset: {}", config.job.dataset);
        println!("  Org: {}", config.job.org);
        match config.job.date {
            Some(date) => println!("  Date: {date}"),
            None => println!("  Date: today (UTC)"),
        }
        println!("  Append Run ID: {}", config.job.append_id_suffix);
        println!();
        Ok(0)
    }
}
