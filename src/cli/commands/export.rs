//! Export command implementation
//!
//! Exit codes: 0 on success, 2 for configuration errors, 4 when the clients
//! cannot be initialized, 5 when the run fails, 130 when it is interrupted.

use crate::config::{load_config, SlackExportConfig};
use crate::core::export::{ExportCoordinator, ExportSummary};
use chrono::NaiveDate;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Date suffix of the destination tables (YYYY-MM-DD), defaults to today in UTC
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Override the organization name written to each row
    #[arg(long)]
    pub org: Option<String>,

    /// Override the destination dataset
    #[arg(long)]
    pub dataset: Option<String>,

    /// Append the run id to every table name
    #[arg(long)]
    pub append_id_suffix: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{value}' (expected YYYY-MM-DD): {e}"))
}

impl ExportArgs {
    /// Applies the command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut SlackExportConfig) {
        if let Some(date) = self.date {
            tracing::info!(date = %date, "Overriding export date from CLI");
            config.job.date = Some(date);
        }
        if let Some(org) = &self.org {
            tracing::info!(org = %org, "Overriding org from CLI");
            config.job.org = org.clone();
        }
        if let Some(dataset) = &self.dataset {
            tracing::info!(dataset = %dataset, "Overriding dataset from CLI");
            config.job.dataset = dataset.clone();
        }
        if self.append_id_suffix {
            config.job.append_id_suffix = true;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply(&mut config);
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        tracing::info!("Creating export coordinator");
        let coordinator = match ExportCoordinator::from_config(&config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) if e.is_cancelled() => {
                tracing::warn!("Export interrupted during initialization");
                eprintln!("Export interrupted by shutdown signal");
                return Ok(130);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        let job = coordinator.job();
        println!(
            "Starting export run {} into {}.{} for {}",
            job.run_id, job.project_id, job.dataset, job.date
        );

        match coordinator.run().await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) if e.is_cancelled() => {
                tracing::warn!("Export interrupted");
                eprintln!("Export interrupted by shutdown signal");
                Ok(130)
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                Ok(5)
            }
        }
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("Export Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Date: {}", summary.date);
    println!("  Tables Created: {}", summary.tables_created);
    println!("  Insert Calls: {}", summary.insert_calls);
    println!("  Users: {}", summary.rows.users);
    println!("  Usergroups: {}", summary.rows.usergroups);
    println!("  Channels: {}", summary.rows.channels);
    println!("  Channel Members: {}", summary.rows.channel_members);
    println!("  Files: {}", summary.rows.files);
    println!("  Total Rows: {}", summary.rows.total());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("20240305").is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = SlackExportConfig {
            application: Default::default(),
            slack: Default::default(),
            bigquery: Default::default(),
            secret_manager: Default::default(),
            job: Default::default(),
            logging: Default::default(),
        };
        let args = ExportArgs {
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            org: Some("acme".to_string()),
            dataset: None,
            append_id_suffix: true,
        };
        config.job.dataset = "slack".to_string();

        args.apply(&mut config);

        assert_eq!(config.job.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(config.job.org, "acme");
        assert_eq!(config.job.dataset, "slack");
        assert!(config.job.append_id_suffix);
    }
}
