//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Slack Export - Slack to BigQuery export job
#[derive(Parser, Debug)]
#[command(name = "slack-export")]
#[command(version, about, long_about = None)]
#[command(author = "Slack Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "slack-export.toml",
        env = "SLACK_EXPORT_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error), overrides application.log_level
    #[arg(short, long, env = "SLACK_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export Slack users, usergroups, channels, channel members and files to BigQuery
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["slack-export", "export"]);
        assert_eq!(cli.config, "slack-export.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["slack-export", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["slack-export", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "slack-export",
            "export",
            "--date",
            "2024-03-05",
            "--org",
            "acme",
            "--dataset",
            "slack_raw",
            "--append-id-suffix",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.date.unwrap().to_string(), "2024-03-05");
        assert_eq!(args.org.as_deref(), Some("acme"));
        assert_eq!(args.dataset.as_deref(), Some("slack_raw"));
        assert!(args.append_id_suffix);
    }

    #[test]
    fn test_cli_rejects_malformed_date() {
        assert!(Cli::try_parse_from(["slack-export", "export", "--date", "05/03/2024"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["slack-export", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
