// Slack Export - Slack to BigQuery export job
// Copyright (c) 2025 Slack Export Contributors
// Licensed under the MIT License

//! # Slack Export
//!
//! A batch job that snapshots a Slack workspace into date-suffixed BigQuery
//! tables: users, usergroups, channels, channel members and files.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Table row shapes and run orchestration
//! - [`adapters`] - Slack Web API, BigQuery and Google Cloud integrations
//! - [`domain`] - Slack record types, run identity and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slack_export::config::load_config;
//! use slack_export::core::export::ExportCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("slack-export.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = ExportCoordinator::from_config(&config, shutdown_rx).await?;
//!     let summary = coordinator.run().await?;
//!
//!     println!("Exported {} rows", summary.rows.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! Every run creates five tables named `<entity>_<YYYYMMDD>`, optionally
//! suffixed with the run id. A run never writes into a table it did not
//! create: a pre-existing table fails the run before any data is fetched.
//!
//! ## Error Handling
//!
//! Failures carry the path of stages they crossed:
//!
//! ```text
//! export channels: list channels: put channels: insert into ... rejected 1 row(s): ...
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
