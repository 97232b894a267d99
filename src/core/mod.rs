//! Core business logic.
//!
//! # Modules
//!
//! - [`tables`] - BigQuery row shapes and schemas, one per exported table
//! - [`export`] - Run orchestration and the warehouse sink
//!
//! # Export Workflow
//!
//! 1. **Create tables**: one dated table per entity, failing if any exists
//! 2. **Users**: fetch every page, insert in one batch
//! 3. **Usergroups**: single listing, one batch
//! 4. **Channels**: per page, insert channels then each channel's members
//! 5. **Files**: per page, one batch
//! 6. **Report**: log the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use slack_export::config::load_config;
//! use slack_export::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("slack-export.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::from_config(&config, shutdown_rx).await?;
//! let summary = coordinator.run().await?;
//!
//! println!("Rows written: {}", summary.rows.total());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod tables;
