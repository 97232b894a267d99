//! Logging and observability
//!
//! Structured logging with:
//! - JSON-formatted console logs, or pretty logs in development
//! - Configurable log levels
//! - Optional local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use slack_export::logging::{init_logging, LogOptions};
//! use slack_export::config::LoggingConfig;
//!
//! let options = LogOptions::new("info", false, "slack-export");
//! let _guard = init_logging(&options, &LoggingConfig::default())
//!     .expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LogOptions, LoggingGuard};
