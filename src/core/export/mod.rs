//! Export orchestration
//!
//! This module provides the core export logic, including:
//! - Run coordination and cancellation ([`ExportCoordinator`])
//! - Table creation and row insertion ([`JobClient`])
//! - Summary and reporting

pub mod coordinator;
pub mod sink;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use sink::{JobClient, JobConfig};
pub use summary::{ExportSummary, RowCounts, WriteStats};
