//! BigQuery adapter
//!
//! [`Warehouse`] is the seam the sink writes through; [`BigQueryClient`] is
//! its REST implementation.

pub mod client;
pub mod models;
pub mod warehouse;

pub use client::BigQueryClient;
pub use warehouse::{InsertRow, TableDefinition, TableMetadata, TableRef, Warehouse};
