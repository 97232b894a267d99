//! Warehouse trait definition
//!
//! The sink talks to the destination through [`Warehouse`] so the export flow
//! can be exercised against an in-memory implementation.

use crate::core::tables::TableSchema;
use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Fully qualified table location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

/// Renders the `project:dataset.table` form used in error messages
impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// Schema and description of a table to create
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub description: String,
    pub schema: TableSchema,
}

/// Metadata of an existing table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMetadata {
    pub description: Option<String>,
    pub num_rows: Option<u64>,
    pub creation_time: Option<i64>,
}

/// One row of a streaming insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertRow {
    #[serde(rename = "insertId")]
    pub insert_id: String,
    pub json: serde_json::Value,
}

/// Destination warehouse operations
///
/// `table_metadata` must fail with
/// [`WarehouseError::TableNotFound`](crate::domain::WarehouseError::TableNotFound)
/// when the table does not exist, and only then.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Looks up an existing table
    async fn table_metadata(&self, table: &TableRef) -> Result<TableMetadata>;

    /// Creates a table
    async fn create_table(&self, table: &TableRef, definition: &TableDefinition) -> Result<()>;

    /// Streams rows into a table in one call
    async fn insert_rows(&self, table: &TableRef, rows: Vec<InsertRow>) -> Result<()>;
}
