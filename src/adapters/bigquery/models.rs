//! BigQuery REST v2 request and response bodies

use super::warehouse::{InsertRow, TableDefinition, TableMetadata, TableRef};
use crate::core::tables::TableSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableReference<'a> {
    pub project_id: &'a str,
    pub dataset_id: &'a str,
    pub table_id: &'a str,
}

/// `tables.insert` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableResource<'a> {
    pub table_reference: TableReference<'a>,
    pub description: &'a str,
    pub schema: &'a TableSchema,
}

impl<'a> TableResource<'a> {
    pub fn new(table: &'a TableRef, definition: &'a TableDefinition) -> Self {
        Self {
            table_reference: TableReference {
                project_id: &table.project_id,
                dataset_id: &table.dataset_id,
                table_id: &table.table_id,
            },
            description: &definition.description,
            schema: &definition.schema,
        }
    }
}

/// `tables.get` response, only the fields we read.
/// BigQuery encodes int64 values as JSON strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TableResponse {
    pub description: Option<String>,
    pub num_rows: Option<String>,
    pub creation_time: Option<String>,
}

impl From<TableResponse> for TableMetadata {
    fn from(r: TableResponse) -> Self {
        Self {
            description: r.description,
            num_rows: r.num_rows.and_then(|n| n.parse().ok()),
            creation_time: r.creation_time.and_then(|t| t.parse().ok()),
        }
    }
}

/// `tabledata.insertAll` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertAllRequest<'a> {
    pub kind: &'static str,
    pub skip_invalid_rows: bool,
    pub ignore_unknown_values: bool,
    pub rows: &'a [InsertRow],
}

impl<'a> InsertAllRequest<'a> {
    pub fn new(rows: &'a [InsertRow]) -> Self {
        Self {
            kind: "bigquery#tableDataInsertAllRequest",
            skip_invalid_rows: false,
            ignore_unknown_values: false,
            rows,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct InsertAllResponse {
    pub insert_errors: Vec<RowInsertErrors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RowInsertErrors {
    pub index: u64,
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorProto {
    pub reason: String,
    pub location: String,
    pub message: String,
}

impl InsertAllResponse {
    /// One line per rejected row, e.g. `row 3: invalid (created): ...`
    pub fn summary(&self) -> String {
        self.insert_errors
            .iter()
            .map(|row| {
                let reasons: Vec<String> = row
                    .errors
                    .iter()
                    .map(|e| {
                        if e.location.is_empty() {
                            format!("{}: {}", e.reason, e.message)
                        } else {
                            format!("{} ({}): {}", e.reason, e.location, e.message)
                        }
                    })
                    .collect();
                format!("row {}: {}", row.index, reasons.join("; "))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Google API error envelope
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorBody {
    pub message: String,
}
