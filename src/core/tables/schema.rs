//! Declarative warehouse table schemas
//!
//! Each row type declares its columns explicitly instead of deriving them at
//! runtime. The types serialize to the BigQuery `TableSchema` JSON shape
//! (`{"fields": [{"name", "type", "mode", "fields"}]}`), so the wire format of a
//! schema can be asserted directly in tests.

use serde::Serialize;

/// Column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Datetime,
    Record,
}

/// Column mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Nullable,
    Required,
    Repeated,
}

/// One column, possibly a nested record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    /// A required scalar column
    pub fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            mode: FieldMode::Required,
            fields: Vec::new(),
        }
    }

    /// A repeated scalar column
    pub fn repeated(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            mode: FieldMode::Repeated,
            fields: Vec::new(),
        }
    }

    /// A required nested record
    pub fn record(name: &'static str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name,
            field_type: FieldType::Record,
            mode: FieldMode::Required,
            fields,
        }
    }

    /// A repeated nested record
    pub fn repeated_record(name: &'static str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name,
            field_type: FieldType::Record,
            mode: FieldMode::Repeated,
            fields,
        }
    }
}

/// Shorthand for a required STRING column
pub(crate) fn string(name: &'static str) -> FieldSchema {
    FieldSchema::required(name, FieldType::String)
}

/// Shorthand for a required INTEGER column
pub(crate) fn integer(name: &'static str) -> FieldSchema {
    FieldSchema::required(name, FieldType::Integer)
}

/// Shorthand for a required BOOLEAN column
pub(crate) fn boolean(name: &'static str) -> FieldSchema {
    FieldSchema::required(name, FieldType::Boolean)
}

/// Shorthand for a required DATETIME column
pub(crate) fn datetime(name: &'static str) -> FieldSchema {
    FieldSchema::required(name, FieldType::Datetime)
}

/// Shorthand for a repeated STRING column
pub(crate) fn strings(name: &'static str) -> FieldSchema {
    FieldSchema::repeated(name, FieldType::String)
}

/// Full table schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    /// Creates a schema from its top-level columns
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    /// Top-level column names in declaration order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Looks up a top-level column by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}
