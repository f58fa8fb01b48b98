//! Table schema and definition types

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::TableId;

/// The type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Longform,
    Number,
    Boolean,
    Datetime,
    Options,
    Array,
    Link,
    Formula,
    Attachment,
    Json,
    /// Column types this crate does not model.
    #[serde(other)]
    Unknown,
}

/// Validation constraints declared on a column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConstraints {
    /// Whether a value is required.
    #[serde(default)]
    pub presence: bool,

    /// Allowed values for option columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inclusion: Vec<String>,

    /// Maximum length for string columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Metadata for a single column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    /// The column type.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Validation constraints.
    #[serde(default)]
    pub constraints: ColumnConstraints,

    /// Whether this column is the table's primary display column.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_display: bool,
}

impl ColumnSchema {
    /// Creates column metadata of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    /// Marks the column as required.
    pub fn required(mut self) -> Self {
        self.constraints.presence = true;
        self
    }
}

/// Mapping from column name to column metadata.
///
/// At most one column carries `primary_display`. A schema is always replaced
/// wholesale when a new datasource/filter pair loads; it is never merged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: HashMap<String, ColumnSchema>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column (builder pattern).
    pub fn column(mut self, name: impl Into<String>, column: ColumnSchema) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    /// Returns the metadata for a column.
    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.get(name)
    }

    /// Returns all columns.
    pub fn columns(&self) -> &HashMap<String, ColumnSchema> {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the name of the primary display column, if one is flagged.
    pub fn primary_display(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, column)| column.primary_display)
            .map(|(name, _)| name.as_str())
    }

    /// Flags `name` as the primary display column, clearing any other flag.
    ///
    /// Returns `false` and leaves the schema untouched if the column is unknown.
    pub fn mark_primary_display(&mut self, name: &str) -> bool {
        if !self.columns.contains_key(name) {
            return false;
        }
        for (column_name, column) in self.columns.iter_mut() {
            column.primary_display = column_name == name;
        }
        true
    }
}

/// A table definition as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// The table ID.
    #[serde(rename = "_id")]
    pub id: TableId,

    /// Display name of the table.
    #[serde(default)]
    pub name: String,

    /// Column metadata.
    #[serde(default)]
    pub schema: Schema,

    /// Name of the column the server declares as primary display.
    #[serde(default)]
    pub primary_display: Option<String>,
}

impl TableDefinition {
    /// Creates a definition with the given ID and schema.
    pub fn new(id: impl Into<TableId>, schema: Schema) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            schema,
            primary_display: None,
        }
    }

    /// Declares the primary display column.
    pub fn with_primary_display(mut self, column: impl Into<String>) -> Self {
        self.primary_display = Some(column.into());
        self
    }
}
