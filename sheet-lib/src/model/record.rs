//! Server records and positioned grid rows

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::RowId;
use super::Value;

/// A row as the remote table service knows it.
///
/// Serializes as a flat JSON object with the identity under `_id`:
///
/// ```
/// use sheet_lib::model::Record;
///
/// let record = Record::new("ro_1").set("name", "Contoso");
/// let json = serde_json::to_string(&record).unwrap();
/// assert!(json.contains("\"_id\":\"ro_1\""));
/// assert!(json.contains("\"name\":\"Contoso\""));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    id: RowId,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given ID.
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    /// Creates a record from an ID and a set of fields.
    pub fn with_fields(id: impl Into<RowId>, fields: HashMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the record ID.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Attaches a collection position, producing a grid row.
    pub fn into_row(self, position: usize) -> Row {
        Row {
            id: self.id,
            position,
            fields: self.fields,
        }
    }
}

/// A row inside the grid's ordered row collection.
///
/// `position` is an internal field: it always equals the row's index in the
/// collection and is never sent back to the server. Use [`Row::to_record`]
/// to obtain the server representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    position: usize,
    fields: HashMap<String, Value>,
}

impl Row {
    /// Returns the row ID.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Returns the row's index in the collection.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, treating a missing field as null.
    pub fn value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Strips internal fields and returns the server representation.
    pub fn to_record(&self) -> Record {
        Record {
            id: self.id.clone(),
            fields: self.fields.clone(),
        }
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn set_value(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }
}
