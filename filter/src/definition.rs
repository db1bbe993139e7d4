//! Table definitions
//!
//! A [`Definition`] is the read-only schema a search is bound to: an ordered
//! mapping from column name to declared type and required-ness.
//!
//! Schema documents are JSON:
//!
//! ```json
//! {
//!   "columns": {
//!     "id":     { "type": "primary_key" },
//!     "age":    { "type": "int", "required": true },
//!     "status": { "type": "enum", "choices": ["active", "closed"] }
//!   }
//! }
//! ```
//!
//! A column entry that does not decode is kept as [`ColumnType::Unsupported`]
//! instead of failing the whole document.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// Declared value type of a column
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Int,
    Float,
    Date,
    Time,
    Bool,
    Enum {
        choices: Vec<String>,
    },
    PrimaryKey,
    ForeignKey {
        #[serde(default)]
        table: String,
    },
    #[serde(other)]
    Unsupported,
}

/// Column declaration: type plus required-ness
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnDef {
    #[serde(flatten)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
}

impl ColumnDef {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether a filter can be created for this column
    pub fn is_filterable(&self) -> bool {
        !matches!(
            self.column_type,
            ColumnType::PrimaryKey | ColumnType::ForeignKey { .. } | ColumnType::Unsupported
        )
    }

    fn decode(name: &str, value: serde_json::Value) -> Self {
        match serde_json::from_value::<ColumnDef>(value) {
            Ok(def) => match &def.column_type {
                ColumnType::Enum { choices } if has_duplicates(choices) => {
                    tracing::debug!(column = %name, "Duplicate enum choices, column unsupported");
                    ColumnDef::new(ColumnType::Unsupported)
                }
                _ => def,
            },
            Err(e) => {
                tracing::debug!(column = %name, error = %e, "Undecodable column entry");
                ColumnDef::new(ColumnType::Unsupported)
            }
        }
    }
}

fn has_duplicates(choices: &[String]) -> bool {
    choices
        .iter()
        .enumerate()
        .any(|(i, c)| choices[..i].contains(c))
}

#[derive(Deserialize)]
struct RawDefinition {
    columns: IndexMap<String, serde_json::Value>,
}

/// Ordered mapping from column name to its declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Definition {
    columns: IndexMap<String, ColumnDef>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_column(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        self.insert(name, def);
        self
    }

    /// Insert or replace a column. A replaced column keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, def: ColumnDef) {
        self.columns.insert(name.into(), def);
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDef)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First column a filter can be created for
    pub fn first_filterable(&self) -> Option<(&str, &ColumnDef)> {
        self.columns().find(|(_, def)| def.is_filterable())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Decode a schema document
    pub fn from_value(value: serde_json::Value) -> Result<Self, DefinitionError> {
        let raw: RawDefinition = serde_json::from_value(value)?;
        let columns = raw
            .columns
            .into_iter()
            .map(|(name, value)| {
                let def = ColumnDef::decode(&name, value);
                (name, def)
            })
            .collect();
        Ok(Self { columns })
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load a schema document from disk
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        tracing::debug!(path = %path.display(), "Loading schema");
        let content = fs::read_to_string(path)?;
        let definition = Self::from_json(&content)?;
        tracing::trace!(columns = definition.len(), "Parsed schema");
        Ok(definition)
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnDef)> for Definition {
    fn from_iter<I: IntoIterator<Item = (S, ColumnDef)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "columns": {
            "id": { "type": "primary_key" },
            "age": { "type": "int", "required": true },
            "status": { "type": "enum", "choices": ["active", "closed"] },
            "owner_id": { "type": "foreign_key", "table": "users" },
            "shape": { "type": "geometry" },
            "name": { "type": "text" }
        }
    }"#;

    #[test]
    fn test_from_json_keeps_order() {
        let def = Definition::from_json(SCHEMA).unwrap();
        let names: Vec<&str> = def.columns().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "age", "status", "owner_id", "shape", "name"]);
    }

    #[test]
    fn test_from_json_column_types() {
        let def = Definition::from_json(SCHEMA).unwrap();
        assert_eq!(
            def.column("age"),
            Some(&ColumnDef::new(ColumnType::Int).required())
        );
        assert_eq!(
            def.column("status").map(|c| &c.column_type),
            Some(&ColumnType::Enum {
                choices: vec!["active".into(), "closed".into()]
            })
        );
        assert_eq!(
            def.column("owner_id").map(|c| &c.column_type),
            Some(&ColumnType::ForeignKey {
                table: "users".into()
            })
        );
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let def = Definition::from_json(SCHEMA).unwrap();
        assert_eq!(
            def.column("shape").map(|c| &c.column_type),
            Some(&ColumnType::Unsupported)
        );
    }

    #[test]
    fn test_undecodable_entry_is_unsupported() {
        let json = r#"{"columns": {
            "tags": { "type": "enum", "choices": "not-a-list" },
            "flag": { "type": "enum", "choices": ["a", "a"] },
            "ok": { "type": "bool" }
        }}"#;
        let def = Definition::from_json(json).unwrap();
        assert_eq!(def.column("tags").map(|c| &c.column_type), Some(&ColumnType::Unsupported));
        assert_eq!(def.column("flag").map(|c| &c.column_type), Some(&ColumnType::Unsupported));
        assert_eq!(def.column("ok").map(|c| &c.column_type), Some(&ColumnType::Bool));
    }

    #[test]
    fn test_first_filterable_skips_keys() {
        let def = Definition::from_json(SCHEMA).unwrap();
        assert_eq!(def.first_filterable().map(|(n, _)| n), Some("age"));

        let keys_only: Definition = [
            ("id", ColumnDef::new(ColumnType::PrimaryKey)),
            ("x", ColumnDef::new(ColumnType::Unsupported)),
        ]
        .into_iter()
        .collect();
        assert!(keys_only.first_filterable().is_none());
    }

    #[test]
    fn test_missing_columns_is_error() {
        assert!(matches!(
            Definition::from_json(r#"{"tables": {}}"#),
            Err(DefinitionError::Json(_))
        ));
        assert!(matches!(
            Definition::from_json("not json"),
            Err(DefinitionError::Json(_))
        ));
    }

    #[test]
    fn test_builder() {
        let def = Definition::new()
            .with_column("a", ColumnDef::new(ColumnType::Text))
            .with_column("b", ColumnDef::new(ColumnType::Float));
        assert_eq!(def.len(), 2);
        assert!(def.contains("b"));
        assert!(!def.contains("c"));
        assert!(!def.is_empty());
    }

    #[test]
    fn test_serialize_round_trip_shape() {
        let def = Definition::new().with_column("age", ColumnDef::new(ColumnType::Int).required());
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["columns"]["age"]["type"], "int");
        assert_eq!(value["columns"]["age"]["required"], true);
        assert_eq!(Definition::from_value(value).unwrap(), def);
    }
}
