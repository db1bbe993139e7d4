//! Per-column filters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::ColumnDef;
use crate::error::FilterError;
use crate::kind::Kind;
use crate::operation::Operation;

/// One column's operation, tagged with the kind it is restricted to
///
/// Filters are immutable values: the UI replaces a filter wholesale rather
/// than editing its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterRepr")]
pub struct Filter {
    column: String,
    kind: Kind,
    operation: Operation,
}

#[derive(Deserialize)]
struct FilterRepr {
    column: String,
    kind: Kind,
    operation: Operation,
}

impl TryFrom<FilterRepr> for Filter {
    type Error = FilterError;

    fn try_from(repr: FilterRepr) -> Result<Self, Self::Error> {
        let label = repr.operation.label();
        Filter::new(&repr.column, repr.kind, repr.operation)
            .ok_or_else(|| FilterError::kind_mismatch(&repr.column, repr.kind, label))
    }
}

impl Filter {
    /// Build a filter, `None` when the operation is not valid for `kind`
    pub fn new(column: impl Into<String>, kind: Kind, operation: Operation) -> Option<Self> {
        if !kind.accepts(&operation) {
            return None;
        }
        Some(Self {
            column: column.into(),
            kind,
            operation,
        })
    }

    /// Default filter for a schema column, `None` for keys and unsupported types
    pub fn from_column(name: impl Into<String>, def: &ColumnDef) -> Option<Self> {
        let kind = Kind::of(&def.column_type)?;
        let operation = Operation::default_for(&def.column_type)?;
        Self::new(name, kind, operation)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Same column and kind, new operation
    pub fn with_operation(&self, operation: Operation) -> Option<Self> {
        Self::new(self.column.clone(), self.kind, operation)
    }

    /// Nothing would be serialized for this filter
    pub fn is_empty(&self) -> bool {
        self.operation.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.operation)
    }
}
