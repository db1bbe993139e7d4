//! Error types for filter parsing and schema decoding
//!
//! Parse failures never escape a [`Search`](crate::Search): each fragment that
//! fails with a [`FilterError`] is logged and dropped. The error type exists so
//! the parser can say *why* a fragment was dropped.

use thiserror::Error;

use crate::kind::Kind;

/// Why a query fragment could not be turned into a filter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Fragment was empty (e.g. from `a=eq.1&&b=eq.2`)
    #[error("empty fragment")]
    Empty,

    /// Fragment targets one of the wire protocol's reserved words
    #[error("'{0}' is a reserved word, not a column")]
    ReservedWord(String),

    /// Column is not part of the definition
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Column exists but cannot be filtered (primary/foreign key, unsupported type)
    #[error("column '{0}' is not filterable")]
    NotFilterable(String),

    /// Operator text did not match the grammar
    #[error("unrecognized operator for column '{column}': {operator}")]
    UnrecognizedOperator { column: String, operator: String },

    /// Operator is valid but not for the column's kind
    #[error("operator '{operator}' is not valid for {kind} column '{column}'")]
    KindMismatch {
        column: String,
        kind: Kind,
        operator: String,
    },
}

impl FilterError {
    pub(crate) fn unrecognized(column: &str, operator: &str) -> Self {
        Self::UnrecognizedOperator {
            column: column.to_string(),
            operator: operator.to_string(),
        }
    }

    pub(crate) fn kind_mismatch(column: &str, kind: Kind, operator: impl Into<String>) -> Self {
        Self::KindMismatch {
            column: column.to_string(),
            kind,
            operator: operator.into(),
        }
    }
}

/// Failure to load a schema document
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Schema document could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema document is not valid JSON or lacks a `columns` object
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
}
