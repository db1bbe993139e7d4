//! Operand families

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::ColumnType;
use crate::operation::Operation;

/// Operand family a filter is restricted to
///
/// Assigned once when a filter is created from a schema column. It decides
/// which operators appear in the filter's menu and which operand variant the
/// operation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Text,
    Int,
    Float,
    Date,
    Time,
    Bool,
    Enum,
}

const TEXT_OPERATORS: &[&str] = &[
    Operation::EQUALS,
    Operation::CONTAINS,
    Operation::STARTS_WITH,
    Operation::ENDS_WITH,
    Operation::IS_NULL,
];

const ORDERED_OPERATORS: &[&str] = &[
    Operation::EQUALS,
    Operation::LESSER_THAN,
    Operation::GREATER_THAN,
    Operation::LESSER_OR_EQUAL,
    Operation::GREATER_OR_EQUAL,
    Operation::BETWEEN,
    Operation::IS_NULL,
];

const DATE_OPERATORS: &[&str] = &[
    Operation::IN_DATE,
    Operation::LESSER_THAN,
    Operation::GREATER_THAN,
    Operation::LESSER_OR_EQUAL,
    Operation::GREATER_OR_EQUAL,
    Operation::BETWEEN,
    Operation::IS_IN_THE_FUTURE,
    Operation::IS_IN_THE_PAST,
    Operation::IS_NULL,
];

const BOOL_OPERATORS: &[&str] = &[Operation::IS_TRUE, Operation::IS_FALSE, Operation::IS_NULL];

const ENUM_OPERATORS: &[&str] = &[Operation::ONE_OF, Operation::NONE_OF, Operation::IS_NULL];

impl Kind {
    /// Kind of a declared column type, `None` for keys and unsupported types
    pub fn of(column_type: &ColumnType) -> Option<Kind> {
        match column_type {
            ColumnType::Text => Some(Kind::Text),
            ColumnType::Int => Some(Kind::Int),
            ColumnType::Float => Some(Kind::Float),
            ColumnType::Date => Some(Kind::Date),
            ColumnType::Time => Some(Kind::Time),
            ColumnType::Bool => Some(Kind::Bool),
            ColumnType::Enum { .. } => Some(Kind::Enum),
            ColumnType::PrimaryKey | ColumnType::ForeignKey { .. } | ColumnType::Unsupported => {
                None
            }
        }
    }

    /// Operator labels offered for this kind, in menu order
    pub fn operators(self) -> &'static [&'static str] {
        match self {
            Kind::Text => TEXT_OPERATORS,
            Kind::Int | Kind::Float | Kind::Time => ORDERED_OPERATORS,
            Kind::Date => DATE_OPERATORS,
            Kind::Bool => BOOL_OPERATORS,
            Kind::Enum => ENUM_OPERATORS,
        }
    }

    /// Whether the operation belongs to this kind's menu and carries operands
    /// of this kind. A wrapped previous operation must also be accepted.
    pub fn accepts(self, operation: &Operation) -> bool {
        if !self.operators().contains(&operation.label()) {
            return false;
        }
        if operation.operands().iter().any(|o| o.kind() != self) {
            return false;
        }
        operation.previous().is_none_or(|prev| self.accepts(prev))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::Bool => "bool",
            Kind::Enum => "enum",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
