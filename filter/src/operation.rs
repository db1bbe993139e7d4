//! Filter operations
//!
//! An [`Operation`] is the comparison applied to a column. Each arm carries
//! exactly the operands it needs; the wire form of each arm lives in
//! [`serializer`](crate::serializer).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::ColumnType;
use crate::kind::Kind;
use crate::operand::{EnumOperand, Operand};

/// Comparison or test applied to a column
///
/// `IsNull`, `IsInTheFuture` and `IsInThePast` keep the operation they
/// replaced so that switching the test off restores it. The wrapped value
/// never affects serialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Operation {
    Equals(Operand),
    LesserThan(Operand),
    GreaterThan(Operand),
    LesserOrEqual(Operand),
    GreaterOrEqual(Operand),
    Between(Operand, Operand),
    Contains(Operand),
    StartsWith(Operand),
    EndsWith(Operand),
    InDate(Operand),
    OneOf(EnumOperand),
    NoneOf(EnumOperand),
    IsTrue,
    IsFalse,
    IsNull(Option<Box<Operation>>),
    IsInTheFuture(Option<Box<Operation>>),
    IsInThePast(Option<Box<Operation>>),
}

/// Tests that wrap the current operation when switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Null,
    Future,
    Past,
}

impl Operation {
    pub const EQUALS: &'static str = "is equal to";
    pub const LESSER_THAN: &'static str = "is lesser than";
    pub const GREATER_THAN: &'static str = "is greater than";
    pub const LESSER_OR_EQUAL: &'static str = "is lesser or equal to";
    pub const GREATER_OR_EQUAL: &'static str = "is greater or equal to";
    pub const BETWEEN: &'static str = "is between";
    pub const CONTAINS: &'static str = "contains";
    pub const STARTS_WITH: &'static str = "starts with";
    pub const ENDS_WITH: &'static str = "ends with";
    pub const IN_DATE: &'static str = "is on";
    pub const ONE_OF: &'static str = "is one of";
    pub const NONE_OF: &'static str = "is none of";
    pub const IS_TRUE: &'static str = "is true";
    pub const IS_FALSE: &'static str = "is false";
    pub const IS_NULL: &'static str = "is not set";
    pub const IS_IN_THE_FUTURE: &'static str = "is in the future";
    pub const IS_IN_THE_PAST: &'static str = "is in the past";

    /// Operation a freshly added filter starts with, `None` for columns that
    /// cannot be filtered
    pub fn default_for(column_type: &ColumnType) -> Option<Operation> {
        let op = match column_type {
            ColumnType::Text => Operation::Equals(Operand::Text(String::new())),
            ColumnType::Int => Operation::Equals(Operand::Int(String::new())),
            ColumnType::Float => Operation::Equals(Operand::Float(String::new())),
            ColumnType::Time => Operation::Equals(Operand::Time(String::new())),
            ColumnType::Date => Operation::InDate(Operand::Date(String::new())),
            ColumnType::Bool => Operation::IsTrue,
            ColumnType::Enum { choices } => {
                Operation::OneOf(EnumOperand::new(choices.iter().cloned()))
            }
            ColumnType::PrimaryKey | ColumnType::ForeignKey { .. } | ColumnType::Unsupported => {
                return None;
            }
        };
        Some(op)
    }

    /// Human-readable label, also the key used by [`Kind::operators`]
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Equals(_) => Self::EQUALS,
            Operation::LesserThan(_) => Self::LESSER_THAN,
            Operation::GreaterThan(_) => Self::GREATER_THAN,
            Operation::LesserOrEqual(_) => Self::LESSER_OR_EQUAL,
            Operation::GreaterOrEqual(_) => Self::GREATER_OR_EQUAL,
            Operation::Between(..) => Self::BETWEEN,
            Operation::Contains(_) => Self::CONTAINS,
            Operation::StartsWith(_) => Self::STARTS_WITH,
            Operation::EndsWith(_) => Self::ENDS_WITH,
            Operation::InDate(_) => Self::IN_DATE,
            Operation::OneOf(_) => Self::ONE_OF,
            Operation::NoneOf(_) => Self::NONE_OF,
            Operation::IsTrue => Self::IS_TRUE,
            Operation::IsFalse => Self::IS_FALSE,
            Operation::IsNull(_) => Self::IS_NULL,
            Operation::IsInTheFuture(_) => Self::IS_IN_THE_FUTURE,
            Operation::IsInThePast(_) => Self::IS_IN_THE_PAST,
        }
    }

    /// Operand of a single-operand arm
    pub(crate) fn scalar(&self) -> Option<&Operand> {
        match self {
            Operation::Equals(o)
            | Operation::LesserThan(o)
            | Operation::GreaterThan(o)
            | Operation::LesserOrEqual(o)
            | Operation::GreaterOrEqual(o)
            | Operation::Contains(o)
            | Operation::StartsWith(o)
            | Operation::EndsWith(o)
            | Operation::InDate(o) => Some(o),
            _ => None,
        }
    }

    /// Scalar operands carried by this arm (not by a wrapped previous operation)
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Operation::Between(a, b) => vec![a, b],
            other => other.scalar().into_iter().collect(),
        }
    }

    pub fn enum_operand(&self) -> Option<&EnumOperand> {
        match self {
            Operation::OneOf(e) | Operation::NoneOf(e) => Some(e),
            _ => None,
        }
    }

    /// Operation wrapped by a null/future/past test
    pub fn previous(&self) -> Option<&Operation> {
        match self {
            Operation::IsNull(prev)
            | Operation::IsInTheFuture(prev)
            | Operation::IsInThePast(prev) => prev.as_deref(),
            _ => None,
        }
    }

    /// No value entered, so nothing would be sent
    pub fn is_empty(&self) -> bool {
        match self {
            Operation::Between(a, b) => a.is_blank() || b.is_blank(),
            other => other.scalar().is_some_and(Operand::is_blank),
        }
    }

    /// Replace the raw text of one operand slot, keeping the operator.
    ///
    /// Slot 0 is the only slot of single-operand arms; `Between` has slots 0
    /// and 1. Arms without that slot are returned unchanged.
    pub fn with_operand(&self, slot: usize, raw: &str) -> Operation {
        let mut op = self.clone();
        match (&mut op, slot) {
            (Operation::Between(a, _), 0) | (Operation::Between(_, a), 1) => *a = a.with_raw(raw),
            (Operation::Between(..), _) => {}
            (Operation::Equals(o), 0)
            | (Operation::LesserThan(o), 0)
            | (Operation::GreaterThan(o), 0)
            | (Operation::LesserOrEqual(o), 0)
            | (Operation::GreaterOrEqual(o), 0)
            | (Operation::Contains(o), 0)
            | (Operation::StartsWith(o), 0)
            | (Operation::EndsWith(o), 0)
            | (Operation::InDate(o), 0) => *o = o.with_raw(raw),
            _ => {}
        }
        op
    }

    /// Replace the enum operand of `OneOf`/`NoneOf`
    pub fn with_enum(&self, operand: EnumOperand) -> Operation {
        match self {
            Operation::OneOf(_) => Operation::OneOf(operand),
            Operation::NoneOf(_) => Operation::NoneOf(operand),
            other => other.clone(),
        }
    }

    /// First scalar operand here or in a wrapped previous operation
    fn carried_operand(&self) -> Option<&Operand> {
        self.operands()
            .first()
            .copied()
            .or_else(|| self.previous().and_then(Operation::carried_operand))
    }

    fn carried_enum(&self) -> Option<&EnumOperand> {
        self.enum_operand()
            .or_else(|| self.previous().and_then(Operation::carried_enum))
    }

    /// Switch to the operator with `label`, keeping the current value.
    ///
    /// Returns `None` when the label is not in the kind's menu, or when the
    /// target needs an enum operand and none is available.
    pub fn switch_to(&self, kind: Kind, label: &str) -> Option<Operation> {
        if !kind.operators().contains(&label) {
            return None;
        }
        if self.label() == label {
            return Some(self.clone());
        }

        let scalar = self
            .carried_operand()
            .filter(|o| o.kind() == kind)
            .cloned()
            .or_else(|| Operand::empty(kind));
        let previous = Some(Box::new(self.clone()));

        let op = match label {
            Self::EQUALS => Operation::Equals(scalar?),
            Self::LESSER_THAN => Operation::LesserThan(scalar?),
            Self::GREATER_THAN => Operation::GreaterThan(scalar?),
            Self::LESSER_OR_EQUAL => Operation::LesserOrEqual(scalar?),
            Self::GREATER_OR_EQUAL => Operation::GreaterOrEqual(scalar?),
            Self::CONTAINS => Operation::Contains(scalar?),
            Self::STARTS_WITH => Operation::StartsWith(scalar?),
            Self::ENDS_WITH => Operation::EndsWith(scalar?),
            Self::IN_DATE => Operation::InDate(scalar?),
            Self::BETWEEN => {
                let lower = scalar?;
                let upper = lower.with_raw("");
                Operation::Between(lower, upper)
            }
            Self::ONE_OF => Operation::OneOf(self.carried_enum()?.clone()),
            Self::NONE_OF => Operation::NoneOf(self.carried_enum()?.clone()),
            Self::IS_TRUE => Operation::IsTrue,
            Self::IS_FALSE => Operation::IsFalse,
            Self::IS_NULL => Operation::IsNull(previous),
            Self::IS_IN_THE_FUTURE => Operation::IsInTheFuture(previous),
            Self::IS_IN_THE_PAST => Operation::IsInThePast(previous),
            _ => return None,
        };
        Some(op)
    }

    /// Switch a null/future/past test on or off.
    ///
    /// Switching on wraps the current operation. Switching off restores the
    /// wrapped operation, or returns `None` when there is nothing to restore.
    pub fn toggle(self, toggle: Toggle) -> Option<Operation> {
        match (toggle, self) {
            (Toggle::Null, Operation::IsNull(prev))
            | (Toggle::Future, Operation::IsInTheFuture(prev))
            | (Toggle::Past, Operation::IsInThePast(prev)) => prev.map(|p| *p),
            (Toggle::Null, op) => Some(Operation::IsNull(Some(Box::new(op)))),
            (Toggle::Future, op) => Some(Operation::IsInTheFuture(Some(Box::new(op)))),
            (Toggle::Past, op) => Some(Operation::IsInThePast(Some(Box::new(op)))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())?;
        match self {
            Operation::Between(a, b) => write!(f, " {} and {}", a.raw(), b.raw()),
            Operation::OneOf(e) | Operation::NoneOf(e) if !e.is_empty() => {
                write!(f, " {}", e.ordered_chosen().join(", "))
            }
            other => match other.scalar() {
                Some(o) => write!(f, " {}", o.raw()),
                None => Ok(()),
            },
        }
    }
}
