//! Wire serializer
//!
//! Renders filters as `column=operator.value` query parameters. Incomplete
//! operations (blank operands) render as no parameter at all.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::filter::Filter;
use crate::operand::{EnumOperand, Operand};
use crate::operation::Operation;

/// One `column=value` query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireParam {
    pub column: String,
    pub value: String,
}

impl WireParam {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for WireParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

fn encode(operand: &Operand) -> String {
    urlencoding::encode(operand.raw()).into_owned()
}

fn needs_quotes(item: &str) -> bool {
    item.is_empty()
        || item
            .chars()
            .any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\') || c.is_whitespace())
}

/// Render one list item, quoting it when it contains a delimiter
fn list_item(item: &str) -> String {
    let mut out = String::with_capacity(item.len() + 2);
    let quoted = needs_quotes(item);
    if quoted {
        out.push('"');
    }
    for c in item.chars() {
        match c {
            '"' | '\\' if quoted => {
                out.push('\\');
                out.push(c);
            }
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            '+' => out.push_str("%2B"),
            _ => out.push(c),
        }
    }
    if quoted {
        out.push('"');
    }
    out
}

fn list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let items: Vec<String> = items.into_iter().map(list_item).collect();
    format!("({})", items.join(","))
}

fn enum_list(operand: &EnumOperand) -> String {
    list(operand.ordered_chosen())
}

/// Wire parameters for one operation on `column`
pub fn serialize_operation(column: &str, operation: &Operation) -> Vec<WireParam> {
    let param = |value: String| vec![WireParam::new(column, value)];
    let scalar = |prefix: &str, operand: &Operand, suffix: &str| {
        if operand.is_blank() {
            Vec::new()
        } else {
            param(format!("{}{}{}", prefix, encode(operand), suffix))
        }
    };

    match operation {
        Operation::Equals(o) | Operation::InDate(o) => scalar("eq.", o, ""),
        Operation::LesserThan(o) => scalar("lt.", o, ""),
        Operation::GreaterThan(o) => scalar("gt.", o, ""),
        Operation::LesserOrEqual(o) => scalar("lte.", o, ""),
        Operation::GreaterOrEqual(o) => scalar("gte.", o, ""),
        Operation::Contains(o) => scalar("ilike.*", o, "*"),
        Operation::StartsWith(o) => scalar("ilike.", o, "*"),
        Operation::EndsWith(o) => scalar("ilike.*", o, ""),
        Operation::Between(a, b) => {
            if a.is_blank() || b.is_blank() {
                return Vec::new();
            }
            let (low, high) = match a.compare(b) {
                Ordering::Greater => (b, a),
                _ => (a, b),
            };
            vec![
                WireParam::new(column, format!("gte.{}", encode(low))),
                WireParam::new(column, format!("lte.{}", encode(high))),
            ]
        }
        Operation::IsTrue => param("is.true".to_string()),
        Operation::IsFalse => param("is.false".to_string()),
        Operation::IsNull(_) => param("is.null".to_string()),
        Operation::IsInTheFuture(_) => param("gt.now".to_string()),
        Operation::IsInThePast(_) => param("lt.now".to_string()),
        Operation::OneOf(e) if e.is_empty() => param("is.null".to_string()),
        Operation::OneOf(e) => param(format!("in.{}", enum_list(e))),
        Operation::NoneOf(e) if e.is_empty() => {
            param(format!("in.{}", list(e.choices().iter().map(String::as_str))))
        }
        Operation::NoneOf(e) => param(format!("not.in.{}", enum_list(e))),
    }
}

pub fn serialize_filter(filter: &Filter) -> Vec<WireParam> {
    serialize_operation(filter.column(), filter.operation())
}

/// Parameters for a list of filters, in order
pub fn to_params(filters: &[Filter]) -> Vec<WireParam> {
    filters.iter().flat_map(serialize_filter).collect()
}

/// `&`-joined query string for a list of filters
pub fn to_query(filters: &[Filter]) -> String {
    to_params(filters)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("&")
}
