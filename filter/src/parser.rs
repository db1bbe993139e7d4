//! Query fragment parser
//!
//! Turns one `column=operator.value` fragment back into a [`Filter`], guided by
//! the [`Definition`]. Parsing happens in two steps: the operator grammar is
//! matched without looking at the column type, then the column's kind picks
//! the operation and operand variant.
//!
//! Grammar, per fragment:
//!
//! ```text
//! fragment = column "=" operator
//! operator = "in." list | "not.in." list
//!          | "is.true" | "is.false" | "is.null" | "gt.now" | "lt.now"
//!          | "eq." value | "lt." value | "gt." value | "lte." value | "gte." value
//!          | "ilike.*" value "*" | "ilike.*" value | "ilike." value "*"
//! list     = "(" [ item { "," item } ] ")"
//! item     = quoted-string | bare-token
//! ```

use std::borrow::Cow;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while1};
use nom::character::complete::{anychar, char};
use nom::combinator::{all_consuming, eof, map, opt, rest, value, verify};
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded, terminated};

use crate::definition::{ColumnType, Definition};
use crate::error::FilterError;
use crate::filter::Filter;
use crate::kind::Kind;
use crate::operand::{EnumOperand, Operand};
use crate::operation::Operation;

/// Wire tokens that are never column names
pub const RESERVED_WORDS: &[&str] = &["and", "or", "order"];

/// Operator as written on the wire, before the column kind is known
#[derive(Debug, Clone, PartialEq)]
enum WireOp {
    Eq(String),
    Lt(String),
    Gt(String),
    Lte(String),
    Gte(String),
    Contains(String),
    EndsWith(String),
    StartsWith(String),
    IsTrue,
    IsFalse,
    IsNull,
    Future,
    Past,
    In(Vec<String>),
    NotIn(Vec<String>),
}

impl WireOp {
    fn token(&self) -> &'static str {
        match self {
            WireOp::Eq(_) => "eq",
            WireOp::Lt(_) => "lt",
            WireOp::Gt(_) => "gt",
            WireOp::Lte(_) => "lte",
            WireOp::Gte(_) => "gte",
            WireOp::Contains(_) | WireOp::EndsWith(_) | WireOp::StartsWith(_) => "ilike",
            WireOp::IsTrue => "is.true",
            WireOp::IsFalse => "is.false",
            WireOp::IsNull => "is.null",
            WireOp::Future => "gt.now",
            WireOp::Past => "lt.now",
            WireOp::In(_) => "in",
            WireOp::NotIn(_) => "not.in",
        }
    }
}

/// Percent-decode captured text, keeping it verbatim when it is not valid UTF-8
fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

fn column_name(input: &str) -> IResult<&str, &str> {
    terminated(take_while1(|c: char| c != '='), char('='))(input)
}

fn quoted_item(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\""), '\\', anychar)),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn bare_item(input: &str) -> IResult<&str, String> {
    map(is_not(",()\""), str::to_string)(input)
}

fn list(input: &str) -> IResult<&str, Vec<String>> {
    let item = map(alt((quoted_item, bare_item)), |s: String| decode(&s));
    terminated(
        delimited(char('('), separated_list0(char(','), item), char(')')),
        eof,
    )(input)
}

fn list_op(input: &str) -> IResult<&str, WireOp> {
    alt((
        map(preceded(tag("in."), list), WireOp::In),
        map(preceded(tag("not.in."), list), WireOp::NotIn),
    ))(input)
}

fn test_op(input: &str) -> IResult<&str, WireOp> {
    terminated(
        alt((
            value(WireOp::IsTrue, tag("is.true")),
            value(WireOp::IsFalse, tag("is.false")),
            value(WireOp::IsNull, tag("is.null")),
            value(WireOp::Future, tag("gt.now")),
            value(WireOp::Past, tag("lt.now")),
        )),
        eof,
    )(input)
}

fn wildcard_suffixed(input: &str) -> IResult<&str, &str> {
    let (remaining, matched) = verify(rest, |s: &str| s.ends_with('*'))(input)?;
    Ok((remaining, &matched[..matched.len() - 1]))
}

fn like_op(input: &str) -> IResult<&str, WireOp> {
    alt((
        map(preceded(tag("ilike.*"), wildcard_suffixed), |v| {
            WireOp::Contains(decode(v))
        }),
        map(preceded(tag("ilike.*"), rest), |v| WireOp::EndsWith(decode(v))),
        map(preceded(tag("ilike."), wildcard_suffixed), |v| {
            WireOp::StartsWith(decode(v))
        }),
    ))(input)
}

fn compare_op(input: &str) -> IResult<&str, WireOp> {
    alt((
        map(preceded(tag("eq."), rest), |v| WireOp::Eq(decode(v))),
        map(preceded(tag("lte."), rest), |v| WireOp::Lte(decode(v))),
        map(preceded(tag("gte."), rest), |v| WireOp::Gte(decode(v))),
        map(preceded(tag("lt."), rest), |v| WireOp::Lt(decode(v))),
        map(preceded(tag("gt."), rest), |v| WireOp::Gt(decode(v))),
    ))(input)
}

fn operator(input: &str) -> IResult<&str, WireOp> {
    all_consuming(alt((list_op, test_op, like_op, compare_op)))(input)
}

/// Parse one `column=operator.value` fragment. Values may be percent-encoded.
pub fn parse_fragment(definition: &Definition, fragment: &str) -> Result<Filter, FilterError> {
    if fragment.is_empty() {
        return Err(FilterError::Empty);
    }

    let (op_text, column) = column_name(fragment)
        .map_err(|_| FilterError::unrecognized(fragment, ""))?;

    if RESERVED_WORDS.contains(&column) {
        return Err(FilterError::ReservedWord(column.to_string()));
    }
    let def = definition
        .column(column)
        .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
    let kind = Kind::of(&def.column_type)
        .ok_or_else(|| FilterError::NotFilterable(column.to_string()))?;

    let (_, wire) =
        operator(op_text).map_err(|_| FilterError::unrecognized(column, op_text))?;
    let token = wire.token();

    to_operation(kind, &def.column_type, wire)
        .and_then(|op| Filter::new(column, kind, op))
        .ok_or_else(|| FilterError::kind_mismatch(column, kind, token))
}

/// Pick the operation for a wire operator on a column of `kind`
fn to_operation(kind: Kind, column_type: &ColumnType, wire: WireOp) -> Option<Operation> {
    let operand = |raw: String| Operand::new(kind, raw);
    let op = match wire {
        WireOp::Eq(v) if kind == Kind::Date => Operation::InDate(operand(v)?),
        WireOp::Eq(v) => Operation::Equals(operand(v)?),
        WireOp::Lt(v) => Operation::LesserThan(operand(v)?),
        WireOp::Gt(v) => Operation::GreaterThan(operand(v)?),
        WireOp::Lte(v) => Operation::LesserOrEqual(operand(v)?),
        WireOp::Gte(v) => Operation::GreaterOrEqual(operand(v)?),
        WireOp::Contains(v) => Operation::Contains(operand(v)?),
        WireOp::StartsWith(v) => Operation::StartsWith(operand(v)?),
        WireOp::EndsWith(v) => Operation::EndsWith(operand(v)?),
        WireOp::IsTrue => Operation::IsTrue,
        WireOp::IsFalse => Operation::IsFalse,
        WireOp::IsNull => Operation::IsNull(None),
        WireOp::Future if kind == Kind::Date => Operation::IsInTheFuture(None),
        WireOp::Past if kind == Kind::Date => Operation::IsInThePast(None),
        // `now` is an ordinary value for kinds without future/past tests
        WireOp::Future => Operation::GreaterThan(operand("now".to_string())?),
        WireOp::Past => Operation::LesserThan(operand("now".to_string())?),
        WireOp::In(items) => Operation::OneOf(enum_operand(column_type, items)?),
        WireOp::NotIn(items) => Operation::NoneOf(enum_operand(column_type, items)?),
    };
    Some(op)
}

fn enum_operand(column_type: &ColumnType, items: Vec<String>) -> Option<EnumOperand> {
    match column_type {
        ColumnType::Enum { choices } => Some(EnumOperand::from_parts(choices, items)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ColumnDef;

    fn definition() -> Definition {
        Definition::new()
            .with_column("id", ColumnDef::new(ColumnType::PrimaryKey))
            .with_column("name", ColumnDef::new(ColumnType::Text))
            .with_column("age", ColumnDef::new(ColumnType::Int).required())
            .with_column("score", ColumnDef::new(ColumnType::Float))
            .with_column("born", ColumnDef::new(ColumnType::Date))
            .with_column("opens", ColumnDef::new(ColumnType::Time))
            .with_column("active", ColumnDef::new(ColumnType::Bool))
            .with_column(
                "status",
                ColumnDef::new(ColumnType::Enum {
                    choices: vec!["active".into(), "closed".into()],
                }),
            )
            .with_column("order", ColumnDef::new(ColumnType::Text))
    }

    fn parse(fragment: &str) -> Result<Filter, FilterError> {
        parse_fragment(&definition(), fragment)
    }

    fn op(fragment: &str) -> Operation {
        parse(fragment).unwrap().operation().clone()
    }

    fn text(s: &str) -> Operand {
        Operand::Text(s.to_string())
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(op("age=eq.18"), Operation::Equals(Operand::Int("18".into())));
        assert_eq!(op("age=lt.18"), Operation::LesserThan(Operand::Int("18".into())));
        assert_eq!(op("age=gt.18"), Operation::GreaterThan(Operand::Int("18".into())));
        assert_eq!(op("age=lte.18"), Operation::LesserOrEqual(Operand::Int("18".into())));
        assert_eq!(op("age=gte.18"), Operation::GreaterOrEqual(Operand::Int("18".into())));
        assert_eq!(
            op("score=gt.-1.5"),
            Operation::GreaterThan(Operand::Float("-1.5".into()))
        );
    }

    #[test]
    fn test_like_operators_backtrack() {
        assert_eq!(op("name=ilike.*bob*"), Operation::Contains(text("bob")));
        assert_eq!(op("name=ilike.*bob"), Operation::EndsWith(text("bob")));
        assert_eq!(op("name=ilike.bob*"), Operation::StartsWith(text("bob")));
    }

    #[test]
    fn test_like_decodes_escaped_wildcard() {
        assert_eq!(op("name=ilike.*a%2Ab*"), Operation::Contains(text("a*b")));
        assert_eq!(op("name=ilike.a%2A*"), Operation::StartsWith(text("a*")));
    }

    #[test]
    fn test_like_without_wildcard_is_unrecognized() {
        assert!(matches!(
            parse("name=ilike.bob"),
            Err(FilterError::UnrecognizedOperator { .. })
        ));
    }

    #[test]
    fn test_value_is_percent_decoded() {
        assert_eq!(op("name=eq.John%20Doe"), Operation::Equals(text("John Doe")));
        assert_eq!(op("name=eq.a%26b"), Operation::Equals(text("a&b")));
        // invalid escapes are kept verbatim
        assert_eq!(op("name=eq.100%"), Operation::Equals(text("100%")));
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(
            op("born=eq.2024-01-31"),
            Operation::InDate(Operand::Date("2024-01-31".into()))
        );
        assert_eq!(op("born=gt.now"), Operation::IsInTheFuture(None));
        assert_eq!(op("born=lt.now"), Operation::IsInThePast(None));
        assert_eq!(
            op("born=gt.nowhere"),
            Operation::GreaterThan(Operand::Date("nowhere".into()))
        );
        assert_eq!(
            op("opens=gte.09%3A30"),
            Operation::GreaterOrEqual(Operand::Time("09:30".into()))
        );
        assert_eq!(
            op("opens=gt.now"),
            Operation::GreaterThan(Operand::Time("now".into()))
        );
    }

    #[test]
    fn test_tests() {
        assert_eq!(op("active=is.true"), Operation::IsTrue);
        assert_eq!(op("active=is.false"), Operation::IsFalse);
        assert_eq!(op("active=is.null"), Operation::IsNull(None));
        assert_eq!(op("name=is.null"), Operation::IsNull(None));
        assert_eq!(op("status=is.null"), Operation::IsNull(None));
    }

    #[test]
    fn test_enum_lists() {
        let choices = vec!["active".to_string(), "closed".to_string()];
        assert_eq!(
            op(r#"status=in.("active")"#),
            Operation::OneOf(EnumOperand::from_parts(&choices, ["active"]))
        );
        assert_eq!(
            op("status=not.in.(active,closed)"),
            Operation::NoneOf(EnumOperand::from_parts(&choices, ["active", "closed"]))
        );
        assert_eq!(
            op("status=not.in.()"),
            Operation::NoneOf(EnumOperand::from_parts(&choices, Vec::<String>::new()))
        );
    }

    #[test]
    fn test_enum_items_are_not_validated() {
        match op("status=in.(archived)") {
            Operation::OneOf(e) => {
                assert!(e.is_chosen("archived"));
                assert_eq!(e.choices().len(), 2);
            }
            other => panic!("expected OneOf, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_items_unescape() {
        match op(r#"status=in.("a,b","say \"hi\"","back\\slash","",plain)"#) {
            Operation::OneOf(e) => {
                let chosen: Vec<&str> = e.chosen().iter().map(String::as_str).collect();
                assert_eq!(chosen, vec!["", "a,b", "back\\slash", "plain", "say \"hi\""]);
            }
            other => panic!("expected OneOf, got {:?}", other),
        }
    }

    #[test]
    fn test_list_items_are_percent_decoded() {
        match op(r#"status=in.(a%26b,"c%2Cd")"#) {
            Operation::OneOf(e) => {
                assert!(e.is_chosen("a&b"));
                assert!(e.is_chosen("c,d"));
            }
            other => panic!("expected OneOf, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lists() {
        for fragment in [
            "status=in.(active",
            "status=in.active",
            "status=in.(a)extra",
            "status=in.(a,,b)",
            r#"status=in.("open)"#,
        ] {
            assert!(
                matches!(parse(fragment), Err(FilterError::UnrecognizedOperator { .. })),
                "{fragment}"
            );
        }
    }

    #[test]
    fn test_unknown_and_reserved_columns() {
        assert_eq!(
            parse("nonexistent_col=eq.5"),
            Err(FilterError::UnknownColumn("nonexistent_col".into()))
        );
        assert_eq!(
            parse("order=eq.x"),
            Err(FilterError::ReservedWord("order".into()))
        );
        assert_eq!(parse("and=eq.x"), Err(FilterError::ReservedWord("and".into())));
        assert_eq!(parse(""), Err(FilterError::Empty));
        assert!(matches!(
            parse("name"),
            Err(FilterError::UnrecognizedOperator { .. })
        ));
    }

    #[test]
    fn test_key_columns_not_filterable() {
        assert_eq!(parse("id=eq.1"), Err(FilterError::NotFilterable("id".into())));
    }

    #[test]
    fn test_kind_mismatch() {
        assert!(matches!(
            parse("age=ilike.*1*"),
            Err(FilterError::KindMismatch { kind: Kind::Int, .. })
        ));
        assert!(matches!(
            parse("age=in.(1,2)"),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(matches!(
            parse("active=eq.true"),
            Err(FilterError::KindMismatch { kind: Kind::Bool, .. })
        ));
        assert!(matches!(
            parse("name=is.true"),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(matches!(
            parse("name=gt.b"),
            Err(FilterError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            parse("age=between.1.2"),
            Err(FilterError::UnrecognizedOperator {
                column: "age".into(),
                operator: "between.1.2".into()
            })
        );
        assert!(matches!(
            parse("active=is.maybe"),
            Err(FilterError::UnrecognizedOperator { .. })
        ));
    }

    #[test]
    fn test_blank_values_still_parse() {
        assert_eq!(op("name=eq."), Operation::Equals(text("")));
    }
}
