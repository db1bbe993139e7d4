//! Operand values
//!
//! Operands keep the text the user typed. Nothing is parsed or coerced until
//! serialization, and then only to order the bounds of a range.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::kind::Kind;

/// A typed scalar value, stored as its raw textual representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Text(String),
    Int(String),
    Float(String),
    Date(String),
    Time(String),
}

impl Operand {
    /// Build an operand of the given kind, `None` for kinds without scalar operands
    pub fn new(kind: Kind, raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        match kind {
            Kind::Text => Some(Operand::Text(raw)),
            Kind::Int => Some(Operand::Int(raw)),
            Kind::Float => Some(Operand::Float(raw)),
            Kind::Date => Some(Operand::Date(raw)),
            Kind::Time => Some(Operand::Time(raw)),
            Kind::Bool | Kind::Enum => None,
        }
    }

    /// Empty operand of the given kind
    pub fn empty(kind: Kind) -> Option<Self> {
        Self::new(kind, String::new())
    }

    pub fn raw(&self) -> &str {
        match self {
            Operand::Text(s)
            | Operand::Int(s)
            | Operand::Float(s)
            | Operand::Date(s)
            | Operand::Time(s) => s,
        }
    }

    pub fn into_raw(self) -> String {
        match self {
            Operand::Text(s)
            | Operand::Int(s)
            | Operand::Float(s)
            | Operand::Date(s)
            | Operand::Time(s) => s,
        }
    }

    /// Same variant, new raw text
    pub fn with_raw(&self, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match self {
            Operand::Text(_) => Operand::Text(raw),
            Operand::Int(_) => Operand::Int(raw),
            Operand::Float(_) => Operand::Float(raw),
            Operand::Date(_) => Operand::Date(raw),
            Operand::Time(_) => Operand::Time(raw),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Operand::Text(_) => Kind::Text,
            Operand::Int(_) => Kind::Int,
            Operand::Float(_) => Kind::Float,
            Operand::Date(_) => Kind::Date,
            Operand::Time(_) => Kind::Time,
        }
    }

    /// No value entered (empty or whitespace only)
    pub fn is_blank(&self) -> bool {
        self.raw().trim().is_empty()
    }

    /// Order two operands by value.
    ///
    /// Numbers, dates and times compare by their parsed value when both sides
    /// parse; everything else compares lexicographically. Integers too large
    /// for `i64` compare as `f64`. Distinct texts with the same value (`05`
    /// and `5`) are ordered by their text, so the order is total.
    pub fn compare(&self, other: &Operand) -> Ordering {
        let (a, b) = (self.raw().trim(), other.raw().trim());
        let by_value = match (self, other) {
            (Operand::Int(_), Operand::Int(_)) => {
                parsed_cmp(a.parse::<i64>().ok(), b.parse::<i64>().ok())
                    .or_else(|| parsed_cmp(a.parse::<f64>().ok(), b.parse::<f64>().ok()))
            }
            (Operand::Float(_), Operand::Float(_)) => {
                parsed_cmp(a.parse::<f64>().ok(), b.parse::<f64>().ok())
            }
            (Operand::Date(_), Operand::Date(_)) => parsed_cmp(parse_date(a), parse_date(b)),
            (Operand::Time(_), Operand::Time(_)) => parsed_cmp(parse_time(a), parse_time(b)),
            _ => None,
        };
        by_value.filter(|o| o.is_ne()).unwrap_or_else(|| a.cmp(b))
    }
}

fn parsed_cmp<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Option<Ordering> {
    a.zip(b).and_then(|(a, b)| a.partial_cmp(&b))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Choices of an enumerated column plus the currently selected subset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "EnumOperandRepr")]
pub struct EnumOperand {
    choices: Vec<String>,
    chosen: BTreeSet<String>,
}

#[derive(Deserialize)]
struct EnumOperandRepr {
    choices: Vec<String>,
    #[serde(default)]
    chosen: BTreeSet<String>,
}

impl From<EnumOperandRepr> for EnumOperand {
    fn from(repr: EnumOperandRepr) -> Self {
        EnumOperand::from_parts(&repr.choices, repr.chosen)
    }
}

impl EnumOperand {
    /// Operand over `choices` with nothing selected. Duplicate choices are
    /// collapsed, keeping the first occurrence.
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = Vec::new();
        for choice in choices {
            let choice = choice.into();
            if !unique.contains(&choice) {
                unique.push(choice);
            }
        }
        Self {
            choices: unique,
            chosen: BTreeSet::new(),
        }
    }

    /// Operand with a selection taken verbatim from a query string.
    ///
    /// Chosen items are not checked against `choices`; items outside them are
    /// kept and serialized after the known ones.
    pub fn from_parts<I, S>(choices: &[String], chosen: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut operand = Self::new(choices.iter().cloned());
        operand.chosen = chosen.into_iter().map(Into::into).collect();
        operand
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn chosen(&self) -> &BTreeSet<String> {
        &self.chosen
    }

    pub fn is_chosen(&self, choice: &str) -> bool {
        self.chosen.contains(choice)
    }

    /// Select a choice. Returns `false` if it is not one of the choices.
    pub fn select(&mut self, choice: &str) -> bool {
        if !self.choices.iter().any(|c| c == choice) {
            return false;
        }
        self.chosen.insert(choice.to_string());
        true
    }

    pub fn deselect(&mut self, choice: &str) {
        self.chosen.remove(choice);
    }

    /// Flip the selection of a choice, ignoring unknown values
    pub fn toggle(&mut self, choice: &str) {
        if !self.chosen.remove(choice) {
            self.select(choice);
        }
    }

    pub fn select_all(&mut self) {
        self.chosen = self.choices.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    /// Nothing selected
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Selected items in choice order, then any items outside the choices (sorted)
    pub fn ordered_chosen(&self) -> Vec<&str> {
        let known = self
            .choices
            .iter()
            .filter(|c| self.chosen.contains(c.as_str()));
        let unknown = self
            .chosen
            .iter()
            .filter(|c| !self.choices.contains(*c));
        known.chain(unknown).map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_raw_keeps_variant() {
        let op = Operand::Float("1.5".into());
        let replaced = op.with_raw("2.5");
        assert_eq!(replaced, Operand::Float("2.5".into()));
        assert_eq!(replaced.kind(), Kind::Float);
    }

    #[test]
    fn test_new_rejects_bool_and_enum() {
        assert!(Operand::new(Kind::Bool, "true").is_none());
        assert!(Operand::new(Kind::Enum, "a").is_none());
        assert_eq!(Operand::empty(Kind::Time), Some(Operand::Time(String::new())));
    }

    #[test]
    fn test_is_blank() {
        assert!(Operand::Text(String::new()).is_blank());
        assert!(Operand::Text("   ".into()).is_blank());
        assert!(!Operand::Text(" a ".into()).is_blank());
    }

    #[test]
    fn test_compare_int_numerically() {
        let a = Operand::Int("10".into());
        let b = Operand::Int("3".into());
        assert_eq!(a.compare(&b), Ordering::Greater);
        // lexicographic order would say "10" < "3"
        assert_eq!("10".cmp("3"), Ordering::Less);
    }

    #[test]
    fn test_compare_float_and_negative() {
        let a = Operand::Float("-2.5".into());
        let b = Operand::Float("1e1".into());
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_compare_date_and_time() {
        let a = Operand::Date("2024-12-01".into());
        let b = Operand::Date("2024-02-15".into());
        assert_eq!(a.compare(&b), Ordering::Greater);

        let a = Operand::Time("9:05".into());
        let b = Operand::Time("10:00:00".into());
        assert_eq!(a.compare(&b), Ordering::Less);
    }

    #[test]
    fn test_compare_equal_values_order_by_text() {
        let a = Operand::Int("05".into());
        let b = Operand::Int("5".into());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);

        let a = Operand::Time("9:05".into());
        let b = Operand::Time("09:05".into());
        assert_eq!(a.compare(&b), "9:05".cmp("09:05"));
        assert_eq!(b.compare(&a), a.compare(&b).reverse());
    }

    #[test]
    fn test_compare_int_beyond_i64() {
        let small = Operand::Int("5".into());
        let huge = Operand::Int("100000000000000000000".into());
        assert_eq!(small.compare(&huge), Ordering::Less);
        assert_eq!(huge.compare(&small), Ordering::Greater);

        let negative = Operand::Int("-100000000000000000000".into());
        assert_eq!(negative.compare(&small), Ordering::Less);
    }

    #[test]
    fn test_compare_falls_back_to_text() {
        let a = Operand::Int("abc".into());
        let b = Operand::Int("5".into());
        assert_eq!(a.compare(&b), "abc".cmp("5"));
    }

    #[test]
    fn test_operand_serde() {
        let op = Operand::Int("42".into());
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"type":"int","value":"42"}"#);
        let back: Operand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_enum_operand_dedups_choices() {
        let e = EnumOperand::new(["a", "b", "a"]);
        assert_eq!(e.choices(), &["a".to_string(), "b".to_string()]);
        assert!(e.is_empty());
    }

    #[test]
    fn test_enum_select_only_known_choices() {
        let mut e = EnumOperand::new(["active", "closed"]);
        assert!(e.select("active"));
        assert!(!e.select("archived"));
        assert!(e.is_chosen("active"));
        assert_eq!(e.chosen().len(), 1);
    }

    #[test]
    fn test_enum_toggle_and_clear() {
        let mut e = EnumOperand::new(["a", "b"]);
        e.toggle("a");
        e.toggle("b");
        e.toggle("a");
        e.toggle("zzz");
        assert_eq!(e.ordered_chosen(), vec!["b"]);
        e.select_all();
        assert_eq!(e.ordered_chosen(), vec!["a", "b"]);
        e.clear();
        assert!(e.is_empty());
    }

    #[test]
    fn test_enum_deserialize_dedups_choices() {
        let e: EnumOperand =
            serde_json::from_str(r#"{"choices":["a","b","a"],"chosen":["b"]}"#).unwrap();
        assert_eq!(e.choices(), &["a".to_string(), "b".to_string()]);
        assert!(e.is_chosen("b"));

        let e: EnumOperand = serde_json::from_str(r#"{"choices":["a","a"]}"#).unwrap();
        assert_eq!(e.choices(), &["a".to_string()]);
        assert!(e.is_empty());
    }

    #[test]
    fn test_ordered_chosen_follows_choices() {
        let choices = vec!["low".to_string(), "mid".to_string(), "high".to_string()];
        let e = EnumOperand::from_parts(&choices, ["stale", "high", "low"]);
        assert_eq!(e.ordered_chosen(), vec!["low", "high", "stale"]);
    }
}
