//! Dynamic key values for field-addressed grouping, ordering and filtering.
//!
//! Typed pipelines use declared key structs; `Key` is for the paths where the
//! key is chosen at runtime (nested group trees, ad-hoc queries).

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::Money;

/// A structurally compared, hashable value.
///
/// Ordering: variants order as declared (`Null` first, `Tuple` last), then
/// by natural order of the payload. Tuples compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    Null,
    Bool(bool),
    Int(i64),
    Money(Money),
    Str(String),
    Date(NaiveDate),
    Tuple(Vec<Key>),
}

impl Key {
    pub fn is_null(&self) -> bool {
        matches!(self, Key::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Key::Null => "null",
            Key::Bool(_) => "bool",
            Key::Int(_) => "int",
            Key::Money(_) => "money",
            Key::Str(_) => "str",
            Key::Date(_) => "date",
            Key::Tuple(_) => "tuple",
        }
    }

    /// Parse `literal` as a value of the same variant as `self`.
    ///
    /// Returns `None` when the literal does not parse, or when `self` has no
    /// literal form (`Null`, `Tuple`). String literals may be single- or
    /// double-quoted.
    pub fn parse_like(&self, literal: &str) -> Option<Key> {
        let literal = literal.trim();
        match self {
            Key::Null | Key::Tuple(_) => None,
            Key::Bool(_) => literal.parse().ok().map(Key::Bool),
            Key::Int(_) => literal.parse().ok().map(Key::Int),
            Key::Money(_) => literal
                .parse::<f64>()
                .ok()
                .map(|v| Key::Money(Money::from_f64(v))),
            Key::Str(_) => Some(Key::Str(unquote(literal).to_string())),
            Key::Date(_) => NaiveDate::parse_from_str(unquote(literal), "%Y-%m-%d")
                .ok()
                .map(Key::Date),
        }
    }
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Money(m) => write!(f, "{}", m),
            Key::Str(s) => f.write_str(s),
            Key::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Key::Tuple(parts) => {
                f.write_str("(")?;
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Key::Bool(v)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Key::Int(i64::from(v))
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Key::Int(v as i64)
    }
}

impl From<Money> for Key {
    fn from(v: Money) -> Self {
        Key::Money(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Str(v)
    }
}

impl From<NaiveDate> for Key {
    fn from(v: NaiveDate) -> Self {
        Key::Date(v)
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Key::Null)
    }
}
