//! Aggregation functions: sum, average, min, max, count.
//!
//! Empty-input policy:
//! - `sum` of nothing is zero, `count` of nothing is 0.
//! - `average`, `min`, `max` return `None`; callers choose the fallback.
//! - `min_date` of nothing is `NaiveDate::MIN`.
//!
//! Integral policy: a mean reported as an integer is truncated toward zero.
//! Integer and money inputs are averaged exactly (`average_int`,
//! `average_money`); `f64` means go only through `truncate`.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sieve_core::model::Money;
use sieve_core::record::Record;
use sieve_core::types::Key;

use crate::traits::OpError;

/// Values an average can be taken over.
pub trait Measure: Copy {
    fn measure(self) -> f64;
}

impl Measure for Money {
    fn measure(self) -> f64 {
        self.as_f64()
    }
}

impl Measure for f64 {
    fn measure(self) -> f64 {
        self
    }
}

impl Measure for i64 {
    fn measure(self) -> f64 {
        self as f64
    }
}

impl Measure for u32 {
    fn measure(self) -> f64 {
        f64::from(self)
    }
}

impl Measure for usize {
    fn measure(self) -> f64 {
        self as f64
    }
}

pub fn sum<I>(values: I) -> I::Item
where
    I: IntoIterator,
    I::Item: Sum,
{
    values.into_iter().sum()
}

pub fn count<I: IntoIterator>(values: I) -> usize {
    values.into_iter().count()
}

/// Arithmetic mean, `None` for empty input.
pub fn average<I>(values: I) -> Option<f64>
where
    I: IntoIterator,
    I::Item: Measure,
{
    let (total, n) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(total, n), v| (total + v.measure(), n + 1));
    (n > 0).then(|| total / n as f64)
}

pub fn average_or_zero<I>(values: I) -> f64
where
    I: IntoIterator,
    I::Item: Measure,
{
    average(values).unwrap_or(0.0)
}

/// Exact integer mean, truncated toward zero; `None` for empty input.
pub fn average_int<I: IntoIterator<Item = i64>>(values: I) -> Option<i64> {
    let (total, n) = values
        .into_iter()
        .fold((0_i64, 0_i64), |(total, n), v| (total + v, n + 1));
    (n > 0).then(|| total / n)
}

/// Exact mean in cents, truncated toward zero; `None` for empty input.
pub fn average_money<I: IntoIterator<Item = Money>>(values: I) -> Option<Money> {
    average_int(values.into_iter().map(Money::cents)).map(Money::from_cents)
}

/// Truncate an `f64` mean toward zero.
pub fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

pub fn min<I>(values: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: Ord,
{
    values.into_iter().min()
}

pub fn max<I>(values: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: Ord,
{
    values.into_iter().max()
}

/// Earliest date, or `NaiveDate::MIN` when there is none.
pub fn min_date<I: IntoIterator<Item = NaiveDate>>(dates: I) -> NaiveDate {
    min(dates).unwrap_or(NaiveDate::MIN)
}

/// Runtime-selected aggregation over a named field.
///
/// Parsed from `count`, `sum:FIELD`, `avg:FIELD`, `min:FIELD`, `max:FIELD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Count,
    Sum(String),
    Avg(String),
    Min(String),
    Max(String),
}

impl Aggregation {
    pub fn field(&self) -> Option<&str> {
        match self {
            Aggregation::Count => None,
            Aggregation::Sum(f) | Aggregation::Avg(f) | Aggregation::Min(f) | Aggregation::Max(f) => {
                Some(f.as_str())
            }
        }
    }

    /// Output column name, e.g. `sum(unit_price)`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Evaluate over `rows`. Null field values are skipped; `Avg`, `Min`
    /// and `Max` of no values are `Key::Null`, `Sum` of no values is `Int(0)`.
    pub fn evaluate<R: Record>(&self, rows: &[R]) -> Result<Key, OpError> {
        let Some(field) = self.field() else {
            return Ok(Key::from(rows.len()));
        };
        if !R::has_field(field) {
            return Err(OpError::UnknownField(field.to_string()));
        }
        let values: Vec<Key> = rows
            .iter()
            .filter_map(|r| r.field(field))
            .filter(|k| !k.is_null())
            .collect();

        match self {
            Aggregation::Count => Ok(Key::from(rows.len())),
            Aggregation::Min(_) => Ok(min(values).unwrap_or(Key::Null)),
            Aggregation::Max(_) => Ok(max(values).unwrap_or(Key::Null)),
            Aggregation::Sum(_) => sum_keys(field, &values),
            Aggregation::Avg(_) => {
                if values.is_empty() {
                    return Ok(Key::Null);
                }
                let n = values.len() as i64;
                Ok(match sum_keys(field, &values)? {
                    Key::Int(total) => Key::Int(total / n),
                    Key::Money(total) => Key::Money(Money::from_cents(total.cents() / n)),
                    other => other,
                })
            }
        }
    }
}

fn sum_keys(field: &str, values: &[Key]) -> Result<Key, OpError> {
    let mut ints: i64 = 0;
    let mut money = Money::ZERO;
    let mut saw_money = false;
    for v in values {
        match v {
            Key::Int(i) => ints += i,
            Key::Money(m) => {
                money += *m;
                saw_money = true;
            }
            other => {
                return Err(OpError::Type(format!(
                    "cannot sum {} field '{}'",
                    other.type_name(),
                    field
                )))
            }
        }
    }
    if saw_money {
        if ints != 0 {
            return Err(OpError::Type(format!("field '{}' mixes int and money", field)));
        }
        Ok(Key::Money(money))
    } else {
        Ok(Key::Int(ints))
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Count => f.write_str("count"),
            Aggregation::Sum(c) => write!(f, "sum({})", c),
            Aggregation::Avg(c) => write!(f, "avg({})", c),
            Aggregation::Min(c) => write!(f, "min({})", c),
            Aggregation::Max(c) => write!(f, "max({})", c),
        }
    }
}

impl FromStr for Aggregation {
    type Err = OpError;

    fn from_str(s: &str) -> Result<Self, OpError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("count") {
            return Ok(Aggregation::Count);
        }
        let (func, field) = s
            .split_once(':')
            .ok_or_else(|| OpError::Parse(format!("expected FUNC:FIELD, got '{}'", s)))?;
        let field = field.trim().to_string();
        if field.is_empty() {
            return Err(OpError::Parse(format!("missing field in '{}'", s)));
        }
        match func.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum(field)),
            "avg" => Ok(Aggregation::Avg(field)),
            "min" => Ok(Aggregation::Min(field)),
            "max" => Ok(Aggregation::Max(field)),
            other => Err(OpError::Parse(format!("unknown aggregation '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::model::Product;

    fn product(category: &str, stock: u32, cents: i64) -> Product {
        Product {
            id: 0,
            name: String::new(),
            category: category.into(),
            units_in_stock: stock,
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn empty_inputs_follow_the_policy() {
        assert_eq!(sum(Vec::<Money>::new()), Money::ZERO);
        assert_eq!(count(Vec::<u8>::new()), 0);
        assert_eq!(average(Vec::<Money>::new()), None);
        assert_eq!(average_or_zero(Vec::<usize>::new()), 0.0);
        assert_eq!(min(Vec::<i64>::new()), None);
        assert_eq!(min_date(Vec::new()), NaiveDate::MIN);
    }

    #[test]
    fn single_and_zero_values() {
        assert_eq!(average(vec![Money::ZERO, Money::ZERO]), Some(0.0));
        assert_eq!(average(vec![7usize]), Some(7.0));
        assert_eq!(sum(vec![Money::from_cents(5)]), Money::from_cents(5));
    }

    #[test]
    fn truncation_is_toward_zero() {
        assert_eq!(truncate(2.99), 2);
        assert_eq!(truncate(-2.99), -2);
        assert_eq!(truncate(average(vec![1usize, 2]).unwrap()), 1);
    }

    #[test]
    fn money_mean_is_exact_in_cents() {
        let turnovers = [1, 201, 98].map(Money::from_cents);
        // the f64 mean of these is 0.9999999999999999
        assert!(average(turnovers).unwrap() < 1.0);
        assert_eq!(average_money(turnovers), Some(Money::from_units(1)));
        assert_eq!(average_money(turnovers).map(Money::units), Some(1));
        assert_eq!(average_money(Vec::new()), None);
    }

    #[test]
    fn integer_mean_truncates_toward_zero() {
        assert_eq!(average_int(vec![3, 3, 4]), Some(3));
        assert_eq!(average_int(vec![-3, -4]), Some(-3));
        assert_eq!(average_int(vec![0, 2, 1]), Some(1));
        assert_eq!(average_int(Vec::new()), None);
        assert_eq!(
            average_money(vec![Money::from_cents(-150), Money::from_cents(-51)]).map(Money::units),
            Some(-1)
        );
    }

    #[test]
    fn min_date_picks_earliest() {
        let d = |m, day| NaiveDate::from_ymd_opt(2020, m, day).unwrap();
        assert_eq!(min_date(vec![d(3, 1), d(1, 10), d(2, 2)]), d(1, 10));
    }

    #[test]
    fn parse_aggregations() {
        assert_eq!("count".parse::<Aggregation>().unwrap(), Aggregation::Count);
        assert_eq!(
            "avg:unit_price".parse::<Aggregation>().unwrap(),
            Aggregation::Avg("unit_price".into())
        );
        assert!("median:unit_price".parse::<Aggregation>().is_err());
        assert!("sum:".parse::<Aggregation>().is_err());
        assert!("sum".parse::<Aggregation>().is_err());
    }

    #[test]
    fn dynamic_aggregations_over_records() {
        let rows = vec![product("A", 3, 1500), product("A", 4, 2500), product("A", 0, 4501)];
        let eval = |s: &str| s.parse::<Aggregation>().unwrap().evaluate(&rows).unwrap();
        assert_eq!(eval("count"), Key::Int(3));
        assert_eq!(eval("sum:units_in_stock"), Key::Int(7));
        assert_eq!(eval("avg:units_in_stock"), Key::Int(2));
        assert_eq!(eval("sum:unit_price"), Key::Money(Money::from_cents(8501)));
        assert_eq!(eval("avg:unit_price"), Key::Money(Money::from_cents(2833)));
        assert_eq!(eval("max:unit_price"), Key::Money(Money::from_cents(4501)));
        assert_eq!(eval("min:category"), Key::from("A"));
    }

    #[test]
    fn dynamic_aggregations_on_empty_groups() {
        let rows: Vec<Product> = Vec::new();
        let avg = Aggregation::Avg("unit_price".into()).evaluate(&rows).unwrap();
        assert_eq!(avg, Key::Null);
        let total = Aggregation::Sum("unit_price".into()).evaluate(&rows).unwrap();
        assert_eq!(total, Key::Int(0));
    }

    #[test]
    fn dynamic_aggregation_errors() {
        let rows = vec![product("A", 1, 100)];
        assert!(matches!(
            Aggregation::Sum("category".into()).evaluate(&rows),
            Err(OpError::Type(_))
        ));
        assert!(matches!(
            Aggregation::Max("weight".into()).evaluate(&rows),
            Err(OpError::UnknownField(_))
        ));
    }
}
