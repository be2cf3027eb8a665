//! Record model: the entities a `DataSource` snapshot holds.
//!
//! Pure data. Relationships:
//! - `Customer` owns its `Order`s (orders are reachable only through customers).
//! - `Supplier` has no link to `Customer`; pipelines match them on (city, country).

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::hash::{hash_serde, Hash256};

/// Monetary amount stored as whole cents.
///
/// Integer storage keeps sums exact and gives `Eq + Ord + Hash`, so amounts
/// can be used directly as group and sort keys. On the wire it is a plain
/// decimal number (`12.5`), rounded to the nearest cent when read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Saturates at the `i64` cent range; see `checked_from_units`.
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// `None` when `units` has no exact cent representation.
    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub fn from_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whole currency units, truncated toward zero.
    pub const fn units(self) -> i64 {
        self.0 / 100
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Money::from_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    pub order_date: NaiveDate,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub company_name: String,
    pub city: String,
    pub country: String,
    /// Absent and empty are both "unknown region".
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub units_in_stock: u32,
    pub unit_price: Money,
}

/// Read-only snapshot of every collection a pipeline may touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl DataSource {
    pub fn new(customers: Vec<Customer>, suppliers: Vec<Supplier>, products: Vec<Product>) -> Self {
        Self {
            customers,
            suppliers,
            products,
        }
    }

    /// Every order of every customer, in customer order then order order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> + '_ {
        self.customers.iter().flat_map(|c| c.orders.iter())
    }

    /// Stable content hash of the whole snapshot.
    ///
    /// Two snapshots with equal contents hash equal, so comparing fingerprints
    /// before and after a run detects any mutation.
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(self)
    }
}
