//! Projections: derived values and composite keys over records.
//!
//! Composite keys are plain structs with derived `Eq + Hash`, so two keys
//! built from equal field values are the same join/group key.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sieve_core::model::{Customer, Money, Order, Supplier};

use crate::aggregate::{min_date, sum};

/// (city, country) pair borrowed from a customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location<'a> {
    pub city: &'a str,
    pub country: &'a str,
}

impl<'a> Location<'a> {
    pub fn of_customer(c: &'a Customer) -> Self {
        Self {
            city: &c.city,
            country: &c.country,
        }
    }

    pub fn of_supplier(s: &'a Supplier) -> Self {
        Self {
            city: &s.city,
            country: &s.country,
        }
    }
}

/// Calendar month key. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    /// `2021-03`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sum of all order totals; zero for a customer without orders.
pub fn turnover(customer: &Customer) -> Money {
    sum(customer.orders.iter().map(|o| o.total))
}

/// Date of the earliest order, or `NaiveDate::MIN` without orders.
pub fn first_order_date(customer: &Customer) -> NaiveDate {
    min_date(customer.orders.iter().map(|o| o.order_date))
}

pub fn order_count(customer: &Customer) -> usize {
    customer.orders.len()
}

pub fn order_year(order: &Order) -> i32 {
    order.order_date.year()
}

/// Month number, 1-12.
pub fn order_month(order: &Order) -> u32 {
    order.order_date.month()
}

/// Abbreviated English month name for 1-12 (`Jan`, `Feb`, ...).
pub fn month_abbrev(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("???")
}
