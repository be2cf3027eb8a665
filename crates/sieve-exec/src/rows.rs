//! Result shapes produced by the named pipelines.
//!
//! Rows borrow from the `DataSource` they were computed over.

use chrono::NaiveDate;
use serde::Serialize;
use sieve_core::model::{Customer, Money, Product};
use sieve_operators::PriceBracket;

/// Customers whose turnover exceeds `threshold` whole units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverTier<'a> {
    pub threshold: i64,
    pub customers: Vec<&'a Customer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSupplier<'a> {
    pub customer_name: &'a str,
    pub supplier_name: &'a str,
    pub city: &'a str,
    pub country: &'a str,
}

/// When a customer placed their first order. `NaiveDate::MIN` if never.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstOrder<'a> {
    pub name: &'a str,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerActivity<'a> {
    pub name: &'a str,
    pub date: NaiveDate,
    pub money_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStock<'a> {
    pub category: &'a str,
    pub units_in_stock: Vec<StockGroup<'a>>,
}

/// Products of one category sharing a stock level, most expensive first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockGroup<'a> {
    pub count: u32,
    pub products: Vec<&'a Product>,
}

/// Products of one price bracket, cheapest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketGroup<'a> {
    pub category: PriceBracket,
    pub products: Vec<&'a Product>,
}

/// Per-city averages, truncated toward zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityStats<'a> {
    pub city: &'a str,
    pub income: i64,
    pub intensity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearMonthCount {
    /// `YYYY-MM`
    pub date_time: String,
    pub count_of_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count_of_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: &'static str,
    pub count_of_orders: usize,
}
