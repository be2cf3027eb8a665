//! Runtime: the engine and its named pipelines.
//!
//! Every pipeline is a `Query` over the engine's `DataSource`. Building one
//! reads nothing; each pass re-reads the source and emits a trace event.

use serde_json::Value;
use thiserror::Error;

use sieve_core::config::EngineConfig;
use sieve_core::model::{Customer, DataSource, Money, Product};

use sieve_operators::aggregate::{average_int, average_money, max};
use sieve_operators::filter::has_invalid_contact;
use sieve_operators::project::{
    first_order_date, month_abbrev, order_count, order_month, order_year, turnover, Location,
    YearMonth,
};
use sieve_operators::{
    group_by_with, hash_join, intersect, sorted, OpError, OrderBy, PriceBracket, Query,
};

use crate::adhoc::{self, AdhocQuery, Collection};
use crate::metrics::emit_span;
use crate::rows::{
    BracketGroup, CategoryStock, CityStats, CustomerActivity, CustomerSupplier, FirstOrder,
    MonthCount, StockGroup, TurnoverTier, YearCount, YearMonthCount,
};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unknown pipeline: {0}")]
    UnknownPipeline(String),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("operator: {0}")]
    Operator(#[from] OpError),
    #[error("core: {0}")]
    Core(#[from] sieve_core::error::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Engine binds a validated config to one immutable data snapshot.
pub struct Engine<'a> {
    cfg: EngineConfig,
    source: &'a DataSource,
}

impl<'a> Engine<'a> {
    pub fn new(cfg: EngineConfig, source: &'a DataSource) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self { cfg, source })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn source(&self) -> &'a DataSource {
        self.source
    }

    fn pipeline<T, F, I>(&self, name: &'static str, factory: F) -> Query<'a, T>
    where
        T: 'a,
        F: Fn() -> I + 'a,
        I: Iterator<Item = T> + 'a,
    {
        Query::new(name, move || {
            emit_span("pipeline.evaluate", &[("pipeline", name.to_string())]);
            factory()
        })
    }

    /// One tier per threshold `max / n`, `n` counting down from
    /// `turnover_examples` to 1, each with the customers above it.
    pub fn turnover_tiers(&self) -> Query<'a, TurnoverTier<'a>> {
        let source = self.source;
        let examples = self.cfg.turnover_examples;
        self.pipeline("turnover_tiers", move || {
            let max_turnover = max(
                source
                    .customers
                    .iter()
                    .map(|c| turnover(c).units()),
            )
            .unwrap_or(0);
            (1..=examples).rev().map(move |n| {
                let threshold = max_turnover / i64::from(n);
                let floor = Money::from_units(threshold);
                TurnoverTier {
                    threshold,
                    customers: source
                        .customers
                        .iter()
                        .filter(|c| turnover(c) > floor)
                        .collect(),
                }
            })
        })
    }

    /// Distinct (city, country) pairs shared by a customer and a supplier.
    pub fn shared_locations(&self) -> Query<'a, Location<'a>> {
        let source = self.source;
        self.pipeline("shared_locations", move || {
            intersect(
                source.customers.iter().map(Location::of_customer),
                source.suppliers.iter().map(Location::of_supplier),
            )
        })
    }

    /// Every customer/supplier pair located in the same city and country.
    pub fn customer_suppliers(&self) -> Query<'a, CustomerSupplier<'a>> {
        let source = self.source;
        self.pipeline("customer_suppliers", move || {
            hash_join(
                source.customers.iter(),
                source.suppliers.iter(),
                |&c| Location::of_customer(c),
                |&s| Location::of_supplier(s),
                |&c, &s| CustomerSupplier {
                    customer_name: &c.company_name,
                    supplier_name: &s.name,
                    city: &c.city,
                    country: &s.country,
                },
            )
        })
    }

    /// Customers with at least one order above the large-order threshold.
    pub fn customers_with_large_orders(&self) -> Query<'a, &'a Customer> {
        let source = self.source;
        let large = self.cfg.large_order_money();
        self.pipeline("customers_with_large_orders", move || {
            source
                .customers
                .iter()
                .filter(move |c| c.orders.iter().any(|o| o.total > large))
        })
    }

    pub fn first_orders(&self) -> Query<'a, FirstOrder<'a>> {
        let source = self.source;
        self.pipeline("first_orders", move || {
            source.customers.iter().map(|c| FirstOrder {
                name: &c.company_name,
                date: first_order_date(c),
            })
        })
    }

    /// First-order date ascending, turnover descending, name ascending.
    pub fn customer_activity(&self) -> Query<'a, CustomerActivity<'a>> {
        let source = self.source;
        self.pipeline("customer_activity", move || {
            let rows = source.customers.iter().map(|c| CustomerActivity {
                name: &c.company_name,
                date: first_order_date(c),
                money_flow: turnover(c),
            });
            let order = OrderBy::asc(|r: &CustomerActivity<'a>| r.date)
                .then_desc(|r| r.money_flow)
                .then_asc(|r| r.name);
            sorted(rows, order)
        })
    }

    pub fn invalid_contacts(&self) -> Query<'a, &'a Customer> {
        let source = self.source;
        self.pipeline("invalid_contacts", move || {
            source.customers.iter().filter(|c| has_invalid_contact(c))
        })
    }

    /// Category, then units in stock; each stock group most expensive first.
    pub fn products_by_category_and_stock(&self) -> Query<'a, CategoryStock<'a>> {
        let source = self.source;
        self.pipeline("products_by_category_and_stock", move || {
            group_by_with(
                source.products.iter(),
                |&p| p.category.as_str(),
                |category, products| CategoryStock {
                    category,
                    units_in_stock: group_by_with(
                        products,
                        |&p| p.units_in_stock,
                        |count, products| StockGroup {
                            count,
                            products: OrderBy::desc(|p: &&'a Product| p.unit_price)
                                .sorted(products),
                        },
                    )
                    .collect(),
                },
            )
        })
    }

    /// Products per price bracket, cheapest first within a bracket.
    pub fn products_by_price_bracket(&self) -> Query<'a, BracketGroup<'a>> {
        let source = self.source;
        let average = self.cfg.average_limit_money();
        let expensive = self.cfg.expensive_limit_money();
        self.pipeline("products_by_price_bracket", move || {
            group_by_with(
                source.products.iter(),
                move |&p| PriceBracket::classify(p.unit_price, average, expensive),
                |category, products| BracketGroup {
                    category,
                    products: OrderBy::asc(|p: &&'a Product| p.unit_price).sorted(products),
                },
            )
        })
    }

    /// Mean turnover and mean order count per city. Customers without
    /// orders count as zero in both means.
    pub fn city_statistics(&self) -> Query<'a, CityStats<'a>> {
        let source = self.source;
        self.pipeline("city_statistics", move || {
            group_by_with(
                source.customers.iter(),
                |&c| c.city.as_str(),
                |city, customers| CityStats {
                    city,
                    income: average_money(customers.iter().map(|c| turnover(c)))
                        .map_or(0, Money::units),
                    intensity: average_int(customers.iter().map(|c| order_count(c) as i64))
                        .unwrap_or(0),
                },
            )
        })
    }

    /// Order counts per calendar month, ordered by `YYYY-MM`.
    pub fn orders_by_year_month(&self) -> Query<'a, YearMonthCount> {
        let source = self.source;
        self.pipeline("orders_by_year_month", move || {
            let counts = group_by_with(
                source.orders(),
                |&o| YearMonth::of(o.order_date),
                |period, orders| YearMonthCount {
                    date_time: period.to_string(),
                    count_of_orders: orders.len(),
                },
            );
            sorted(counts, OrderBy::asc(|r: &YearMonthCount| r.date_time.clone()))
        })
    }

    pub fn orders_by_year(&self) -> Query<'a, YearCount> {
        let source = self.source;
        self.pipeline("orders_by_year", move || {
            let counts = group_by_with(
                source.orders(),
                |&o| order_year(o),
                |year, orders| YearCount {
                    year,
                    count_of_orders: orders.len(),
                },
            );
            sorted(counts, OrderBy::asc(|r: &YearCount| r.year))
        })
    }

    /// Order counts per month of the year across all years, January first.
    pub fn orders_by_month(&self) -> Query<'a, MonthCount> {
        let source = self.source;
        self.pipeline("orders_by_month", move || {
            let counts = group_by_with(
                source.orders(),
                |&o| order_month(o),
                |month, orders| (month, orders.len()),
            );
            sorted(counts, OrderBy::asc(|r: &(u32, usize)| r.0)).map(|(month, n)| MonthCount {
                month: month_abbrev(month),
                count_of_orders: n,
            })
        })
    }

    /// Filter, order and group one collection by runtime field names.
    ///
    /// Unlike the named pipelines this runs eagerly: field names are checked
    /// up front and failures surface as errors rather than mid-iteration.
    pub fn adhoc(&self, collection: Collection, query: &AdhocQuery) -> Result<Vec<Value>, ExecError> {
        emit_span(
            "adhoc.evaluate",
            &[
                ("collection", collection.to_string()),
                ("filters", query.filters.len().to_string()),
                ("group_by", query.group_by.join(",")),
            ],
        );
        match collection {
            Collection::Customers => adhoc::run(self.source.customers.iter(), query),
            Collection::Orders => adhoc::run(self.source.orders(), query),
            Collection::Suppliers => adhoc::run(self.source.suppliers.iter(), query),
            Collection::Products => adhoc::run(self.source.products.iter(), query),
        }
    }
}
