//! Pipeline catalog: every named pipeline with its description and a runner
//! that turns its output into JSON sections.

use serde::Serialize;
use serde_json::Value;

use crate::runtime::{Engine, ExecError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// One titled block of result rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<Value>,
}

impl Section {
    fn untitled(rows: Vec<Value>) -> Self {
        Self { title: None, rows }
    }

    fn titled(title: impl Into<String>, rows: Vec<Value>) -> Self {
        Self {
            title: Some(title.into()),
            rows,
        }
    }
}

type Runner = fn(&Engine<'_>) -> Result<Vec<Section>, ExecError>;

struct Entry {
    info: PipelineInfo,
    run: Runner,
}

pub struct Catalog {
    entries: Vec<Entry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn encode<T: Serialize>(items: impl IntoIterator<Item = T>) -> Result<Vec<Value>, ExecError> {
    items
        .into_iter()
        .map(|item| serde_json::to_value(item).map_err(ExecError::from))
        .collect()
}

impl Catalog {
    /// The ten standard pipelines, `linq1` through `linq10`.
    pub fn standard() -> Self {
        let mut c = Self {
            entries: Vec::new(),
        };
        c.register(
            PipelineInfo {
                name: "linq1",
                title: "Customers above turnover thresholds",
                category: "Restriction",
                description: "Customers whose total order value exceeds each of several thresholds",
            },
            |e| {
                Ok(vec![Section::untitled(encode(
                    e.turnover_tiers().iter(),
                )?)])
            },
        );
        c.register(
            PipelineInfo {
                name: "linq2",
                title: "Customers and suppliers in the same place",
                category: "Join",
                description: "Shared (city, country) locations, and each customer/supplier pair in one",
            },
            |e| {
                Ok(vec![
                    Section::titled("locations", encode(e.shared_locations().iter())?),
                    Section::titled("pairs", encode(e.customer_suppliers().iter())?),
                ])
            },
        );
        c.register(
            PipelineInfo {
                name: "linq3",
                title: "Customers with a large order",
                category: "Restriction",
                description: "Customers with at least one order above the large-order threshold",
            },
            |e| {
                Ok(vec![Section::untitled(encode(
                    e.customers_with_large_orders().iter(),
                )?)])
            },
        );
        c.register(
            PipelineInfo {
                name: "linq4",
                title: "First order per customer",
                category: "Projection",
                description: "Each customer with the date of their first order",
            },
            |e| Ok(vec![Section::untitled(encode(e.first_orders().iter())?)]),
        );
        c.register(
            PipelineInfo {
                name: "linq5",
                title: "Customer activity",
                category: "Ordering",
                description: "First order date ascending, turnover descending, name ascending",
            },
            |e| Ok(vec![Section::untitled(encode(e.customer_activity().iter())?)]),
        );
        c.register(
            PipelineInfo {
                name: "linq6",
                title: "Customers with invalid contact data",
                category: "Restriction",
                description: "Non-numeric or missing postal code, missing region, or no area code",
            },
            |e| Ok(vec![Section::untitled(encode(e.invalid_contacts().iter())?)]),
        );
        c.register(
            PipelineInfo {
                name: "linq7",
                title: "Products by category and stock",
                category: "Grouping",
                description: "Grouped by category then units in stock, most expensive first",
            },
            |e| {
                Ok(vec![Section::untitled(encode(
                    e.products_by_category_and_stock().iter(),
                )?)])
            },
        );
        c.register(
            PipelineInfo {
                name: "linq8",
                title: "Products by price bracket",
                category: "Grouping",
                description: "Cheap, average and expensive products, cheapest first",
            },
            |e| {
                Ok(vec![Section::untitled(encode(
                    e.products_by_price_bracket().iter(),
                )?)])
            },
        );
        c.register(
            PipelineInfo {
                name: "linq9",
                title: "City statistics",
                category: "Aggregation",
                description: "Average customer turnover and order count per city",
            },
            |e| Ok(vec![Section::untitled(encode(e.city_statistics().iter())?)]),
        );
        c.register(
            PipelineInfo {
                name: "linq10",
                title: "Order activity over time",
                category: "Aggregation",
                description: "Order counts per year and month, per year, and per month of the year",
            },
            |e| {
                Ok(vec![
                    Section::titled("by year and month", encode(e.orders_by_year_month().iter())?),
                    Section::titled("by year", encode(e.orders_by_year().iter())?),
                    Section::titled("by month", encode(e.orders_by_month().iter())?),
                ])
            },
        );
        c
    }

    fn register(&mut self, info: PipelineInfo, run: Runner) {
        self.entries.push(Entry { info, run });
    }

    pub fn list(&self) -> impl Iterator<Item = &PipelineInfo> {
        self.entries.iter().map(|e| &e.info)
    }

    pub fn get(&self, name: &str) -> Option<&PipelineInfo> {
        self.entry(name).map(|e| &e.info)
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.info.name.eq_ignore_ascii_case(name))
    }

    /// Evaluate the named pipeline once and encode its rows.
    pub fn run(&self, name: &str, engine: &Engine<'_>) -> Result<Vec<Section>, ExecError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ExecError::UnknownPipeline(name.to_string()))?;
        (entry.run)(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::config::EngineConfig;
    use sieve_core::model::DataSource;

    #[test]
    fn standard_catalog_lists_ten_pipelines_in_order() {
        let catalog = Catalog::standard();
        let names: Vec<_> = catalog.list().map(|p| p.name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "linq1");
        assert_eq!(names[9], "linq10");
        assert_eq!(catalog.get("LINQ7").map(|p| p.category), Some("Grouping"));
    }

    #[test]
    fn every_pipeline_runs_on_an_empty_source() {
        let source = DataSource::default();
        let engine = Engine::new(EngineConfig::default(), &source).unwrap();
        let catalog = Catalog::standard();
        for info in catalog.list() {
            let sections = catalog.run(info.name, &engine).unwrap();
            assert!(!sections.is_empty(), "{} produced no sections", info.name);
        }
        // thresholds still exist with no customers
        let tiers = catalog.run("linq1", &engine).unwrap();
        assert_eq!(tiers[0].rows.len(), 4);
    }

    #[test]
    fn unknown_pipeline_is_an_error() {
        let source = DataSource::default();
        let engine = Engine::new(EngineConfig::default(), &source).unwrap();
        assert!(matches!(
            Catalog::standard().run("linq11", &engine),
            Err(ExecError::UnknownPipeline(_))
        ));
    }
}
