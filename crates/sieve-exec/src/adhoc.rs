//! Ad-hoc queries: filter, order, nested grouping and aggregation over one
//! collection, with every field named at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sieve_core::error::Error;
use sieve_core::record::Record;
use sieve_core::types::Key;
use sieve_operators::group::KeyFn;
use sieve_operators::{
    group_tree, Aggregation, FieldPredicate, GroupChildren, GroupNode, OpError, OrderBy,
    SortDirection,
};

use crate::runtime::ExecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Customers,
    Orders,
    Suppliers,
    Products,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Customers,
        Collection::Orders,
        Collection::Suppliers,
        Collection::Products,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Orders => "orders",
            Collection::Suppliers => "suppliers",
            Collection::Products => "products",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, ExecError> {
        let wanted = s.trim().to_ascii_lowercase();
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ExecError::UnknownCollection(s.to_string()))
    }
}

/// Steps apply in a fixed order: filters, then ordering, then grouping.
/// Groups therefore appear in the order of their first row after sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdhocQuery {
    /// All must hold for a row to be kept.
    pub filters: Vec<FieldPredicate>,
    /// Outermost grouping field first.
    pub group_by: Vec<String>,
    pub order_by: Vec<(String, SortDirection)>,
    /// Computed per group, or once over all rows when ungrouped.
    pub aggregations: Vec<Aggregation>,
}

impl AdhocQuery {
    /// Parse an order term: `field`, `field:asc` or `field:desc`.
    pub fn parse_order(term: &str) -> Result<(String, SortDirection), OpError> {
        let (field, dir) = match term.split_once(':') {
            Some((field, dir)) => (field.trim(), dir.trim()),
            None => (term.trim(), "asc"),
        };
        if field.is_empty() {
            return Err(OpError::Parse(format!("missing field in '{}'", term)));
        }
        let dir = match dir.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(OpError::Parse(format!("unknown direction '{}'", other))),
        };
        Ok((field.to_string(), dir))
    }
}

pub(crate) fn run<'r, R, I>(rows: I, query: &AdhocQuery) -> Result<Vec<Value>, ExecError>
where
    R: Record + Serialize + 'r,
    I: Iterator<Item = &'r R>,
{
    let named = query
        .group_by
        .iter()
        .chain(query.order_by.iter().map(|(name, _)| name));
    for name in named {
        if !R::has_field(name) {
            return Err(OpError::UnknownField(name.clone()).into());
        }
    }

    let mut kept: Vec<&R> = Vec::new();
    'rows: for row in rows {
        for predicate in &query.filters {
            if !predicate.matches(row)? {
                continue 'rows;
            }
        }
        kept.push(row);
    }

    if let Some(order) = build_order(&query.order_by) {
        order.sort(&mut kept);
    }

    if query.group_by.is_empty() {
        if query.aggregations.is_empty() {
            return kept
                .iter()
                .map(|r| serde_json::to_value(r).map_err(ExecError::from))
                .collect();
        }
        let mut summary = Map::new();
        summary.insert("count".into(), Value::from(kept.len()));
        add_aggregates(&mut summary, &kept, &query.aggregations)?;
        return Ok(vec![Value::Object(summary)]);
    }

    let boxed: Vec<Box<dyn Fn(&&'r R) -> Key + '_>> = query
        .group_by
        .iter()
        .map(|name| {
            Box::new(move |r: &&'r R| r.field(name).unwrap_or(Key::Null))
                as Box<dyn Fn(&&'r R) -> Key + '_>
        })
        .collect();
    let keys: Vec<KeyFn<'_, &'r R>> = boxed
        .iter()
        .map(|f| &**f as &dyn Fn(&&'r R) -> Key)
        .collect();

    group_tree(kept, &keys)
        .iter()
        .map(|node| render(node, &query.group_by, &query.aggregations))
        .collect()
}

fn build_order<'q, 'r, R: Record + 'r>(
    terms: &'q [(String, SortDirection)],
) -> Option<OrderBy<'q, &'r R>> {
    let (first, rest) = terms.split_first()?;
    let (name, dir) = first;
    let mut order = OrderBy::by(*dir, move |r: &&'r R| r.field(name));
    for (name, dir) in rest {
        order = order.then_by(*dir, move |r: &&'r R| r.field(name));
    }
    Some(order)
}

fn add_aggregates<R: Record>(
    obj: &mut Map<String, Value>,
    rows: &[R],
    aggregations: &[Aggregation],
) -> Result<(), ExecError> {
    for agg in aggregations {
        obj.insert(agg.label(), serde_json::to_value(agg.evaluate(rows)?)?);
    }
    Ok(())
}

/// `{field: key, count, aggregates..., groups | rows}`; leaf rows are left
/// out once aggregations are requested.
fn render<R: Record + Serialize>(
    node: &GroupNode<&R>,
    fields: &[String],
    aggregations: &[Aggregation],
) -> Result<Value, ExecError> {
    let Some((field, rest)) = fields.split_first() else {
        return Err(Error::Invariant("group tree deeper than its keys".into()).into());
    };
    let mut obj = Map::new();
    obj.insert(field.clone(), serde_json::to_value(&node.key)?);
    obj.insert("count".into(), Value::from(node.len()));
    let leaves: Vec<&R> = node.leaves().into_iter().copied().collect();
    add_aggregates(&mut obj, &leaves, aggregations)?;

    match &node.children {
        GroupChildren::Groups(children) => {
            let groups = children
                .iter()
                .map(|child| render(child, rest, aggregations))
                .collect::<Result<Vec<_>, _>>()?;
            obj.insert("groups".into(), Value::Array(groups));
        }
        GroupChildren::Leaves(rows) if aggregations.is_empty() => {
            obj.insert("rows".into(), serde_json::to_value(rows)?);
        }
        GroupChildren::Leaves(_) => {}
    }
    Ok(Value::Object(obj))
}
