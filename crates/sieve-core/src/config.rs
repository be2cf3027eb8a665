//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower bound (inclusive) of the "average" price bracket, in whole units.
    pub average_limit: i64,

    /// Lower bound (inclusive) of the "expensive" price bracket, in whole units.
    pub expensive_limit: i64,

    /// Number of turnover thresholds the turnover-tier pipeline produces.
    pub turnover_examples: u32,

    /// Single-order total (whole units) above which a customer counts as
    /// having a large order.
    pub large_order_threshold: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            average_limit: 20,
            expensive_limit: 40,
            turnover_examples: 4,
            large_order_threshold: 10_000,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SIEVE_AVERAGE_LIMIT`: lower bound of the "average" bracket
    /// - `SIEVE_EXPENSIVE_LIMIT`: lower bound of the "expensive" bracket
    /// - `SIEVE_TURNOVER_EXAMPLES`: number of turnover thresholds
    /// - `SIEVE_LARGE_ORDER_THRESHOLD`: large single-order total
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("SIEVE_AVERAGE_LIMIT").and_then(|s| s.parse().ok()) {
            cfg.average_limit = v;
        }

        if let Some(v) = lookup("SIEVE_EXPENSIVE_LIMIT").and_then(|s| s.parse().ok()) {
            cfg.expensive_limit = v;
        }

        if let Some(v) = lookup("SIEVE_TURNOVER_EXAMPLES").and_then(|s| s.parse().ok()) {
            cfg.turnover_examples = v;
        }

        if let Some(v) = lookup("SIEVE_LARGE_ORDER_THRESHOLD").and_then(|s| s.parse().ok()) {
            cfg.large_order_threshold = v;
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("average_limit", self.average_limit),
            ("expensive_limit", self.expensive_limit),
            ("large_order_threshold", self.large_order_threshold),
        ];
        for (name, units) in limits {
            if Money::checked_from_units(units).is_none() {
                return Err(Error::Config(format!(
                    "{} ({}) is out of range for a money amount",
                    name, units
                )));
            }
        }
        if self.average_limit > self.expensive_limit {
            return Err(Error::Config(format!(
                "average_limit ({}) must not exceed expensive_limit ({})",
                self.average_limit, self.expensive_limit
            )));
        }
        if self.turnover_examples == 0 {
            return Err(Error::Config("turnover_examples must be at least 1".into()));
        }
        Ok(())
    }

    pub fn average_limit_money(&self) -> Money {
        Money::from_units(self.average_limit)
    }

    pub fn expensive_limit_money(&self) -> Money {
        Money::from_units(self.expensive_limit)
    }

    pub fn large_order_money(&self) -> Money {
        Money::from_units(self.large_order_threshold)
    }
}
