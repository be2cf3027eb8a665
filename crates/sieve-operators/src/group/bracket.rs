use std::fmt;

use serde::Serialize;
use sieve_core::model::Money;

/// Price category computed from two limits.
///
/// Brackets are half-open and tile the whole range: a price equal to a limit
/// belongs to the bracket above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBracket {
    Cheap,
    Average,
    Expensive,
}

impl PriceBracket {
    /// `[0, average_limit)` cheap, `[average_limit, expensive_limit)` average,
    /// `[expensive_limit, ..)` expensive.
    pub fn classify(price: Money, average_limit: Money, expensive_limit: Money) -> Self {
        if price < average_limit {
            PriceBracket::Cheap
        } else if price < expensive_limit {
            PriceBracket::Average
        } else {
            PriceBracket::Expensive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceBracket::Cheap => "cheap",
            PriceBracket::Average => "average",
            PriceBracket::Expensive => "expensive",
        }
    }
}

impl fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
