//! Filter predicates: the fixed customer-contact check, and field
//! predicates of the form "field OP literal" where OP ∈ {==, !=, <, <=, >, >=}.

use std::fmt;
use std::str::FromStr;

use sieve_core::model::Customer;
use sieve_core::record::Record;
use sieve_core::types::Key;

use crate::traits::OpError;

/// True when a customer's contact data is incomplete or malformed:
/// postal code absent or containing a non-digit, region absent or empty, or
/// a phone number that does not start with an area code in parentheses.
pub fn has_invalid_contact(customer: &Customer) -> bool {
    let bad_postal = customer
        .postal_code
        .as_deref()
        .map_or(true, |code| !code.chars().all(|c| c.is_ascii_digit()));
    let no_region = customer.region.as_deref().map_or(true, str::is_empty);
    let bad_phone = !customer.phone.starts_with('(');
    bad_postal || no_region || bad_phone
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    // Two-char operators first so "<=" is not read as "<".
    const ALL: [(&'static str, CompareOp); 6] = [
        ("==", CompareOp::Eq),
        ("!=", CompareOp::Ne),
        ("<=", CompareOp::Le),
        (">=", CompareOp::Ge),
        ("<", CompareOp::Lt),
        (">", CompareOp::Gt),
    ];

    fn symbol(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(s, _)| *s)
            .unwrap_or("?")
    }
}

/// Parsed "field OP literal" predicate evaluated against [`Record`] fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPredicate {
    pub field: String,
    pub op: CompareOp,
    pub literal: String,
}

impl FieldPredicate {
    /// Evaluate against one record.
    ///
    /// Null values never match, whatever the operator. The literal is read as
    /// the same type as the field value.
    pub fn matches<R: Record>(&self, record: &R) -> Result<bool, OpError> {
        let value = record
            .field(&self.field)
            .ok_or_else(|| OpError::UnknownField(self.field.clone()))?;
        if value.is_null() {
            return Ok(false);
        }
        let literal = value.parse_like(&self.literal).ok_or_else(|| {
            OpError::Parse(format!(
                "cannot parse '{}' as {} for field '{}'",
                self.literal,
                value.type_name(),
                self.field
            ))
        })?;
        Ok(compare(&value, self.op, &literal))
    }
}

fn compare(value: &Key, op: CompareOp, literal: &Key) -> bool {
    match op {
        CompareOp::Eq => value == literal,
        CompareOp::Ne => value != literal,
        CompareOp::Lt => value < literal,
        CompareOp::Le => value <= literal,
        CompareOp::Gt => value > literal,
        CompareOp::Ge => value >= literal,
    }
}

impl FromStr for FieldPredicate {
    type Err = OpError;

    /// Parse a simple predicate like "units_in_stock > 10" or "city == Berlin".
    fn from_str(expr: &str) -> Result<Self, OpError> {
        for (symbol, op) in CompareOp::ALL {
            if let Some(pos) = expr.find(symbol) {
                let field = expr[..pos].trim().to_string();
                let literal = expr[pos + symbol.len()..].trim().to_string();
                if field.is_empty() {
                    return Err(OpError::Parse(format!("missing field in '{}'", expr)));
                }
                return Ok(Self { field, op, literal });
            }
        }
        Err(OpError::Parse(format!("unparseable predicate: {}", expr)))
    }
}

impl fmt::Display for FieldPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.symbol(), self.literal)
    }
}
