//! Field-name access to records, for operators driven by runtime field lists.

use chrono::Datelike;

use crate::model::{Customer, Money, Order, Product, Supplier};
use crate::types::Key;

pub trait Record {
    /// Field names `field` answers for, in display order.
    const FIELDS: &'static [&'static str];

    /// Value of the named field. `None` means "no such field"; an absent
    /// optional value is `Some(Key::Null)`.
    fn field(&self, name: &str) -> Option<Key>;

    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

impl<R: Record> Record for &R {
    const FIELDS: &'static [&'static str] = R::FIELDS;

    fn field(&self, name: &str) -> Option<Key> {
        (**self).field(name)
    }
}

impl Record for Customer {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "company_name",
        "city",
        "country",
        "region",
        "postal_code",
        "phone",
        "order_count",
        "turnover",
    ];

    fn field(&self, name: &str) -> Option<Key> {
        let v = match name {
            "id" => Key::from(self.id.as_str()),
            "company_name" => Key::from(self.company_name.as_str()),
            "city" => Key::from(self.city.as_str()),
            "country" => Key::from(self.country.as_str()),
            "region" => Key::from(self.region.as_deref()),
            "postal_code" => Key::from(self.postal_code.as_deref()),
            "phone" => Key::from(self.phone.as_str()),
            "order_count" => Key::from(self.orders.len()),
            "turnover" => Key::from(self.orders.iter().map(|o| o.total).sum::<Money>()),
            _ => return None,
        };
        Some(v)
    }
}

impl Record for Order {
    const FIELDS: &'static [&'static str] = &["id", "order_date", "total", "year", "month"];

    fn field(&self, name: &str) -> Option<Key> {
        let v = match name {
            "id" => Key::from(self.id),
            "order_date" => Key::from(self.order_date),
            "total" => Key::from(self.total),
            "year" => Key::Int(i64::from(self.order_date.year())),
            "month" => Key::from(self.order_date.month()),
            _ => return None,
        };
        Some(v)
    }
}

impl Record for Supplier {
    const FIELDS: &'static [&'static str] = &["name", "city", "country"];

    fn field(&self, name: &str) -> Option<Key> {
        let v = match name {
            "name" => Key::from(self.name.as_str()),
            "city" => Key::from(self.city.as_str()),
            "country" => Key::from(self.country.as_str()),
            _ => return None,
        };
        Some(v)
    }
}

impl Record for Product {
    const FIELDS: &'static [&'static str] =
        &["id", "name", "category", "units_in_stock", "unit_price"];

    fn field(&self, name: &str) -> Option<Key> {
        let v = match name {
            "id" => Key::from(self.id),
            "name" => Key::from(self.name.as_str()),
            "category" => Key::from(self.category.as_str()),
            "units_in_stock" => Key::from(self.units_in_stock),
            "unit_price" => Key::from(self.unit_price),
            _ => return None,
        };
        Some(v)
    }
}
