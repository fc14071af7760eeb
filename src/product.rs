//! Product entity and its write-side companions.
//!
//! [`Product`] is a plain data holder: validation happens in
//! [`crate::service::ProductValidator`] before a [`NewProduct`] or
//! [`ProductChanges`] is ever built.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted product. `price` serializes as a JSON number carrying the exact
/// decimal digits; timestamps serialize as RFC 3339 strings or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for a create. Strings are already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }

    /// Apply the supplied fields to `product` and stamp `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        product.updated_at = Some(now);
    }
}
