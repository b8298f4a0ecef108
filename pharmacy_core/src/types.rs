//! Core domain types for the pharmacy system.
//!
//! This module defines the records held by the store:
//! - Medicines (stock, price, expiry)
//! - Customers
//! - Orders and their snapshotted line items

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type MedId = u32;
pub type CustId = u32;
pub type OrderId = u32;

// ============================================================================
// Catalog Records
// ============================================================================

/// A stocked medicine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    pub med_id: MedId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
    /// Serialized as `YYYY-MM-DD`
    pub expiry_date: NaiveDate,
}

/// Fields for a medicine that has not been assigned an id yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
}

/// A registered customer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub cust_id: CustId,
    pub name: String,
    pub phone: String,
}

// ============================================================================
// Order Records
// ============================================================================

/// One medicine entry within an order.
///
/// `name` and `price` are copied from the medicine when the line is added, so
/// later catalog edits never alter a historical order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub med_id: MedId,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// A finalized, immutable order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub cust_id: CustId,
    pub order_date: DateTime<Utc>,
    pub items: Vec<LineItem>,
}

impl Order {
    /// Sum of line subtotals, in line order
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }
}

/// Next sequential id: one past the largest existing id, or 1 when empty.
///
/// Never wraps back to 0, which is reserved as the order-entry sentinel.
pub fn next_id(ids: impl Iterator<Item = u32>) -> Result<u32> {
    match ids.max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| Error::Validation("id space exhausted".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, price: f64) -> LineItem {
        LineItem {
            med_id: 1,
            name: "Paracetamol".into(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_next_id_empty_is_one() {
        assert_eq!(next_id(std::iter::empty()).unwrap(), 1);
    }

    #[test]
    fn test_next_id_uses_max_not_count() {
        assert_eq!(next_id([1, 7, 3].into_iter()).unwrap(), 8);
    }

    #[test]
    fn test_next_id_refuses_to_wrap() {
        assert_eq!(next_id([u32::MAX - 1].into_iter()).unwrap(), u32::MAX);
        assert!(matches!(
            next_id([3, u32::MAX].into_iter()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_order_total_sums_subtotals() {
        let order = Order {
            order_id: 1,
            cust_id: 1,
            order_date: Utc::now(),
            items: vec![line(2, 1.25), line(3, 4.0)],
        };
        assert_eq!(order.total(), 14.5);
    }

    #[test]
    fn test_medicine_expiry_serializes_as_iso_date() {
        let med = Medicine {
            med_id: 1,
            name: "Ibuprofen".into(),
            category: "Analgesic".into(),
            price: 3.5,
            quantity: 10,
            expiry_date: NaiveDate::from_ymd_opt(2027, 1, 31).unwrap(),
        };
        let json = serde_json::to_string(&med).unwrap();
        assert!(json.contains(r#""expiry_date":"2027-01-31""#));
    }
}
