//! Low-stock and expiry alerts.
//!
//! Both scans are read-only and return alerts in catalog order.

use crate::{MedId, Medicine, Store};
use chrono::NaiveDate;
use std::fmt;

/// Quantity at or below which a medicine is reported as low
pub const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StockAlert {
    LowStock {
        med_id: MedId,
        name: String,
        quantity: u32,
    },
    Expired {
        med_id: MedId,
        name: String,
        expiry_date: NaiveDate,
    },
}

impl fmt::Display for StockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockAlert::LowStock {
                med_id,
                name,
                quantity,
            } => write!(
                f,
                "Medicine '{}' (ID: {}) has low stock: {} left.",
                name, med_id, quantity
            ),
            StockAlert::Expired {
                med_id,
                name,
                expiry_date,
            } => write!(
                f,
                "Medicine '{}' (ID: {}) expired on {}.",
                name,
                med_id,
                expiry_date.format("%Y-%m-%d")
            ),
        }
    }
}

pub fn low_stock(medicines: &[Medicine]) -> Vec<StockAlert> {
    medicines
        .iter()
        .filter(|m| m.quantity <= LOW_STOCK_THRESHOLD)
        .map(|m| StockAlert::LowStock {
            med_id: m.med_id,
            name: m.name.clone(),
            quantity: m.quantity,
        })
        .collect()
}

/// Medicines whose expiry date is strictly before `today`
pub fn expired(medicines: &[Medicine], today: NaiveDate) -> Vec<StockAlert> {
    medicines
        .iter()
        .filter(|m| m.expiry_date < today)
        .map(|m| StockAlert::Expired {
            med_id: m.med_id,
            name: m.name.clone(),
            expiry_date: m.expiry_date,
        })
        .collect()
}

impl Store {
    pub fn low_stock_alert(&self) -> Vec<StockAlert> {
        low_stock(&self.medicines)
    }

    pub fn expired_stock_alert(&self, today: NaiveDate) -> Vec<StockAlert> {
        expired(&self.medicines, today)
    }
}

/// Alert banner lines as shown to the operator; empty when nothing is due
pub fn render(low: &[StockAlert], expired: &[StockAlert]) -> Vec<String> {
    let mut lines = Vec::new();
    if !low.is_empty() {
        lines.push("*** Low Stock Alert ***".to_string());
        lines.extend(low.iter().map(ToString::to_string));
        lines.push("*** Please reorder soon ***".to_string());
    }
    if !expired.is_empty() {
        lines.push("*** Expired Medicines Alert ***".to_string());
        lines.extend(expired.iter().map(ToString::to_string));
        lines.push("*** Please remove expired stock immediately ***".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::medicine;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let meds = vec![
            medicine(1, "A", 5, 1.0),
            medicine(2, "B", 6, 1.0),
            medicine(3, "C", 0, 1.0),
        ];
        let alerts = low_stock(&meds);
        let ids: Vec<_> = alerts
            .iter()
            .map(|a| match a {
                StockAlert::LowStock { med_id, .. } => *med_id,
                other => panic!("unexpected alert {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(alerts[0].to_string(), "Medicine 'A' (ID: 1) has low stock: 5 left.");
    }

    #[test]
    fn test_expired_is_strictly_before_today() {
        let mut past = medicine(1, "Old", 10, 1.0);
        past.expiry_date = date(2026, 10, 13);
        let mut today = medicine(2, "Edge", 10, 1.0);
        today.expiry_date = date(2026, 10, 14);

        let alerts = expired(&[past, today], date(2026, 10, 14));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].to_string(), "Medicine 'Old' (ID: 1) expired on 2026-10-13.");
    }

    #[test]
    fn test_alerts_are_idempotent() {
        let mut old = medicine(2, "B", 50, 1.0);
        old.expiry_date = date(2020, 1, 1);
        let meds = vec![medicine(1, "A", 2, 1.0), old];
        let today = date(2026, 10, 14);

        let first = render(&low_stock(&meds), &expired(&meds, today));
        let second = render(&low_stock(&meds), &expired(&meds, today));
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_render_empty_when_nothing_due() {
        let meds = vec![medicine(1, "A", 20, 1.0)];
        assert!(render(&low_stock(&meds), &expired(&meds, date(2026, 1, 1))).is_empty());
    }
}
