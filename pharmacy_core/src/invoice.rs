//! Invoice view for a placed order.

use crate::{Customer, Order};
use chrono::Local;
use std::fmt;

/// Formatted report derived from an order and its customer
pub struct Invoice<'a> {
    order: &'a Order,
    customer: Option<&'a Customer>,
}

impl<'a> Invoice<'a> {
    pub fn new(order: &'a Order, customer: Option<&'a Customer>) -> Self {
        Self { order, customer }
    }

    /// Same summation as [`Order::total`]
    pub fn grand_total(&self) -> f64 {
        self.order.total()
    }
}

impl fmt::Display for Invoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(52);
        let name = self.customer.map_or("Unknown", |c| c.name.as_str());
        let date = self
            .order
            .order_date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S");

        writeln!(f, "--- Invoice ---")?;
        writeln!(f, "Order ID: {}", self.order.order_id)?;
        writeln!(f, "Customer: {}", name)?;
        writeln!(f, "Date: {}", date)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<20} {:<6} {:<12} {:<10}",
            "Medicine", "Qty", "Unit Price", "Subtotal"
        )?;
        for item in &self.order.items {
            writeln!(
                f,
                "{:<20} {:<6} ${:<11.2} ${:<9.2}",
                item.name,
                item.quantity,
                item.price,
                item.subtotal()
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(f, "{:<40} ${:.2}", "Total", self.grand_total())?;
        writeln!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineItem;
    use chrono::Utc;

    fn order() -> Order {
        Order {
            order_id: 12,
            cust_id: 3,
            order_date: Utc::now(),
            items: vec![
                LineItem {
                    med_id: 1,
                    name: "Aspirin".into(),
                    quantity: 3,
                    price: 0.1,
                },
                LineItem {
                    med_id: 2,
                    name: "Cetirizine".into(),
                    quantity: 7,
                    price: 0.2,
                },
            ],
        }
    }

    #[test]
    fn test_grand_total_matches_order_total() {
        let order = order();
        let invoice = Invoice::new(&order, None);

        let by_hand: f64 = order
            .items
            .iter()
            .map(|i| f64::from(i.quantity) * i.price)
            .sum();
        assert_eq!(invoice.grand_total(), order.total());
        assert_eq!(invoice.grand_total(), by_hand);
    }

    #[test]
    fn test_renders_lines_and_total() {
        let order = order();
        let customer = Customer {
            cust_id: 3,
            name: "Ada".into(),
            phone: "555-0100".into(),
        };
        let text = Invoice::new(&order, Some(&customer)).to_string();

        assert!(text.contains("Order ID: 12"));
        assert!(text.contains("Customer: Ada"));
        assert!(text.contains("Aspirin"));
        assert!(text.contains("$1.40"));
        assert!(text.contains("$1.70"));
    }

    #[test]
    fn test_unknown_customer() {
        let order = order();
        let text = Invoice::new(&order, None).to_string();
        assert!(text.contains("Customer: Unknown"));
    }
}
