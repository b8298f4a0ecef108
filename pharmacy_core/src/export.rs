//! CSV export of inventory and order lines.
//!
//! Each export writes a full snapshot with headers, then flushes and syncs
//! the file to disk.

use crate::{Medicine, Order, Result};
use std::fs::File;
use std::path::Path;

pub const INVENTORY_CSV: &str = "inventory.csv";
pub const ORDER_LINES_CSV: &str = "order_lines.csv";

/// A row in the inventory export
#[derive(Debug, serde::Serialize)]
struct InventoryRow<'a> {
    med_id: u32,
    name: &'a str,
    category: &'a str,
    price: f64,
    quantity: u32,
    expiry_date: String,
}

impl<'a> From<&'a Medicine> for InventoryRow<'a> {
    fn from(m: &'a Medicine) -> Self {
        InventoryRow {
            med_id: m.med_id,
            name: &m.name,
            category: &m.category,
            price: m.price,
            quantity: m.quantity,
            expiry_date: m.expiry_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One order line flattened with its order header
#[derive(Debug, serde::Serialize)]
struct OrderLineRow<'a> {
    order_id: u32,
    cust_id: u32,
    order_date: String,
    med_id: u32,
    name: &'a str,
    quantity: u32,
    price: f64,
    subtotal: f64,
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(File::create(path)?))
}

fn finish(writer: csv::Writer<File>) -> Result<()> {
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;
    Ok(())
}

/// Write every medicine to `path`; returns the row count
pub fn export_inventory(medicines: &[Medicine], path: &Path) -> Result<usize> {
    let mut writer = create_writer(path)?;
    for medicine in medicines {
        writer.serialize(InventoryRow::from(medicine))?;
    }
    writer.flush()?;
    finish(writer)?;

    tracing::info!("Exported {} medicines to {:?}", medicines.len(), path);
    Ok(medicines.len())
}

/// Write one row per order line to `path`; returns the row count
pub fn export_order_lines(orders: &[Order], path: &Path) -> Result<usize> {
    let mut writer = create_writer(path)?;
    let mut count = 0;
    for order in orders {
        let order_date = order.order_date.to_rfc3339();
        for item in &order.items {
            writer.serialize(OrderLineRow {
                order_id: order.order_id,
                cust_id: order.cust_id,
                order_date: order_date.clone(),
                med_id: item.med_id,
                name: &item.name,
                quantity: item.quantity,
                price: item.price,
                subtotal: item.subtotal(),
            })?;
            count += 1;
        }
    }
    writer.flush()?;
    finish(writer)?;

    tracing::info!("Exported {} order lines to {:?}", count, path);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::medicine;
    use crate::LineItem;
    use chrono::Utc;

    #[test]
    fn test_export_inventory_writes_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(INVENTORY_CSV);

        let meds = vec![medicine(1, "Aspirin", 10, 1.5), medicine(2, "Cetirizine", 3, 4.0)];
        let count = export_inventory(&meds, &path).unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("med_id,name,category,price,quantity,expiry_date"));
        assert!(content.contains("2,Cetirizine,General,4.0,3,2030-01-01"));
    }

    #[test]
    fn test_export_overwrites_previous_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(INVENTORY_CSV);

        export_inventory(&[medicine(1, "A", 1, 1.0), medicine(2, "B", 1, 1.0)], &path).unwrap();
        export_inventory(&[medicine(1, "A", 1, 1.0)], &path).unwrap();

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }

    #[test]
    fn test_export_order_lines_flattens_items() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join(ORDER_LINES_CSV);

        let order = Order {
            order_id: 1,
            cust_id: 2,
            order_date: Utc::now(),
            items: vec![
                LineItem {
                    med_id: 1,
                    name: "Aspirin".into(),
                    quantity: 2,
                    price: 1.5,
                },
                LineItem {
                    med_id: 3,
                    name: "Zinc".into(),
                    quantity: 1,
                    price: 6.0,
                },
            ],
        };

        let count = export_order_lines(&[order], &path).unwrap();
        assert_eq!(count, 2);

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }
}
