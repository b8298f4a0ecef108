//! Catalog operations: lookup and mutation of medicines and customers.

use crate::console::{parse_date, parse_price, parse_quantity};
use crate::types::next_id;
use crate::{CustId, Customer, Error, MedId, Medicine, NewMedicine, Order, OrderId, Result, Store};
use std::fmt;

/// Raw operator text for each editable medicine field.
///
/// `None` or blank text keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub expiry_date: Option<String>,
}

/// Editable medicine field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MedicineField {
    Name,
    Category,
    Price,
    Quantity,
    ExpiryDate,
}

impl fmt::Display for MedicineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MedicineField::Name => "name",
            MedicineField::Category => "category",
            MedicineField::Price => "price",
            MedicineField::Quantity => "quantity",
            MedicineField::ExpiryDate => "expiry date",
        };
        f.write_str(label)
    }
}

/// Outcome of a partial medicine update
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateReport {
    pub medicine: Medicine,
    pub applied: Vec<MedicineField>,
    /// Fields left unchanged because their input was invalid
    pub rejected: Vec<(MedicineField, String)>,
}

/// Outcome of a delete request
#[derive(Clone, Debug, PartialEq)]
pub enum Deletion {
    Deleted(Medicine),
    Declined,
}

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Store {
    pub fn find_medicine(&self, med_id: MedId) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.med_id == med_id)
    }

    pub fn find_customer(&self, cust_id: CustId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.cust_id == cust_id)
    }

    pub fn find_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    /// Customer name for an order, or `"Unknown"` if the customer is gone
    pub fn customer_name(&self, order: &Order) -> &str {
        self.find_customer(order.cust_id)
            .map_or("Unknown", |c| c.name.as_str())
    }

    /// Case-insensitive substring match on name or category
    pub fn search_medicines(&self, term: &str) -> Vec<&Medicine> {
        let term = term.trim().to_lowercase();
        self.medicines
            .iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&term) || m.category.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn add_medicine(&mut self, new: NewMedicine) -> Result<Medicine> {
        if !new.price.is_finite() || new.price < 0.0 {
            return Err(Error::Validation(format!(
                "price must be a non-negative number, got {}",
                new.price
            )));
        }

        let medicine = Medicine {
            med_id: next_id(self.medicines.iter().map(|m| m.med_id))?,
            name: new.name,
            category: new.category,
            price: new.price,
            quantity: new.quantity,
            expiry_date: new.expiry_date,
        };

        let mut next = self.medicines.clone();
        next.push(medicine.clone());
        self.commit_medicines(next)?;

        tracing::info!("Added medicine '{}' with ID {}", medicine.name, medicine.med_id);
        Ok(medicine)
    }

    /// Apply each provided field independently.
    ///
    /// Invalid input for one field leaves that field unchanged and is listed
    /// in the report; the medicine collection is written once either way.
    pub fn update_medicine(&mut self, med_id: MedId, update: MedicineUpdate) -> Result<UpdateReport> {
        let index = self
            .medicines
            .iter()
            .position(|m| m.med_id == med_id)
            .ok_or_else(|| Error::medicine_not_found(med_id))?;

        let mut next = self.medicines.clone();
        let medicine = &mut next[index];
        let mut applied = Vec::new();
        let mut rejected = Vec::new();

        if let Some(name) = provided(&update.name) {
            medicine.name = name.to_string();
            applied.push(MedicineField::Name);
        }
        if let Some(category) = provided(&update.category) {
            medicine.category = category.to_string();
            applied.push(MedicineField::Category);
        }
        if let Some(raw) = provided(&update.price) {
            match parse_price(raw) {
                Ok(price) => {
                    medicine.price = price;
                    applied.push(MedicineField::Price);
                }
                Err(e) => rejected.push((MedicineField::Price, e.to_string())),
            }
        }
        if let Some(raw) = provided(&update.quantity) {
            match parse_quantity(raw) {
                Ok(quantity) => {
                    medicine.quantity = quantity;
                    applied.push(MedicineField::Quantity);
                }
                Err(e) => rejected.push((MedicineField::Quantity, e.to_string())),
            }
        }
        if let Some(raw) = provided(&update.expiry_date) {
            match parse_date(raw) {
                Ok(date) => {
                    medicine.expiry_date = date;
                    applied.push(MedicineField::ExpiryDate);
                }
                Err(e) => rejected.push((MedicineField::ExpiryDate, e.to_string())),
            }
        }

        for (field, reason) in &rejected {
            tracing::warn!("Skipping {} update for medicine {}: {}", field, med_id, reason);
        }

        let medicine = medicine.clone();
        self.commit_medicines(next)?;

        tracing::info!("Updated medicine ID {} ({} fields)", med_id, applied.len());
        Ok(UpdateReport {
            medicine,
            applied,
            rejected,
        })
    }

    /// Remove a medicine once `confirm` approves it
    pub fn delete_medicine<F>(&mut self, med_id: MedId, confirm: F) -> Result<Deletion>
    where
        F: FnOnce(&Medicine) -> bool,
    {
        let medicine = self
            .find_medicine(med_id)
            .cloned()
            .ok_or_else(|| Error::medicine_not_found(med_id))?;

        if !confirm(&medicine) {
            tracing::debug!("Deletion of medicine {} declined", med_id);
            return Ok(Deletion::Declined);
        }

        let next = self
            .medicines
            .iter()
            .filter(|m| m.med_id != med_id)
            .cloned()
            .collect();
        self.commit_medicines(next)?;

        tracing::info!("Deleted medicine '{}' (ID {})", medicine.name, med_id);
        Ok(Deletion::Deleted(medicine))
    }

    pub fn add_customer(&mut self, name: &str, phone: &str) -> Result<Customer> {
        let customer = Customer {
            cust_id: next_id(self.customers.iter().map(|c| c.cust_id))?,
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
        };

        let mut next = self.customers.clone();
        next.push(customer.clone());
        self.commit_customers(next)?;

        tracing::info!("Added customer '{}' with ID {}", customer.name, customer.cust_id);
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{customer, fixture, medicine};
    use chrono::NaiveDate;

    fn new_medicine(name: &str) -> NewMedicine {
        NewMedicine {
            name: name.into(),
            category: "Analgesic".into(),
            price: 2.5,
            quantity: 20,
            expiry_date: NaiveDate::from_ymd_opt(2028, 6, 30).unwrap(),
        }
    }

    #[test]
    fn test_add_medicine_ids_strictly_increase() {
        let mut fx = fixture(vec![], vec![]);

        let ids: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| fx.store.add_medicine(new_medicine(name)).unwrap().med_id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(fx.medicines.writes(), 4);
        assert_eq!(fx.medicines.records().len(), 4);
    }

    #[test]
    fn test_add_medicine_at_id_ceiling_is_refused() {
        let mut fx = fixture(vec![medicine(u32::MAX, "Max", 1, 1.0)], vec![]);

        let result = fx.store.add_medicine(new_medicine("Overflow"));

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(fx.store.medicines().len(), 1);
        assert_eq!(fx.medicines.writes(), 0);
    }

    #[test]
    fn test_add_customer_at_id_ceiling_is_refused() {
        let mut fx = fixture(vec![], vec![customer(u32::MAX, "Max")]);

        assert!(matches!(
            fx.store.add_customer("Grace", "555-0199"),
            Err(Error::Validation(_))
        ));
        assert_eq!(fx.store.customers().len(), 1);
        assert_eq!(fx.customers.writes(), 0);
    }

    #[test]
    fn test_add_medicine_after_delete_does_not_reuse_max_id() {
        let mut fx = fixture(vec![medicine(1, "A", 1, 1.0), medicine(5, "B", 1, 1.0)], vec![]);
        fx.store.delete_medicine(1, |_| true).unwrap();

        let added = fx.store.add_medicine(new_medicine("C")).unwrap();
        assert_eq!(added.med_id, 6);
    }

    #[test]
    fn test_add_medicine_rejects_negative_price() {
        let mut fx = fixture(vec![], vec![]);
        let mut new = new_medicine("A");
        new.price = -1.0;

        assert!(matches!(fx.store.add_medicine(new), Err(Error::Validation(_))));
        assert!(fx.store.medicines().is_empty());
        assert_eq!(fx.medicines.writes(), 0);
    }

    #[test]
    fn test_find_unknown_ids() {
        let fx = fixture(vec![medicine(1, "A", 1, 1.0)], vec![customer(1, "Ada")]);
        assert!(fx.store.find_medicine(2).is_none());
        assert!(fx.store.find_customer(9).is_none());
        assert_eq!(fx.store.find_customer(1).unwrap().name, "Ada");
    }

    #[test]
    fn test_update_invalid_price_skips_field_only() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let report = fx
            .store
            .update_medicine(
                1,
                MedicineUpdate {
                    name: Some("Aspirin 500mg".into()),
                    price: Some("abc".into()),
                    quantity: Some("12".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(report.applied, vec![MedicineField::Name, MedicineField::Quantity]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, MedicineField::Price);

        let med = fx.store.find_medicine(1).unwrap();
        assert_eq!(med.price, 1.5);
        assert_eq!(med.name, "Aspirin 500mg");
        assert_eq!(med.quantity, 12);
        assert_eq!(fx.medicines.writes(), 1);
    }

    #[test]
    fn test_update_rejects_negative_quantity_and_bad_date() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let report = fx
            .store
            .update_medicine(
                1,
                MedicineUpdate {
                    quantity: Some("-3".into()),
                    expiry_date: Some("2027-13-01".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(fx.store.find_medicine(1).unwrap().quantity, 10);
    }

    #[test]
    fn test_update_blank_fields_keep_values() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let report = fx
            .store
            .update_medicine(
                1,
                MedicineUpdate {
                    name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.medicine.name, "Aspirin");
    }

    #[test]
    fn test_update_unknown_medicine_writes_nothing() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let result = fx.store.update_medicine(2, MedicineUpdate::default());
        assert!(matches!(result, Err(Error::NotFound { id: 2, .. })));
        assert_eq!(fx.medicines.writes(), 0);
    }

    #[test]
    fn test_delete_declined_leaves_collection() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let outcome = fx.store.delete_medicine(1, |_| false).unwrap();

        assert_eq!(outcome, Deletion::Declined);
        assert_eq!(fx.store.medicines().len(), 1);
        assert_eq!(fx.medicines.writes(), 0);
    }

    #[test]
    fn test_delete_confirmed_sees_medicine() {
        let mut fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5)], vec![]);

        let mut seen = None;
        let outcome = fx
            .store
            .delete_medicine(1, |m| {
                seen = Some(m.name.clone());
                true
            })
            .unwrap();

        assert!(matches!(outcome, Deletion::Deleted(ref m) if m.med_id == 1));
        assert_eq!(seen.as_deref(), Some("Aspirin"));
        assert!(fx.store.medicines().is_empty());
        assert_eq!(fx.medicines.writes(), 1);
    }

    #[test]
    fn test_search_matches_name_or_category() {
        let mut cough = medicine(2, "Dextromethorphan", 5, 3.0);
        cough.category = "Cough Syrup".into();
        let fx = fixture(vec![medicine(1, "Aspirin", 10, 1.5), cough], vec![]);

        assert_eq!(fx.store.search_medicines("ASP").len(), 1);
        assert_eq!(fx.store.search_medicines("syrup")[0].med_id, 2);
        assert!(fx.store.search_medicines("insulin").is_empty());
    }

    #[test]
    fn test_add_customer_assigns_next_id() {
        let mut fx = fixture(vec![], vec![customer(3, "Ada")]);

        let added = fx.store.add_customer(" Grace ", "555-0199").unwrap();

        assert_eq!(added.cust_id, 4);
        assert_eq!(added.name, "Grace");
        assert_eq!(fx.customers.writes(), 1);
    }
}
