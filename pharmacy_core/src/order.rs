//! Order builder: accumulate line items for a customer, then commit.
//!
//! ## States
//!
//! `SelectingCustomer → AccumulatingItems → Finalizing → Done`, with
//! `Cancelled` reachable when the customer does not resolve or when the
//! order is finished with no lines.
//!
//! Stock decrements are held in the builder's scratch map while lines are
//! accumulated, so a second line for the same medicine sees the reduced
//! availability. They reach the store only in [`Store::place_order`];
//! dropping or cancelling a builder leaves the store untouched.

use crate::console::Console;
use crate::invoice::Invoice;
use crate::types::next_id;
use crate::{CustId, Customer, Error, LineItem, MedId, Order, Result, Store};
use chrono::Utc;
use std::collections::HashMap;

/// Medicine id that ends item entry in the interactive workflow
pub const FINISH_SENTINEL: MedId = 0;

/// Builder lifecycle. `Finalizing` lasts only inside [`OrderBuilder::finish`];
/// an order is `Done` once [`Store::place_order`] has persisted it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderState {
    SelectingCustomer,
    AccumulatingItems,
    Finalizing,
    Done,
    Cancelled,
}

/// Why an order ended without being created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    CustomerNotFound,
    Empty,
    Aborted,
}

/// An order with at least one line, ready to be placed
#[derive(Clone, Debug, PartialEq)]
pub struct PendingOrder {
    cust_id: CustId,
    items: Vec<LineItem>,
    decrements: HashMap<MedId, u32>,
}

impl PendingOrder {
    pub fn cust_id(&self) -> CustId {
        self.cust_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}

/// Result of [`OrderBuilder::finish`]
#[derive(Clone, Debug, PartialEq)]
pub enum Finalized {
    Ready(PendingOrder),
    Cancelled(CancelReason),
}

/// In-progress order borrowing the store read-only
pub struct OrderBuilder<'s> {
    store: &'s Store,
    state: OrderState,
    customer: Option<&'s Customer>,
    items: Vec<LineItem>,
    decrements: HashMap<MedId, u32>,
}

impl<'s> OrderBuilder<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self {
            store,
            state: OrderState::SelectingCustomer,
            customer: None,
            items: Vec::new(),
            decrements: HashMap::new(),
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn customer(&self) -> Option<&'s Customer> {
        self.customer
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Resolve the customer. An unknown id cancels the builder.
    pub fn select_customer(&mut self, cust_id: CustId) -> Result<&'s Customer> {
        self.expect_state(OrderState::SelectingCustomer)?;

        match self.store.find_customer(cust_id) {
            Some(customer) => {
                self.customer = Some(customer);
                self.state = OrderState::AccumulatingItems;
                Ok(customer)
            }
            None => {
                self.state = OrderState::Cancelled;
                Err(Error::customer_not_found(cust_id))
            }
        }
    }

    /// Stock still available for this order: live quantity minus what
    /// earlier lines of this order already claimed
    pub fn available(&self, med_id: MedId) -> Option<u32> {
        self.store.find_medicine(med_id).map(|m| {
            m.quantity
                .saturating_sub(self.decrements.get(&med_id).copied().unwrap_or(0))
        })
    }

    /// Add one line. Rejected lines leave the builder unchanged.
    pub fn add_item(&mut self, med_id: MedId, requested: u32) -> Result<&LineItem> {
        self.expect_state(OrderState::AccumulatingItems)?;

        let medicine = self
            .store
            .find_medicine(med_id)
            .ok_or_else(|| Error::medicine_not_found(med_id))?;

        if requested == 0 {
            return Err(Error::Validation("quantity must be at least 1".into()));
        }

        let available = self.available(med_id).unwrap_or(0);
        if requested > available {
            return Err(Error::InsufficientStock {
                med_id,
                name: medicine.name.clone(),
                requested,
                available,
            });
        }

        *self.decrements.entry(med_id).or_insert(0) += requested;
        self.items.push(LineItem {
            med_id,
            name: medicine.name.clone(),
            quantity: requested,
            price: medicine.price,
        });

        tracing::debug!("Line added: {} x {} (ID {})", requested, medicine.name, med_id);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Close item entry. No lines means nothing is created.
    pub fn finish(mut self) -> Finalized {
        match self.state {
            OrderState::AccumulatingItems => {}
            OrderState::Cancelled => return Finalized::Cancelled(CancelReason::CustomerNotFound),
            _ => return Finalized::Cancelled(CancelReason::Aborted),
        }
        self.state = OrderState::Finalizing;

        match self.customer {
            Some(customer) if !self.items.is_empty() => Finalized::Ready(PendingOrder {
                cust_id: customer.cust_id,
                items: self.items,
                decrements: self.decrements,
            }),
            _ => {
                tracing::info!("Order finished with no items, cancelling");
                Finalized::Cancelled(CancelReason::Empty)
            }
        }
    }

    fn expect_state(&self, expected: OrderState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "order is {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }
}

impl Store {
    /// Assign the next order id, apply the stock decrements, and persist
    /// orders and medicines as one unit.
    ///
    /// Decrements are re-checked against live stock, so a pending order
    /// that went stale is refused rather than driving stock negative.
    pub fn place_order(&mut self, pending: PendingOrder) -> Result<Order> {
        if self.find_customer(pending.cust_id).is_none() {
            return Err(Error::customer_not_found(pending.cust_id));
        }

        let mut medicines = self.medicines.clone();
        for (&med_id, &claimed) in &pending.decrements {
            let medicine = medicines
                .iter_mut()
                .find(|m| m.med_id == med_id)
                .ok_or_else(|| Error::medicine_not_found(med_id))?;
            let Some(remaining) = medicine.quantity.checked_sub(claimed) else {
                return Err(Error::InsufficientStock {
                    med_id,
                    name: medicine.name.clone(),
                    requested: claimed,
                    available: medicine.quantity,
                });
            };
            medicine.quantity = remaining;
        }

        let order = Order {
            order_id: next_id(self.orders.iter().map(|o| o.order_id))?,
            cust_id: pending.cust_id,
            order_date: Utc::now(),
            items: pending.items,
        };

        let mut orders = self.orders.clone();
        orders.push(order.clone());
        self.commit_order(orders, medicines)?;

        tracing::info!(
            "Placed order {} for customer {} ({} lines, total {:.2})",
            order.order_id,
            order.cust_id,
            order.items.len(),
            order.total()
        );
        Ok(order)
    }
}

fn print_customers(store: &Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say("--- Customer List ---")?;
    if store.customers().is_empty() {
        return console.say("No customers found.");
    }
    console.say(&format!("{:<4} {:<20} {:<15}", "ID", "Name", "Phone"))?;
    console.say(&"-".repeat(40))?;
    for c in store.customers() {
        console.say(&format!("{:<4} {:<20} {:<15}", c.cust_id, c.name, c.phone))?;
    }
    Ok(())
}

fn print_stock(builder: &OrderBuilder<'_>, store: &Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say(&format!(
        "{:<4} {:<20} {:<15} {:<10} {:<6}",
        "ID", "Name", "Category", "Price", "Avail"
    ))?;
    console.say(&"-".repeat(60))?;
    for m in store.medicines() {
        let available = builder.available(m.med_id).unwrap_or(0);
        console.say(&format!(
            "{:<4} {:<20} {:<15} ${:<9.2} {:<6}",
            m.med_id, m.name, m.category, m.price, available
        ))?;
    }
    Ok(())
}

/// Run the order workflow interactively.
///
/// Returns the placed order, or `None` if it was cancelled. Lookup and
/// stock problems are reported on the console and do not end the workflow;
/// persistence failures are returned.
pub fn take_order(store: &mut Store, console: &mut dyn Console) -> Result<Option<Order>> {
    console.say("")?;
    console.say("--- Create New Order ---")?;
    print_customers(store, console)?;

    let pending = {
        let mut builder = OrderBuilder::new(store);

        let Some(cust_id) = console.prompt_count("Enter customer ID for the order: ")? else {
            console.say("Order entry aborted.")?;
            return Ok(None);
        };
        if builder.select_customer(cust_id).is_err() {
            console.say("Customer not found.")?;
            return Ok(None);
        }
        if let Some(customer) = builder.customer() {
            console.say(&format!("Creating order for {}.", customer.name))?;
        }

        loop {
            print_stock(&builder, store, console)?;
            let Some(med_id) =
                console.prompt_count("Enter medicine ID to add to order (0 to finish): ")?
            else {
                console.say("Order entry aborted.")?;
                return Ok(None);
            };
            if med_id == FINISH_SENTINEL {
                break;
            }

            let Some(name) = store.find_medicine(med_id).map(|m| m.name.clone()) else {
                console.say("Medicine not found.")?;
                continue;
            };

            let Some(quantity) = console.prompt_count(&format!("Enter quantity for {}: ", name))?
            else {
                console.say("Order entry aborted.")?;
                return Ok(None);
            };

            match builder.add_item(med_id, quantity) {
                Ok(line) => {
                    let added = format!("Added {} x {} to order.", line.quantity, line.name);
                    console.say(&added)?;
                }
                Err(Error::InsufficientStock { available, .. }) => {
                    console.say(&format!(
                        "Insufficient stock. Available quantity: {}",
                        available
                    ))?;
                }
                Err(Error::Validation(reason)) => {
                    console.say(&format!("Invalid quantity: {}.", reason))?;
                }
                Err(e) => return Err(e),
            }
        }

        match builder.finish() {
            Finalized::Ready(pending) => {
                tracing::debug!(
                    "Placing order for customer {} with {} line(s)",
                    pending.cust_id(),
                    pending.items().len()
                );
                pending
            }
            Finalized::Cancelled(_) => {
                console.say("Order is empty. Cancelling.")?;
                return Ok(None);
            }
        }
    };

    let order = store.place_order(pending)?;
    console.say(&format!("Order ID {} created successfully.", order.order_id))?;

    let invoice = Invoice::new(&order, store.find_customer(order.cust_id));
    for line in invoice.to_string().lines() {
        console.say(line)?;
    }
    Ok(Some(order))
}
