#![forbid(unsafe_code)]

//! Core domain model and business logic for the pharmacy system.
//!
//! This crate provides:
//! - Domain types (medicines, customers, orders)
//! - Record store with JSON snapshot persistence
//! - Catalog operations
//! - Order builder and interactive order workflow
//! - Stock alerts, invoices and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod console;
pub mod store;
pub mod catalog;
pub mod order;
pub mod invoice;
pub mod alerts;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use console::{Console, LineConsole};
pub use store::{JsonTable, MemoryTable, Store, Table, Tables};
pub use catalog::{Deletion, MedicineField, MedicineUpdate, UpdateReport};
pub use order::{take_order, CancelReason, Finalized, OrderBuilder, OrderState, PendingOrder};
pub use invoice::Invoice;
pub use alerts::{StockAlert, LOW_STOCK_THRESHOLD};
