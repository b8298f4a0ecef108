//! Record store: in-memory collections backed by full-snapshot tables.
//!
//! Every mutation is staged on a working copy of the affected collection,
//! written to its table, and only then swapped into the live store. A failed
//! write therefore never leaves the in-memory collections half-updated.

use crate::{Customer, Error, Medicine, Order, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;

pub const MEDICINES_FILE: &str = "medicines.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const ORDERS_FILE: &str = "orders.json";

/// Persistence for one entity type, always in full-collection snapshots
pub trait Table<T> {
    fn load_all(&self) -> Result<Vec<T>>;
    fn save_all(&mut self, records: &[T]) -> Result<()>;
}

// ============================================================================
// JSON file table
// ============================================================================

/// A table stored as one pretty-printed JSON array per file
pub struct JsonTable<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonTable<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Table<T> for JsonTable<T> {
    /// Missing file loads as an empty collection. An unreadable or
    /// unparseable file is an error: the next save would overwrite it.
    fn load_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            tracing::debug!("No table file at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<T> = serde_json::from_str(&contents).map_err(|e| {
            Error::Persistence(format!("Failed to parse {:?}: {}", self.path, e))
        })?;
        tracing::debug!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Atomically replaces the file: temp file, fsync, rename
    fn save_all(&mut self, records: &[T]) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            Error::Persistence(format!("Table path {:?} has no parent", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

// ============================================================================
// In-memory table
// ============================================================================

#[derive(Debug)]
struct MemoryInner<T> {
    records: Vec<T>,
    writes: usize,
    fail_next_save: bool,
}

/// Table held in memory.
///
/// Clones share the same backing collection, so a test can keep a handle
/// after moving one into a [`Store`] and inspect what was written.
#[derive(Debug)]
pub struct MemoryTable<T> {
    inner: Rc<RefCell<MemoryInner<T>>>,
}

impl<T> Clone for MemoryTable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> MemoryTable<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                records,
                writes: 0,
                fail_next_save: false,
            })),
        }
    }

    /// Number of successful `save_all` calls
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Last saved snapshot
    pub fn records(&self) -> Vec<T> {
        self.inner.borrow().records.clone()
    }

    /// Make the next `save_all` fail without touching the stored records
    pub fn fail_next_save(&self) {
        self.inner.borrow_mut().fail_next_save = true;
    }
}

impl<T: Clone> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Clone> Table<T> for MemoryTable<T> {
    fn load_all(&self) -> Result<Vec<T>> {
        Ok(self.inner.borrow().records.clone())
    }

    fn save_all(&mut self, records: &[T]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_save {
            inner.fail_next_save = false;
            return Err(Error::Persistence("simulated write failure".into()));
        }
        inner.records = records.to_vec();
        inner.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

/// The three tables a store persists to
pub struct Tables {
    pub medicines: Box<dyn Table<Medicine>>,
    pub customers: Box<dyn Table<Customer>>,
    pub orders: Box<dyn Table<Order>>,
}

impl Tables {
    /// JSON files `medicines.json`, `customers.json`, `orders.json` in `dir`
    pub fn json_dir(dir: &Path) -> Self {
        Self {
            medicines: Box::new(JsonTable::<Medicine>::new(dir.join(MEDICINES_FILE))),
            customers: Box::new(JsonTable::<Customer>::new(dir.join(CUSTOMERS_FILE))),
            orders: Box::new(JsonTable::<Order>::new(dir.join(ORDERS_FILE))),
        }
    }
}

/// In-memory collections of medicines, customers and orders
pub struct Store {
    pub(crate) medicines: Vec<Medicine>,
    pub(crate) customers: Vec<Customer>,
    pub(crate) orders: Vec<Order>,
    tables: Tables,
}

impl Store {
    /// Load every collection from its table
    pub fn open(tables: Tables) -> Result<Self> {
        let medicines = tables.medicines.load_all()?;
        let customers = tables.customers.load_all()?;
        let orders = tables.orders.load_all()?;

        tracing::info!(
            "Opened store: {} medicines, {} customers, {} orders",
            medicines.len(),
            customers.len(),
            orders.len()
        );

        Ok(Self {
            medicines,
            customers,
            orders,
            tables,
        })
    }

    /// Open a store backed by JSON files in `dir`
    pub fn open_dir(dir: &Path) -> Result<Self> {
        Self::open(Tables::json_dir(dir))
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub(crate) fn commit_medicines(&mut self, next: Vec<Medicine>) -> Result<()> {
        self.tables.medicines.save_all(&next)?;
        self.medicines = next;
        Ok(())
    }

    pub(crate) fn commit_customers(&mut self, next: Vec<Customer>) -> Result<()> {
        self.tables.customers.save_all(&next)?;
        self.customers = next;
        Ok(())
    }

    /// Persist a new order collection and the matching medicine collection
    /// as one unit.
    ///
    /// Orders are written first. If the medicine write then fails, the
    /// previous order snapshot is written back before the error is returned,
    /// and neither live collection changes.
    pub(crate) fn commit_order(
        &mut self,
        orders: Vec<Order>,
        medicines: Vec<Medicine>,
    ) -> Result<()> {
        self.tables.orders.save_all(&orders)?;

        if let Err(e) = self.tables.medicines.save_all(&medicines) {
            tracing::warn!("Medicine write failed during order commit: {}. Rolling back orders.", e);
            if let Err(rollback) = self.tables.orders.save_all(&self.orders) {
                return Err(Error::Persistence(format!(
                    "medicine write failed ({}) and order rollback failed ({})",
                    e, rollback
                )));
            }
            return Err(e);
        }

        self.orders = orders;
        self.medicines = medicines;
        Ok(())
    }
}
