//! Error types for the pharmacy_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pharmacy_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A medicine, customer or order id did not resolve
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u32 },

    /// Malformed or out-of-range operator input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested quantity exceeds what is left on the shelf
    #[error("Insufficient stock for {name} (ID: {med_id}): requested {requested}, available {available}")]
    InsufficientStock {
        med_id: u32,
        name: String,
        requested: u32,
        available: u32,
    },

    /// Storage write or rollback failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    pub fn medicine_not_found(id: u32) -> Self {
        Error::NotFound {
            entity: "Medicine",
            id,
        }
    }

    pub fn customer_not_found(id: u32) -> Self {
        Error::NotFound {
            entity: "Customer",
            id,
        }
    }

    pub fn order_not_found(id: u32) -> Self {
        Error::NotFound {
            entity: "Order",
            id,
        }
    }
}
