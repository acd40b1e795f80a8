//! Definitions of errors that can occur while reading or writing the deployment stores

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while reading or writing the deployment stores
#[derive(Debug)]
pub enum StoreError {
    /// Error reading a persisted document
    ReadFile(String),
    /// Error writing a persisted document
    WriteFile(String),
    /// Error de/serializing a persisted document
    Serde(String),
    /// A contract or network name that cannot address a stored document
    InvalidName(String),
    /// No deployment record on the network matches the address
    NotFound {
        /// The network that was searched
        network: String,
        /// The address that was searched for
        address: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ReadFile(s) => write!(f, "error reading file: {}", s),
            StoreError::WriteFile(s) => write!(f, "error writing file: {}", s),
            StoreError::Serde(s) => write!(f, "error de/serializing document: {}", s),
            StoreError::InvalidName(s) => write!(f, "invalid name: {}", s),
            StoreError::NotFound { network, address } => write!(
                f,
                "no deployment record for address {} on network {}, is the network configured?",
                address, network
            ),
        }
    }
}

impl Error for StoreError {}
