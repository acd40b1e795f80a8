//! Persistence of contract deployment metadata.
//!
//! Two stores live side by side under a deployments root, one directory per
//! network: the [`records::RecordStore`], holding one document per deployed
//! contract instance, and the [`net_config::ConfigStore`], holding the
//! network's free-form configuration document.

pub mod catalog;
pub mod constants;
pub mod errors;
pub mod net_config;
pub mod records;
pub mod types;
mod utils;

pub use catalog::{NetworkCatalog, NetworkInfo};
pub use errors::StoreError;
pub use net_config::{ConfigStore, FsConfigStore, MemConfigStore};
pub use records::{FsRecordStore, MemRecordStore, RecordStore};
pub use types::{record_name, DeploymentRecord, EndpointMapping, NetworkConfig, ParamDef};
