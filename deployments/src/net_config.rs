//! The network configuration store.
//!
//! Every network owns one free-form JSON document. Writers always load the
//! whole document, mutate it in memory and save it back in full.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use alloy_primitives::Address;
use colored::Colorize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    catalog::NetworkCatalog,
    constants::{CHAIN_ID_KEY, CONFIG_FILE_STEM, JSON_EXTENSION, NAME_KEY, RPC_KEY},
    errors::StoreError,
    types::{EndpointMapping, NetworkConfig},
    utils::{read_json_file, validate_segment, write_json_file},
};

/// Persists one configuration document per network
pub trait ConfigStore {
    /// The network's document, or an empty document if none was saved
    fn load(&self, network: &str) -> Result<NetworkConfig, StoreError>;

    /// Replace the network's document with `config`
    fn save(&self, network: &str, config: &NetworkConfig) -> Result<(), StoreError>;

    /// The addresses deployed under `name` on the network, most recent first
    fn deployed_addresses(
        &self,
        network: &str,
        name: &str,
        is_proxy: bool,
    ) -> Result<Vec<Address>, StoreError> {
        Ok(self.load(network)?.deployed_addresses(name, is_proxy))
    }

    /// Register a new deployment of `name` at `address` on the network
    fn record_deployed_address(
        &self,
        network: &str,
        name: &str,
        address: Address,
        is_proxy: bool,
    ) -> Result<(), StoreError> {
        let mut config = self.load(network)?;
        if config.record_deployed_address(name, address, is_proxy) {
            self.save(network, &config)?;
        }

        Ok(())
    }

    /// The cross-chain endpoint of every catalog network that configures one
    fn endpoint_mappings(
        &self,
        catalog: &NetworkCatalog,
    ) -> Result<BTreeMap<String, EndpointMapping>, StoreError> {
        let mut mappings = BTreeMap::new();
        for network in catalog.names() {
            if let Some(mapping) = self.load(network)?.endpoint_mapping() {
                mappings.insert(network.to_string(), mapping);
            }
        }

        Ok(mappings)
    }

    /// The inverse of [`ConfigStore::endpoint_mappings`], from endpoint id to network name
    fn endpoint_id_to_network(
        &self,
        catalog: &NetworkCatalog,
    ) -> Result<HashMap<u64, String>, StoreError> {
        Ok(self
            .endpoint_mappings(catalog)?
            .into_iter()
            .map(|(network, mapping)| (mapping.endpoint_id, network))
            .collect())
    }

    /// Every catalog network's document, augmented with its name, RPC url and chain id
    fn all_network_configs(
        &self,
        catalog: &NetworkCatalog,
    ) -> Result<Vec<NetworkConfig>, StoreError> {
        catalog
            .iter()
            .map(|(network, info)| {
                let mut config = self.load(network)?;
                config.insert(NAME_KEY, Value::from(network));
                config.insert(RPC_KEY, Value::from(info.url.as_str()));
                config.insert(CHAIN_ID_KEY, Value::from(info.chain_id));
                Ok(config)
            })
            .collect()
    }
}

// --------------------
// | Filesystem Store |
// --------------------

/// A configuration store keeping each document at `<root>/<network>/config.json`
#[derive(Clone, Debug)]
pub struct FsConfigStore {
    /// The root directory of the deployments
    root: PathBuf,
}

impl FsConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn config_path(&self, network: &str) -> Result<PathBuf, StoreError> {
        validate_segment(network)?;
        Ok(self
            .root
            .join(network)
            .join(format!("{CONFIG_FILE_STEM}.{JSON_EXTENSION}")))
    }
}

impl ConfigStore for FsConfigStore {
    fn load(&self, network: &str) -> Result<NetworkConfig, StoreError> {
        let path = self.config_path(network)?;
        match read_json_file(&path)? {
            Some(config) => {
                debug!("load network config: {}", path.display());
                Ok(config)
            }
            None => Ok(NetworkConfig::new()),
        }
    }

    fn save(&self, network: &str, config: &NetworkConfig) -> Result<(), StoreError> {
        let path = self.config_path(network)?;
        write_json_file(&path, config)?;

        info!("saved network config: {}", path.display().to_string().yellow());
        Ok(())
    }
}

// -------------------
// | In-Memory Store |
// -------------------

/// A configuration store held entirely in memory
#[derive(Debug, Default)]
pub struct MemConfigStore {
    /// Documents keyed by network
    configs: RefCell<BTreeMap<String, NetworkConfig>>,
}

impl MemConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemConfigStore {
    fn load(&self, network: &str) -> Result<NetworkConfig, StoreError> {
        validate_segment(network)?;
        Ok(self.configs.borrow().get(network).cloned().unwrap_or_default())
    }

    fn save(&self, network: &str, config: &NetworkConfig) -> Result<(), StoreError> {
        validate_segment(network)?;
        self.configs
            .borrow_mut()
            .insert(network.to_string(), config.clone());
        Ok(())
    }
}
