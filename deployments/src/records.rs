//! The deployment record store.
//!
//! Each network keeps one "current" record per (contract name, proxy flag)
//! identity. Redeploying under the same identity first archives the current
//! record by embedding its address in its name.

use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use colored::Colorize;
use tracing::{debug, info};

use crate::{
    constants::{ARCHIVE_SEPARATOR, CONFIG_FILE_STEM, JSON_EXTENSION},
    errors::StoreError,
    types::{record_name, DeploymentRecord},
    utils::{read_json_file, validate_record_name, validate_segment, write_json_file},
};

/// The name under which a record deployed at `address` is archived
pub fn archived_name(name: &str, address: &Address) -> String {
    format!("{name}{ARCHIVE_SEPARATOR}{address}")
}

/// Persists metadata about deployed contract instances
pub trait RecordStore {
    /// Write `record` as the current record of the identity, overwriting
    /// any existing current record without archiving it
    fn save(
        &self,
        network: &str,
        contract_name: &str,
        record: &DeploymentRecord,
        is_proxy: bool,
    ) -> Result<(), StoreError>;

    /// The current record of the identity, or an empty record if there is none
    fn load(
        &self,
        network: &str,
        contract_name: &str,
        is_proxy: bool,
    ) -> Result<DeploymentRecord, StoreError>;

    /// Find the record, current or archived, deployed at `address`.
    ///
    /// Fails with [`StoreError::NotFound`] if no record on the network matches.
    fn load_by_address(
        &self,
        network: &str,
        address: &Address,
    ) -> Result<DeploymentRecord, StoreError>;

    /// Retire the current record of the identity so that a new deployment
    /// can take its place.
    ///
    /// A current record without an address never reached the chain and is
    /// left untouched for the next save to overwrite.
    fn archive(&self, network: &str, contract_name: &str, is_proxy: bool)
        -> Result<(), StoreError>;
}

// --------------------
// | Filesystem Store |
// --------------------

/// A record store keeping one JSON file per record under `<root>/<network>/`
#[derive(Clone, Debug)]
pub struct FsRecordStore {
    /// The root directory of the deployments
    root: PathBuf,
}

impl FsRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn network_dir(&self, network: &str) -> Result<PathBuf, StoreError> {
        validate_segment(network)?;
        Ok(self.root.join(network))
    }

    fn record_path(&self, network: &str, name: &str) -> Result<PathBuf, StoreError> {
        validate_record_name(name)?;
        Ok(self
            .network_dir(network)?
            .join(format!("{name}.{JSON_EXTENSION}")))
    }

    /// Whether a file in a network directory may hold a deployment record
    fn is_record_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == JSON_EXTENSION)
            && path.file_stem().is_some_and(|stem| stem != CONFIG_FILE_STEM)
    }
}

impl RecordStore for FsRecordStore {
    fn save(
        &self,
        network: &str,
        contract_name: &str,
        record: &DeploymentRecord,
        is_proxy: bool,
    ) -> Result<(), StoreError> {
        let path = self.record_path(network, &record_name(contract_name, is_proxy))?;
        write_json_file(&path, record)?;

        info!("saved contract info: {}", path.display().to_string().yellow());
        Ok(())
    }

    fn load(
        &self,
        network: &str,
        contract_name: &str,
        is_proxy: bool,
    ) -> Result<DeploymentRecord, StoreError> {
        let path = self.record_path(network, &record_name(contract_name, is_proxy))?;
        let record = read_json_file(&path)?;
        if record.is_none() {
            debug!("no contract info at {}", path.display());
        }

        Ok(record.unwrap_or_default())
    }

    fn load_by_address(
        &self,
        network: &str,
        address: &Address,
    ) -> Result<DeploymentRecord, StoreError> {
        let mut queue = VecDeque::from([self.network_dir(network)?]);
        while let Some(dir) = queue.pop_front() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::ReadFile(format!("{}: {}", dir.display(), e))),
            };

            // Sort the entries so that the scan order only depends on the layout
            let mut paths = entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::ReadFile(format!("{}: {}", dir.display(), e)))?;
            paths.sort();

            for path in paths {
                // Symlinked directories are not followed
                let is_dir = fs::symlink_metadata(&path).is_ok_and(|m| m.is_dir());
                if is_dir {
                    queue.push_back(path);
                    continue;
                }
                if !Self::is_record_file(&path) {
                    continue;
                }

                match read_json_file::<DeploymentRecord>(&path) {
                    Ok(Some(record)) if record.address.as_ref() == Some(address) => {
                        debug!("found {} at {}", address, path.display());
                        return Ok(record);
                    }
                    Ok(_) => {}
                    Err(e) => debug!("skipping {}: {}", path.display(), e),
                }
            }
        }

        Err(StoreError::NotFound {
            network: network.to_string(),
            address: address.to_string(),
        })
    }

    fn archive(
        &self,
        network: &str,
        contract_name: &str,
        is_proxy: bool,
    ) -> Result<(), StoreError> {
        let name = record_name(contract_name, is_proxy);
        let path = self.record_path(network, &name)?;
        let Some(record) = read_json_file::<DeploymentRecord>(&path)? else {
            return Ok(());
        };
        let Some(address) = record.address else {
            return Ok(());
        };

        let new_path = self.record_path(network, &archived_name(&name, &address))?;
        write_json_file(&new_path, &record)?;
        fs::remove_file(&path)
            .map_err(|e| StoreError::WriteFile(format!("{}: {}", path.display(), e)))?;

        info!(
            "moved contract info: {} -> {}",
            path.display(),
            new_path.display().to_string().yellow()
        );
        Ok(())
    }
}

// -------------------
// | In-Memory Store |
// -------------------

/// A record store held entirely in memory, with the same naming and
/// archival rules as [`FsRecordStore`]
#[derive(Debug, Default)]
pub struct MemRecordStore {
    /// Records keyed by network, then by stored name
    records: RefCell<BTreeMap<String, BTreeMap<String, DeploymentRecord>>>,
}

impl MemRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored names of every record on the network, in scan order
    pub fn names(&self, network: &str) -> Vec<String> {
        self.records
            .borrow()
            .get(network)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl RecordStore for MemRecordStore {
    fn save(
        &self,
        network: &str,
        contract_name: &str,
        record: &DeploymentRecord,
        is_proxy: bool,
    ) -> Result<(), StoreError> {
        validate_segment(network)?;
        let name = record_name(contract_name, is_proxy);
        validate_record_name(&name)?;

        self.records
            .borrow_mut()
            .entry(network.to_string())
            .or_default()
            .insert(name, record.clone());
        Ok(())
    }

    fn load(
        &self,
        network: &str,
        contract_name: &str,
        is_proxy: bool,
    ) -> Result<DeploymentRecord, StoreError> {
        validate_segment(network)?;
        let name = record_name(contract_name, is_proxy);
        validate_record_name(&name)?;

        Ok(self
            .records
            .borrow()
            .get(network)
            .and_then(|records| records.get(&name))
            .cloned()
            .unwrap_or_default())
    }

    fn load_by_address(
        &self,
        network: &str,
        address: &Address,
    ) -> Result<DeploymentRecord, StoreError> {
        self.records
            .borrow()
            .get(network)
            .and_then(|records| {
                records
                    .values()
                    .find(|r| r.address.as_ref() == Some(address))
                    .cloned()
            })
            .ok_or_else(|| StoreError::NotFound {
                network: network.to_string(),
                address: address.to_string(),
            })
    }

    fn archive(
        &self,
        network: &str,
        contract_name: &str,
        is_proxy: bool,
    ) -> Result<(), StoreError> {
        validate_segment(network)?;
        let name = record_name(contract_name, is_proxy);
        validate_record_name(&name)?;

        let mut records = self.records.borrow_mut();
        let Some(records) = records.get_mut(network) else {
            return Ok(());
        };
        let Some(address) = records.get(&name).and_then(|r| r.address) else {
            return Ok(());
        };

        if let Some(record) = records.remove(&name) {
            records.insert(archived_name(&name, &address), record);
        }
        Ok(())
    }
}
