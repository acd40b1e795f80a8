//! Type definitions for the persisted deployment documents

use std::{collections::BTreeMap, str::FromStr};

use alloy_primitives::{Address, TxHash};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, NoneAsEmptyString};
use tracing::warn;

use crate::constants::{
    LZ_ENDPOINT_ID_KEY, LZ_ENDPOINT_KEY, PROXY_ADMIN_KEY, PROXY_SUFFIX, TOKEN_MAPPING_KEY,
};

/// The name under which a contract's record and registry entry are stored,
/// i.e. the contract name, suffixed with `-proxy` for its proxy
pub fn record_name(contract_name: &str, is_proxy: bool) -> String {
    if is_proxy {
        format!("{contract_name}{PROXY_SUFFIX}")
    } else {
        contract_name.to_string()
    }
}

// ---------------------
// | Deployment Record |
// ---------------------

/// Metadata describing one deployed contract instance.
///
/// The default value, with every field absent, is the record returned
/// for an identity that has never been saved.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The name of the contract's source definition
    #[serde(rename = "contract", default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    /// The checksummed address of the instance, empty until the deployment succeeds
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// The account that deployed the instance
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Address>,
    /// When the instance was deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// The hash of the deployment transaction
    #[serde(rename = "creationTx", default, skip_serializing_if = "Option::is_none")]
    pub creation_tx_hash: Option<TxHash>,
    /// The constructor arguments, in declaration order
    #[serde(default)]
    pub constructor_arguments: Vec<Value>,
    /// The name and type of each constructor parameter
    #[serde(
        rename = "constructorArgumentsDefs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub constructor_argument_parameter_defs: Option<Vec<ParamDef>>,
    /// Linked library addresses, keyed by library name
    #[serde_as(as = "Option<BTreeMap<_, DisplayFromStr>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries: Option<BTreeMap<String, Address>>,
}

impl DeploymentRecord {
    /// Whether this is the sentinel record returned for a missing identity
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the record carries an on-chain address
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }
}

/// The name and type of a single constructor parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    /// The parameter name
    pub name: String,
    /// The Solidity type of the parameter
    #[serde(rename = "type")]
    pub ty: String,
}

// ----------------------------------
// | Network Configuration Document |
// ----------------------------------

/// A cross-chain endpoint configured for a network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMapping {
    /// The endpoint identifier of the network
    #[serde(rename = "lzEndpointId")]
    pub endpoint_id: u64,
    /// The address of the endpoint contract on the network
    #[serde(rename = "lzEndpoint")]
    pub endpoint: String,
}

/// A free-form per-network configuration document.
///
/// All mutators operate on the in-memory document; persisting it is the
/// caller's job via [`crate::net_config::ConfigStore::save`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkConfig(Map<String, Value>);

impl NetworkConfig {
    /// An empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Store `value` under `key`, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The configured proxy admin, if any
    pub fn proxy_admin(&self) -> Option<Address> {
        self.get(PROXY_ADMIN_KEY)
            .and_then(Value::as_str)
            .and_then(|s| Address::from_str(s).ok())
    }

    pub fn set_proxy_admin(&mut self, proxy_admin: Address) {
        self.insert(PROXY_ADMIN_KEY, Value::String(proxy_admin.to_string()));
    }

    /// The token mapping stored for the given proxy, or an empty object
    pub fn token_mapping(&self, proxy: &Address) -> Value {
        self.get(TOKEN_MAPPING_KEY)
            .and_then(Value::as_object)
            .and_then(|mappings| lookup_address_key(mappings, proxy))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Replace the token mapping stored for the given proxy
    pub fn set_token_mapping(&mut self, proxy: &Address, mapping: Value) {
        let mappings = self
            .0
            .entry(TOKEN_MAPPING_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !mappings.is_object() {
            *mappings = Value::Object(Map::new());
        }

        if let Value::Object(mappings) = mappings {
            // Drop entries keyed by a differently-cased spelling of the same address
            let stale: Vec<String> = mappings
                .keys()
                .filter(|k| Address::from_str(k).map(|a| a == *proxy).unwrap_or(false))
                .cloned()
                .collect();
            for key in stale {
                mappings.remove(&key);
            }
            mappings.insert(proxy.to_string(), mapping);
        }
    }

    /// The cross-chain endpoint identifier, accepting numbers or numeric strings
    pub fn lz_endpoint_id(&self) -> Option<u64> {
        match self.get(LZ_ENDPOINT_ID_KEY)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The cross-chain endpoint address
    pub fn lz_endpoint(&self) -> Option<String> {
        self.get(LZ_ENDPOINT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// The endpoint mapping, if both the identifier and address are configured
    pub fn endpoint_mapping(&self) -> Option<EndpointMapping> {
        if !self.contains_key(LZ_ENDPOINT_ID_KEY) || !self.contains_key(LZ_ENDPOINT_KEY) {
            return None;
        }

        match (self.lz_endpoint_id(), self.lz_endpoint()) {
            (Some(endpoint_id), Some(endpoint)) => Some(EndpointMapping {
                endpoint_id,
                endpoint,
            }),
            _ => {
                warn!("ignoring malformed endpoint configuration");
                None
            }
        }
    }

    /// The addresses deployed under `name`, most recent first.
    ///
    /// Entries written as a single address string are read as a
    /// one-element list.
    pub fn deployed_addresses(&self, name: &str, is_proxy: bool) -> Vec<Address> {
        let key = record_name(name, is_proxy);
        let parse = |v: &Value| {
            let parsed = v.as_str().and_then(|s| Address::from_str(s).ok());
            if parsed.is_none() {
                warn!("ignoring malformed address {v} under `{key}`");
            }
            parsed
        };

        match self.get(&key) {
            Some(Value::Array(values)) => values.iter().filter_map(&parse).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => parse(value).into_iter().collect(),
        }
    }

    /// Record a new deployment of `name` at `address`, newest first.
    ///
    /// Recording the address that is already the most recent one leaves
    /// the document untouched. Existing entries are kept as stored, even
    /// those that do not parse as addresses. Returns whether the document
    /// changed.
    pub fn record_deployed_address(
        &mut self,
        name: &str,
        address: Address,
        is_proxy: bool,
    ) -> bool {
        let key = record_name(name, is_proxy);
        let mut values = match self.get(&key) {
            Some(Value::Array(values)) => values.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value.clone()],
        };

        let head = values
            .first()
            .and_then(Value::as_str)
            .and_then(|s| Address::from_str(s).ok());
        if head == Some(address) {
            return false;
        }

        values.insert(0, Value::String(address.to_string()));
        self.insert(key, Value::Array(values));
        true
    }
}

/// Find the value keyed by `address` in a map whose keys are address strings
/// of arbitrary case
fn lookup_address_key<'a>(map: &'a Map<String, Value>, address: &Address) -> Option<&'a Value> {
    map.get(&address.to_string()).or_else(|| {
        map.iter()
            .find(|(k, _)| Address::from_str(k).map(|a| a == *address).unwrap_or(false))
            .map(|(_, v)| v)
    })
}
