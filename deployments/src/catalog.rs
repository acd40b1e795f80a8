//! The static catalog of networks that deployments can target

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{errors::StoreError, utils::read_json_file};

/// Connection details of a single network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// The RPC endpoint of the network
    pub url: String,
    /// The EIP-155 chain id
    pub chain_id: u64,
    /// The gas price to suggest when the chain cannot be asked for one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
}

/// A read-only mapping from network name to its connection details
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkCatalog(BTreeMap<String, NetworkInfo>);

impl NetworkCatalog {
    /// Load a catalog from a JSON file of the form
    /// `{ "<name>": { "url": ..., "chainId": ..., "gasPrice": ... } }`
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        read_json_file(path)?
            .ok_or_else(|| StoreError::ReadFile(format!("{}: no such file", path.display())))
    }

    /// The networks the deploy scripts ship with
    pub fn builtin() -> Self {
        let networks = [
            ("metertest", "https://rpctest.meter.io", 83, Some(500_000_000_000)),
            ("meterstage", "http://rpc-stage.meter.io", 82, Some(500_000_000_000)),
            ("metermain", "https://rpc.meter.io", 82, Some(500_000_000_000)),
            (
                "sepolia",
                "https://ethereum-sepolia-rpc.publicnode.com",
                11155111,
                Some(4_000_000_000_000),
            ),
            (
                "ethereum",
                "https://ethereum-rpc.publicnode.com",
                1,
                Some(4_000_000_000_000),
            ),
            ("basetest", "https://goerli.base.org", 84531, None),
            ("basemain", "https://base.publicnode.com", 8453, None),
            ("arbitrum", "https://arb1.arbitrum.io/rpc", 42161, None),
        ];

        networks
            .into_iter()
            .map(|(name, url, chain_id, gas_price)| {
                let info = NetworkInfo {
                    url: url.to_string(),
                    chain_id,
                    gas_price,
                };
                (name.to_string(), info)
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&NetworkInfo> {
        self.0.get(name)
    }

    /// The network names, in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkInfo)> {
        self.0.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Labelled choices for selecting a network, as `(label, name)` pairs
    pub fn choices(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(name, info)| {
                let label = format!("{name} ({}) : {}", info.chain_id, info.url);
                (label, name.to_string())
            })
            .collect()
    }
}

impl FromIterator<(String, NetworkInfo)> for NetworkCatalog {
    fn from_iter<I: IntoIterator<Item = (String, NetworkInfo)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
