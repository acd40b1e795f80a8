//! Utilities for the deploy scripts.

use std::{env, path::Path, str::FromStr};

use alloy::signers::local::PrivateKeySigner;
use deployments::NetworkCatalog;
use tool_utils::{validate_private_key, Choice, Prompter};
use tracing::{info, warn};

use crate::{
    chain::AlloyChain,
    commands::{prompt_gas_price, Network},
    constants::PRIVKEY_ENV_SUFFIX,
    errors::ScriptError,
};

/// Load the network catalog from `path`, or use the builtin one
pub fn load_catalog(path: Option<&Path>) -> Result<NetworkCatalog, ScriptError> {
    match path {
        Some(path) => Ok(NetworkCatalog::from_file(path)?),
        None => Ok(NetworkCatalog::builtin()),
    }
}

/// Resolve the network to operate on, prompting for one if none was given
pub fn select_network_name(
    catalog: &NetworkCatalog,
    network: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<String, ScriptError> {
    if let Some(network) = network {
        return match catalog.get(network) {
            Some(_) => Ok(network.to_string()),
            None => Err(ScriptError::UnknownNetwork(network.to_string())),
        };
    }

    let choices: Vec<Choice> = catalog
        .choices()
        .into_iter()
        .map(|(label, name)| Choice::new(label, name))
        .collect();
    Ok(prompter.select("Select network", &choices)?)
}

/// The environment variable holding the deployer key for `network`
pub fn privkey_env_var(network: &str) -> String {
    format!("{}{}", network.to_uppercase(), PRIVKEY_ENV_SUFFIX)
}

/// Load the deployer key for `network` from the environment, prompting for it
/// if the variable is unset or invalid
pub fn load_private_key(
    network: &str,
    prompter: &mut dyn Prompter,
) -> Result<PrivateKeySigner, ScriptError> {
    let var = privkey_env_var(network);
    let key = match env::var(&var) {
        Ok(key) if validate_private_key(&key).is_ok() => key,
        Ok(_) => {
            warn!("{} is not a valid private key", var);
            prompt_private_key(network, prompter)?
        }
        Err(_) => prompt_private_key(network, prompter)?,
    };

    PrivateKeySigner::from_str(key.trim())
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

fn prompt_private_key(network: &str, prompter: &mut dyn Prompter) -> Result<String, ScriptError> {
    Ok(prompter.password(&format!("Private key for {network}"), &validate_private_key)?)
}

/// Connect to `network` with the deployer's signer and prompt for the gas
/// price to submit transactions with
pub async fn connect(
    catalog: &NetworkCatalog,
    network: &str,
    prompter: &mut dyn Prompter,
) -> Result<Network<AlloyChain>, ScriptError> {
    let info = catalog
        .get(network)
        .ok_or_else(|| ScriptError::UnknownNetwork(network.to_string()))?;

    let signer = load_private_key(network, prompter)?;
    info!("using account {}", signer.address());

    let chain = AlloyChain::connect(&info.url, signer)?;
    let gas_price = prompt_gas_price(&chain, info, prompter).await?;

    info!("connected to {} ({}) at {}", network, info.chain_id, info.url);
    Ok(Network {
        name: network.to_string(),
        chain,
        gas_price: Some(gas_price),
    })
}
