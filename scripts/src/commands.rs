//! Implementations of the deployment workflows

use std::str::FromStr;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash, B256},
    rpc::types::TransactionRequest,
    sol_types::{SolCall, SolValue},
};
use chrono::{Local, SubsecRound};
use colored::Colorize;
use deployments::{ConfigStore, DeploymentRecord, NetworkInfo, RecordStore};
use serde_json::Value;
use tool_utils::{validate_address, validate_u128, validate_u64, Choice, Prompter};
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    chain::Chain,
    constants::PROXY_CONTRACT_NAME,
    errors::ScriptError,
    solidity::hasRoleCall,
};

/// A selected network along with the chain connection to it
pub struct Network<C> {
    /// The catalog name of the network
    pub name: String,
    /// The connection to the network
    pub chain: C,
    /// The gas price to submit transactions with, if fixed by the operator
    pub gas_price: Option<u128>,
}

/// The stores the workflows read and write
#[derive(Clone, Copy)]
pub struct Stores<'a> {
    /// The deployment records
    pub records: &'a dyn RecordStore,
    /// The per-network configuration documents
    pub configs: &'a dyn ConfigStore,
    /// The compiled contracts
    pub artifacts: &'a ArtifactStore,
}

// ----------
// | Inputs |
// ----------

/// Prompt for the nonce of the next transaction, defaulting to the account's pending count
pub async fn prompt_nonce<C: Chain>(
    chain: &C,
    account: Address,
    prompter: &mut dyn Prompter,
) -> Result<u64, ScriptError> {
    let pending = chain.transaction_count(account).await?;
    let answer = prompter.input("Nonce", Some(&pending.to_string()), &validate_u64)?;
    answer
        .trim()
        .parse()
        .map_err(|_| ScriptError::Validation(format!("nonce `{answer}`")))
}

/// Prompt for the gas price, defaulting to the chain's current price or the
/// catalog's suggestion when the chain cannot be asked
pub async fn prompt_gas_price<C: Chain>(
    chain: &C,
    info: &NetworkInfo,
    prompter: &mut dyn Prompter,
) -> Result<u128, ScriptError> {
    let suggested = match chain.gas_price().await {
        Ok(price) => Some(price),
        Err(e) => {
            warn!("could not fetch gas price: {}", e);
            info.gas_price
        }
    };

    let default = suggested.map(|price| price.to_string());
    let answer = prompter.input("Gas price (wei)", default.as_deref(), &validate_u128)?;
    answer
        .trim()
        .parse()
        .map_err(|_| ScriptError::Validation(format!("gas price `{answer}`")))
}

/// Prompt for an address, validated as such
fn prompt_address(
    prompter: &mut dyn Prompter,
    message: &str,
    default: Option<Address>,
) -> Result<Address, ScriptError> {
    let default = default.map(|address| address.to_string());
    let answer = prompter.input(message, default.as_deref(), &validate_address)?;
    Address::from_str(answer.trim()).map_err(|e| ScriptError::Validation(e.to_string()))
}

fn signer_address<C: Chain>(network: &Network<C>) -> Result<Address, ScriptError> {
    network.chain.sender().ok_or_else(|| {
        ScriptError::ClientInitialization(format!("no signer configured for {}", network.name))
    })
}

/// Fill in the nonce, gas price and gas limit of `tx`
async fn prepare_tx<C: Chain>(
    network: &Network<C>,
    prompter: &mut dyn Prompter,
    sender: Address,
    tx: TransactionRequest,
) -> Result<TransactionRequest, ScriptError> {
    let nonce = prompt_nonce(&network.chain, sender, prompter).await?;
    let mut tx = tx.with_from(sender).with_nonce(nonce);
    if let Some(gas_price) = network.gas_price {
        tx = tx.with_gas_price(gas_price);
    }

    let gas = network.chain.estimate_gas(&tx).await?;
    Ok(tx.with_gas_limit(gas))
}

// --------------
// | Deployment |
// --------------

/// Deploy the contract compiled as `artifact_name`, recording it under
/// `record_name`, and return its address.
///
/// The current record of the identity is archived before the deployment
/// transaction is submitted.
pub async fn deploy_contract<C: Chain>(
    network: &Network<C>,
    stores: Stores<'_>,
    prompter: &mut dyn Prompter,
    artifact_name: &str,
    record_name: &str,
    is_proxy: bool,
    args: &[String],
) -> Result<Address, ScriptError> {
    let sender = signer_address(network)?;
    let encoded = stores.artifacts.load(artifact_name)?.encode_constructor(args)?;

    let tx = TransactionRequest::default().with_deploy_code(encoded.deploy_code);
    let tx = prepare_tx(network, prompter, sender, tx).await?;
    stores.records.archive(&network.name, record_name, is_proxy)?;

    info!("deploying {} to {}", artifact_name, network.name);
    let outcome = network
        .chain
        .send(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
    if !outcome.success {
        return Err(ScriptError::ContractDeployment(format!(
            "deployment transaction {:#x} reverted",
            outcome.tx_hash
        )));
    }
    let address = outcome.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "no contract address in receipt of {:#x}",
            outcome.tx_hash
        ))
    })?;

    let record = DeploymentRecord {
        contract_name: Some(artifact_name.to_string()),
        address: Some(address),
        created_by: Some(sender),
        created_at: Some(Local::now().fixed_offset().trunc_subsecs(0)),
        creation_tx_hash: Some(outcome.tx_hash),
        constructor_arguments: encoded.arguments,
        constructor_argument_parameter_defs: Some(encoded.parameter_defs),
        libraries: None,
    };
    stores.records.save(&network.name, record_name, &record, is_proxy)?;
    stores
        .configs
        .record_deployed_address(&network.name, record_name, address, is_proxy)?;

    info!(
        "deployed {} at {} by tx {:#x}",
        record_name,
        address.to_string().green(),
        outcome.tx_hash
    );
    Ok(address)
}

/// Deploy `contract_name`, or reuse one of its existing deployments if the
/// operator declines to redeploy
pub async fn load_or_deploy_impl<C: Chain>(
    network: &Network<C>,
    stores: Stores<'_>,
    prompter: &mut dyn Prompter,
    contract_name: &str,
    args: &[String],
) -> Result<Address, ScriptError> {
    let existing = stores
        .configs
        .deployed_addresses(&network.name, contract_name, false)?;
    if !existing.is_empty() && !confirm_redeploy(prompter, contract_name, &network.name)? {
        let address = prompt_address(
            prompter,
            &format!("Address of {contract_name}"),
            existing.first().copied(),
        )?;
        warn_if_no_code(&network.chain, address).await?;
        return Ok(address);
    }

    deploy_contract(network, stores, prompter, contract_name, contract_name, false, args).await
}

/// Deploy an upgradeable proxy in front of `impl_address`, or reuse an
/// existing proxy of `impl_name` if the operator declines to redeploy.
///
/// When `init` is given, the proxy calls that function of the implementation
/// with the given arguments on construction. The chosen proxy admin is saved
/// to the network configuration once the proxy is deployed.
pub async fn load_or_deploy_proxy<C: Chain>(
    network: &Network<C>,
    stores: Stores<'_>,
    prompter: &mut dyn Prompter,
    impl_name: &str,
    impl_address: Address,
    init: Option<(&str, &[String])>,
) -> Result<Address, ScriptError> {
    let existing = stores
        .configs
        .deployed_addresses(&network.name, impl_name, true)?;
    let proxy_name = format!("{impl_name} proxy");
    if !existing.is_empty() && !confirm_redeploy(prompter, &proxy_name, &network.name)? {
        let address = prompt_address(
            prompter,
            &format!("Address of {proxy_name}"),
            existing.first().copied(),
        )?;
        warn_if_no_code(&network.chain, address).await?;
        return Ok(address);
    }

    let init_data = match init {
        Some((function, args)) => {
            stores.artifacts.load(impl_name)?.encode_call(function, args)?
        }
        None => Bytes::new(),
    };

    let default_admin = stores
        .configs
        .load(&network.name)?
        .proxy_admin()
        .or(network.chain.sender());
    let admin = prompt_address(prompter, "Proxy admin address", default_admin)?;
    let args = [impl_address.to_string(), admin.to_string(), init_data.to_string()];

    let proxy =
        deploy_contract(network, stores, prompter, PROXY_CONTRACT_NAME, impl_name, true, &args)
            .await?;

    // Reloaded since the deployment registered the proxy address
    let mut config = stores.configs.load(&network.name)?;
    if config.proxy_admin() != Some(admin) {
        config.set_proxy_admin(admin);
        stores.configs.save(&network.name, &config)?;
    }

    Ok(proxy)
}

fn confirm_redeploy(
    prompter: &mut dyn Prompter,
    name: &str,
    network: &str,
) -> Result<bool, ScriptError> {
    Ok(prompter.confirm(&format!("{name} is already deployed on {network}, redeploy?"), false)?)
}

async fn warn_if_no_code<C: Chain>(chain: &C, address: Address) -> Result<(), ScriptError> {
    if !chain.code_exists(address).await? {
        warn!("no contract code at {}", address.to_string().yellow());
    }
    Ok(())
}

// ----------------
// | Transactions |
// ----------------

/// Whether `account` holds `role` on the access-controlled contract at `address`
pub async fn has_role<C: Chain>(
    chain: &C,
    address: Address,
    role: B256,
    account: Address,
) -> Result<bool, ScriptError> {
    let calldata = hasRoleCall { role, account }.abi_encode();
    let tx = TransactionRequest::default()
        .with_to(address)
        .with_input(calldata);

    let output = chain.call(tx).await?;
    bool::abi_decode(&output).map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}

/// Call `function` of the `contract_name` instance at `address`, returning the
/// transaction hash.
///
/// If `required_role` is given and the signer does not hold it, fails with
/// [`ScriptError::Unauthorized`] before anything is submitted.
#[allow(clippy::too_many_arguments)]
pub async fn send_transaction<C: Chain>(
    network: &Network<C>,
    artifacts: &ArtifactStore,
    prompter: &mut dyn Prompter,
    contract_name: &str,
    address: Address,
    function: &str,
    args: &[String],
    required_role: Option<B256>,
) -> Result<TxHash, ScriptError> {
    let sender = signer_address(network)?;
    if let Some(role) = required_role {
        if !has_role(&network.chain, address, role, sender).await? {
            return Err(ScriptError::Unauthorized {
                account: sender.to_string(),
                role: role.to_string(),
            });
        }
    }

    let calldata = artifacts.load(contract_name)?.encode_call(function, args)?;
    let tx = TransactionRequest::default()
        .with_to(address)
        .with_input(calldata);
    let tx = prepare_tx(network, prompter, sender, tx).await?;

    let outcome = network.chain.send(tx).await?;
    if !outcome.success {
        return Err(ScriptError::ContractInteraction(format!(
            "call to {} reverted in tx {:#x}",
            function, outcome.tx_hash
        )));
    }

    info!(
        "called {} at {} by tx {:#x}",
        function.cyan(),
        address,
        outcome.tx_hash
    );
    Ok(outcome.tx_hash)
}

// -----------
// | Lookups |
// -----------

/// Prompt for one of the deployments of the identity, newest first
pub fn select_deployed(
    configs: &dyn ConfigStore,
    prompter: &mut dyn Prompter,
    network: &str,
    contract_name: &str,
    is_proxy: bool,
) -> Result<Address, ScriptError> {
    let deployed = configs.deployed_addresses(network, contract_name, is_proxy)?;
    if deployed.is_empty() {
        return Err(ScriptError::Validation(format!(
            "{contract_name} has no deployments on {network}"
        )));
    }

    let choices: Vec<Choice> = deployed
        .iter()
        .enumerate()
        .map(|(i, address)| {
            let label = if i == 0 {
                format!("{address} (latest)")
            } else {
                address.to_string()
            };
            Choice::new(label, address.to_string())
        })
        .collect();

    let answer = prompter.select(&format!("Deployment of {contract_name}"), &choices)?;
    Address::from_str(&answer).map_err(|e| ScriptError::Validation(e.to_string()))
}

/// The address in the identity's current record
pub fn current_address(
    records: &dyn RecordStore,
    network: &str,
    contract_name: &str,
    is_proxy: bool,
) -> Result<Option<Address>, ScriptError> {
    Ok(records.load(network, contract_name, is_proxy)?.address)
}

/// The record of the instance deployed at `address`
pub fn lookup_record(
    records: &dyn RecordStore,
    network: &str,
    address: &Address,
) -> Result<DeploymentRecord, ScriptError> {
    Ok(records.load_by_address(network, address)?)
}

/// The token mapping configured for `proxy`
pub fn token_mapping(
    configs: &dyn ConfigStore,
    network: &str,
    proxy: &Address,
) -> Result<Value, ScriptError> {
    Ok(configs.load(network)?.token_mapping(proxy))
}

/// Replace the token mapping configured for `proxy`
pub fn set_token_mapping(
    configs: &dyn ConfigStore,
    network: &str,
    proxy: &Address,
    mapping: Value,
) -> Result<(), ScriptError> {
    let mut config = configs.load(network)?;
    config.set_token_mapping(proxy, mapping);
    configs.save(network, &config)?;

    info!("updated token mapping of {} on {}", proxy, network);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use alloy::{
        primitives::{address, Address, Bytes, TxKind, B256},
        rpc::types::TransactionRequest,
        sol_types::{SolCall, SolValue},
    };
    use deployments::{
        ConfigStore, MemConfigStore, MemRecordStore, NetworkCatalog, RecordStore,
    };
    use serde_json::json;
    use tempfile::TempDir;
    use tool_utils::ScriptedPrompter;

    use super::{
        deploy_contract, load_or_deploy_impl, load_or_deploy_proxy, prompt_gas_price,
        select_deployed, send_transaction, set_token_mapping, token_mapping, Network, Stores,
    };
    use crate::{
        artifacts::{
            tests::{proxy_abi, token_abi, write_artifact},
            ArtifactStore,
        },
        chain::{Chain, TxOutcome},
        constants::{DEFAULT_ADMIN_ROLE, PROXY_CONTRACT_NAME},
        errors::ScriptError,
        solidity::hasRoleCall,
    };

    const SENDER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const PENDING_NONCE: u64 = 7;
    const GAS_PRICE: u128 = 1_000_000_000;

    /// A chain that mines every transaction instantly
    #[derive(Default)]
    struct MockChain {
        sender: Option<Address>,
        roles: Vec<(B256, Address)>,
        sent: RefCell<Vec<TransactionRequest>>,
    }

    impl MockChain {
        fn with_sender() -> Self {
            Self {
                sender: Some(SENDER),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<TransactionRequest> {
            self.sent.borrow().clone()
        }
    }

    impl Chain for MockChain {
        fn sender(&self) -> Option<Address> {
            self.sender
        }

        async fn transaction_count(&self, _account: Address) -> Result<u64, ScriptError> {
            Ok(PENDING_NONCE)
        }

        async fn gas_price(&self) -> Result<u128, ScriptError> {
            Ok(GAS_PRICE)
        }

        async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, ScriptError> {
            Ok(100_000)
        }

        async fn send(&self, tx: TransactionRequest) -> Result<TxOutcome, ScriptError> {
            let mut sent = self.sent.borrow_mut();
            sent.push(tx.clone());
            let n = sent.len() as u8;

            let contract_address = match tx.to {
                Some(TxKind::Create) => Some(Address::with_last_byte(n)),
                _ => None,
            };
            Ok(TxOutcome {
                tx_hash: B256::with_last_byte(n),
                contract_address,
                success: true,
            })
        }

        async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ScriptError> {
            let input = tx.input.input().cloned().unwrap_or_default();
            let call = hasRoleCall::abi_decode(&input)
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            let has_role = self.roles.contains(&(call.role, call.account));
            Ok(has_role.abi_encode().into())
        }

        async fn code_exists(&self, _address: Address) -> Result<bool, ScriptError> {
            Ok(true)
        }
    }

    struct Fixture {
        records: MemRecordStore,
        configs: MemConfigStore,
        artifacts: ArtifactStore,
        _dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            write_artifact(dir.path(), "Token", token_abi());
            write_artifact(dir.path(), PROXY_CONTRACT_NAME, proxy_abi());

            Self {
                records: MemRecordStore::new(),
                configs: MemConfigStore::new(),
                artifacts: ArtifactStore::new(dir.path()),
                _dir: dir,
            }
        }

        fn stores(&self) -> Stores<'_> {
            Stores {
                records: &self.records,
                configs: &self.configs,
                artifacts: &self.artifacts,
            }
        }
    }

    fn network(chain: MockChain) -> Network<MockChain> {
        Network {
            name: "sepolia".to_string(),
            chain,
            gas_price: Some(GAS_PRICE),
        }
    }

    fn token_args() -> Vec<String> {
        vec![SENDER.to_string(), "1000".to_string()]
    }

    #[tokio::test]
    async fn test_deploy_contract_records_deployment() {
        let fixture = Fixture::new();
        let net = network(MockChain::with_sender());
        let mut prompter = ScriptedPrompter::new([""]);

        let address = deploy_contract(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            "Token",
            false,
            &token_args(),
        )
        .await
        .unwrap();
        assert_eq!(address, Address::with_last_byte(1));

        let sent = net.chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].nonce, Some(PENDING_NONCE));
        assert_eq!(sent[0].gas_price, Some(GAS_PRICE));
        assert_eq!(sent[0].gas, Some(100_000));

        let record = fixture.records.load("sepolia", "Token", false).unwrap();
        assert_eq!(record.contract_name.as_deref(), Some("Token"));
        assert_eq!(record.address, Some(address));
        assert_eq!(record.created_by, Some(SENDER));
        assert_eq!(record.creation_tx_hash, Some(B256::with_last_byte(1)));
        assert!(record.created_at.is_some());
        assert_eq!(record.constructor_arguments, vec![json!(SENDER.to_string()), json!("1000")]);
        let defs = record.constructor_argument_parameter_defs.unwrap();
        assert_eq!(defs[0].name, "owner");
        assert_eq!(defs[0].ty, "address");

        let deployed = fixture
            .configs
            .deployed_addresses("sepolia", "Token", false)
            .unwrap();
        assert_eq!(deployed, vec![address]);
    }

    #[tokio::test]
    async fn test_redeploy_archives_previous_record() {
        let fixture = Fixture::new();
        let net = network(MockChain::with_sender());
        let mut prompter = ScriptedPrompter::new(["", "8"]);

        let first = deploy_contract(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            "Token",
            false,
            &token_args(),
        )
        .await
        .unwrap();
        let second = deploy_contract(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            "Token",
            false,
            &token_args(),
        )
        .await
        .unwrap();

        assert_eq!(net.chain.sent()[1].nonce, Some(8));
        assert_eq!(
            fixture.records.names("sepolia"),
            vec!["Token".to_string(), format!("Token-{first}")]
        );
        assert_eq!(
            fixture.records.load_by_address("sepolia", &first).unwrap().address,
            Some(first)
        );
        assert_eq!(
            fixture.configs.deployed_addresses("sepolia", "Token", false).unwrap(),
            vec![second, first]
        );
    }

    #[tokio::test]
    async fn test_deploy_without_signer() {
        let fixture = Fixture::new();
        let net = network(MockChain::default());
        let mut prompter = ScriptedPrompter::new([""]);

        let res = deploy_contract(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            "Token",
            false,
            &token_args(),
        )
        .await;
        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
        assert_eq!(prompter.remaining(), 1);
        assert!(fixture.records.names("sepolia").is_empty());
    }

    #[tokio::test]
    async fn test_load_or_deploy_impl_reuses_existing() {
        let fixture = Fixture::new();
        let existing = Address::with_last_byte(0x42);
        fixture
            .configs
            .record_deployed_address("sepolia", "Token", existing, false)
            .unwrap();

        let net = network(MockChain::with_sender());
        let mut prompter = ScriptedPrompter::new(["n", ""]);
        let address =
            load_or_deploy_impl(&net, fixture.stores(), &mut prompter, "Token", &token_args())
                .await
                .unwrap();

        assert_eq!(address, existing);
        assert!(net.chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_load_or_deploy_impl_redeploys_on_confirm() {
        let fixture = Fixture::new();
        let existing = Address::with_last_byte(0x42);
        fixture
            .configs
            .record_deployed_address("sepolia", "Token", existing, false)
            .unwrap();

        let net = network(MockChain::with_sender());
        let mut prompter = ScriptedPrompter::new(["y", ""]);
        let address =
            load_or_deploy_impl(&net, fixture.stores(), &mut prompter, "Token", &token_args())
                .await
                .unwrap();

        assert_eq!(address, Address::with_last_byte(1));
        assert_eq!(
            fixture.configs.deployed_addresses("sepolia", "Token", false).unwrap(),
            vec![address, existing]
        );
    }

    #[tokio::test]
    async fn test_load_or_deploy_proxy() {
        let fixture = Fixture::new();
        let net = network(MockChain::with_sender());
        let impl_address = Address::with_last_byte(0x42);
        let init_args = vec![SENDER.to_string()];

        // Admin defaults to the signer, then the nonce
        let mut prompter = ScriptedPrompter::new(["", ""]);
        let proxy = load_or_deploy_proxy(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            impl_address,
            Some(("initialize", init_args.as_slice())),
        )
        .await
        .unwrap();

        let config = fixture.configs.load("sepolia").unwrap();
        assert_eq!(config.proxy_admin(), Some(SENDER));
        assert_eq!(config.deployed_addresses("Token", true), vec![proxy]);
        assert!(config.deployed_addresses("Token", false).is_empty());

        let record = fixture.records.load("sepolia", "Token", true).unwrap();
        assert_eq!(record.contract_name.as_deref(), Some(PROXY_CONTRACT_NAME));
        assert_eq!(record.address, Some(proxy));
        assert_eq!(record.constructor_arguments[0], json!(impl_address.to_string()));
        assert_eq!(record.constructor_arguments[1], json!(SENDER.to_string()));
        // initialize(address) selector
        let init_data = record.constructor_arguments[2].as_str().unwrap();
        assert!(init_data.starts_with("0xc4d66de8"));
    }

    #[tokio::test]
    async fn test_load_or_deploy_proxy_bad_initializer_writes_nothing() {
        let fixture = Fixture::new();
        let net = network(MockChain::with_sender());
        let mut prompter = ScriptedPrompter::new(["", ""]);
        let no_args: Vec<String> = Vec::new();

        let res = load_or_deploy_proxy(
            &net,
            fixture.stores(),
            &mut prompter,
            "Token",
            Address::with_last_byte(0x42),
            Some(("noSuchFn", no_args.as_slice())),
        )
        .await;

        assert!(matches!(res, Err(ScriptError::CalldataConstruction(_))));
        assert!(fixture.configs.load("sepolia").unwrap().is_empty());
        assert!(fixture.records.names("sepolia").is_empty());
        assert!(net.chain.sent().is_empty());
        assert_eq!(prompter.remaining(), 2);
    }

    #[tokio::test]
    async fn test_send_transaction_requires_role() {
        let fixture = Fixture::new();
        let net = network(MockChain::with_sender());
        let token = Address::with_last_byte(0x42);
        let mut prompter = ScriptedPrompter::new([""]);
        let args = vec![SENDER.to_string(), "5".to_string()];

        let res = send_transaction(
            &net,
            &fixture.artifacts,
            &mut prompter,
            "Token",
            token,
            "mint",
            &args,
            Some(DEFAULT_ADMIN_ROLE),
        )
        .await;

        assert!(matches!(res, Err(ScriptError::Unauthorized { .. })));
        assert!(net.chain.sent().is_empty());
        assert_eq!(prompter.remaining(), 1);
    }

    #[tokio::test]
    async fn test_send_transaction_with_role() {
        let fixture = Fixture::new();
        let chain = MockChain {
            roles: vec![(DEFAULT_ADMIN_ROLE, SENDER)],
            ..MockChain::with_sender()
        };
        let net = network(chain);
        let token = Address::with_last_byte(0x42);
        let mut prompter = ScriptedPrompter::new([""]);
        let args = vec![SENDER.to_string(), "5".to_string()];

        let tx_hash = send_transaction(
            &net,
            &fixture.artifacts,
            &mut prompter,
            "Token",
            token,
            "mint",
            &args,
            Some(DEFAULT_ADMIN_ROLE),
        )
        .await
        .unwrap();

        let sent = net.chain.sent();
        assert_eq!(tx_hash, B256::with_last_byte(1));
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, Some(TxKind::Call(token)));
        assert_eq!(sent[0].from, Some(SENDER));
    }

    #[tokio::test]
    async fn test_prompt_gas_price_defaults_to_chain() {
        let chain = MockChain::with_sender();
        let info = NetworkCatalog::builtin().get("sepolia").unwrap().clone();
        let mut prompter = ScriptedPrompter::new(["", "42"]);

        assert_eq!(prompt_gas_price(&chain, &info, &mut prompter).await.unwrap(), GAS_PRICE);
        assert_eq!(prompt_gas_price(&chain, &info, &mut prompter).await.unwrap(), 42);
    }

    #[test]
    fn test_select_deployed() {
        let configs = MemConfigStore::new();
        let old = Address::with_last_byte(1);
        let new = Address::with_last_byte(2);
        configs.record_deployed_address("sepolia", "Token", old, true).unwrap();
        configs.record_deployed_address("sepolia", "Token", new, true).unwrap();

        let mut prompter = ScriptedPrompter::new(["2"]);
        assert_eq!(
            select_deployed(&configs, &mut prompter, "sepolia", "Token", true).unwrap(),
            old
        );
        assert!(select_deployed(&configs, &mut prompter, "sepolia", "Token", false).is_err());
    }

    #[test]
    fn test_token_mapping_round_trip() {
        let configs = MemConfigStore::new();
        let proxy = Address::with_last_byte(9);
        assert_eq!(token_mapping(&configs, "sepolia", &proxy).unwrap(), json!({}));

        let mapping = json!({ "USDC": "0x0000000000000000000000000000000000000001" });
        set_token_mapping(&configs, "sepolia", &proxy, mapping.clone()).unwrap();
        assert_eq!(token_mapping(&configs, "sepolia", &proxy).unwrap(), mapping);
    }
}
