//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy::primitives::{Address, B256};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use deployments::{
    constants::DEFAULT_DEPLOYMENTS_DIR, ConfigStore, FsConfigStore, FsRecordStore,
    NetworkCatalog, RecordStore, StoreError,
};
use tool_utils::Prompter;
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    commands::{
        current_address, load_or_deploy_impl, load_or_deploy_proxy, lookup_record,
        select_deployed, send_transaction, set_token_mapping, token_mapping, Stores,
    },
    constants::{DEFAULT_ADMIN_ROLE, DEFAULT_ARTIFACTS_DIR},
    errors::ScriptError,
    utils::{connect, load_catalog, select_network_name},
};

#[derive(Parser)]
pub struct Cli {
    /// Root directory of the per-network deployment stores
    #[arg(long, env = "DEPLOYMENTS_DIR", default_value = DEFAULT_DEPLOYMENTS_DIR, global = true)]
    pub deployments_dir: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR, global = true)]
    pub artifacts_dir: PathBuf,

    /// JSON file describing the available networks, the builtin networks are used if unset
    #[arg(long, env = "NETWORKS_FILE", global = true)]
    pub networks: Option<PathBuf>,

    /// The network to operate on, selected interactively if unset
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build the stores and catalog the command operates on
    pub fn context(&self) -> Result<Context, ScriptError> {
        Ok(Context {
            catalog: load_catalog(self.networks.as_deref())?,
            records: FsRecordStore::new(&self.deployments_dir),
            configs: FsConfigStore::new(&self.deployments_dir),
            artifacts: ArtifactStore::new(&self.artifacts_dir),
            network: self.network.clone(),
        })
    }
}

/// Everything a command needs besides its own arguments
pub struct Context {
    /// The networks that can be targeted
    pub catalog: NetworkCatalog,
    /// The deployment records
    pub records: FsRecordStore,
    /// The per-network configuration documents
    pub configs: FsConfigStore,
    /// The compiled contracts
    pub artifacts: ArtifactStore,
    /// The network given on the command line, if any
    pub network: Option<String>,
}

impl Context {
    fn stores(&self) -> Stores<'_> {
        Stores {
            records: &self.records,
            configs: &self.configs,
            artifacts: &self.artifacts,
        }
    }

    fn network_name(&self, prompter: &mut dyn Prompter) -> Result<String, ScriptError> {
        select_network_name(&self.catalog, self.network.as_deref(), prompter)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the networks that can be targeted
    Networks,
    /// Print the cross-chain endpoint of every configured network
    Endpoints,
    Deploy(DeployArgs),
    DeployProxy(DeployProxyArgs),
    Call(CallArgs),
    Info(InfoArgs),
    Address(AddressArgs),
    TokenMapping(TokenMappingArgs),
    Archive(ArchiveArgs),
}

/// Deploy a contract, or pick one of its existing deployments
#[derive(Args)]
pub struct DeployArgs {
    /// Name of the contract's artifact
    pub contract: String,

    /// Constructor arguments, in declaration order
    pub args: Vec<String>,
}

/// Deploy a `TransparentUpgradeableProxy` in front of an implementation
/// contract.
///
/// The proxy is recorded under the implementation's name.
#[derive(Args)]
pub struct DeployProxyArgs {
    /// Name of the implementation contract's artifact
    pub implementation: String,

    /// Address of the implementation, selected from its deployments if unset
    #[arg(long)]
    pub impl_address: Option<Address>,

    /// Implementation function the proxy calls on construction
    #[arg(long)]
    pub init: Option<String>,

    /// Arguments of the initializer
    #[arg(long = "init-arg")]
    pub init_args: Vec<String>,
}

/// Send a transaction calling a deployed contract
#[derive(Args)]
pub struct CallArgs {
    /// Name of the contract's artifact
    pub contract: String,

    /// Function to call
    pub function: String,

    /// Function arguments, in declaration order
    pub args: Vec<String>,

    /// Address of the contract, selected from its deployments if unset
    #[arg(long)]
    pub address: Option<Address>,

    /// Select from the deployments of the contract's proxy
    #[arg(long)]
    pub proxy: bool,

    /// Role the signer must hold before the call is sent
    #[arg(long, conflicts_with = "admin")]
    pub role: Option<B256>,

    /// Require the signer to hold the default admin role
    #[arg(long)]
    pub admin: bool,
}

/// Print the deployment record of an address
#[derive(Args)]
pub struct InfoArgs {
    pub address: Address,
}

/// Print the address of a contract's current deployment
#[derive(Args)]
pub struct AddressArgs {
    pub contract: String,

    #[arg(long)]
    pub proxy: bool,
}

/// Print or replace the token mapping of a proxy
#[derive(Args)]
pub struct TokenMappingArgs {
    /// Address of the proxy
    pub proxy: Address,

    /// The new mapping, as a JSON object
    #[arg(long)]
    pub set: Option<String>,
}

/// Archive the current deployment record of a contract
#[derive(Args)]
pub struct ArchiveArgs {
    pub contract: String,

    #[arg(long)]
    pub proxy: bool,
}

impl Command {
    pub async fn run(self, ctx: &Context, prompter: &mut dyn Prompter) -> Result<(), ScriptError> {
        match self {
            Command::Networks => {
                for (label, _) in ctx.catalog.choices() {
                    println!("{}", label);
                }
            }
            Command::Endpoints => {
                for (network, mapping) in ctx.configs.endpoint_mappings(&ctx.catalog)? {
                    println!("{}: {} {}", network, mapping.endpoint_id, mapping.endpoint);
                }
            }
            Command::Deploy(args) => {
                let name = ctx.network_name(prompter)?;
                let network = connect(&ctx.catalog, &name, prompter).await?;
                load_or_deploy_impl(&network, ctx.stores(), prompter, &args.contract, &args.args)
                    .await?;
            }
            Command::DeployProxy(args) => {
                let name = ctx.network_name(prompter)?;
                let network = connect(&ctx.catalog, &name, prompter).await?;
                let impl_address = match args.impl_address {
                    Some(address) => address,
                    None => select_deployed(
                        &ctx.configs,
                        prompter,
                        &name,
                        &args.implementation,
                        false,
                    )?,
                };
                let init = args.init.as_deref().map(|f| (f, args.init_args.as_slice()));
                load_or_deploy_proxy(
                    &network,
                    ctx.stores(),
                    prompter,
                    &args.implementation,
                    impl_address,
                    init,
                )
                .await?;
            }
            Command::Call(args) => {
                let name = ctx.network_name(prompter)?;
                let address = match args.address {
                    Some(address) => address,
                    None => {
                        select_deployed(&ctx.configs, prompter, &name, &args.contract, args.proxy)?
                    }
                };
                let role = if args.admin { Some(DEFAULT_ADMIN_ROLE) } else { args.role };

                let network = connect(&ctx.catalog, &name, prompter).await?;
                send_transaction(
                    &network,
                    &ctx.artifacts,
                    prompter,
                    &args.contract,
                    address,
                    &args.function,
                    &args.args,
                    role,
                )
                .await?;
            }
            Command::Info(args) => {
                let name = ctx.network_name(prompter)?;
                let record = lookup_record(&ctx.records, &name, &args.address)?;
                let json = serde_json::to_string_pretty(&record)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                println!("{}", json);
            }
            Command::Address(args) => {
                let name = ctx.network_name(prompter)?;
                match current_address(&ctx.records, &name, &args.contract, args.proxy)? {
                    Some(address) => println!("{}", address),
                    None => info!("{} has no current deployment on {}", args.contract, name),
                }
            }
            Command::TokenMapping(args) => {
                let name = ctx.network_name(prompter)?;
                match args.set {
                    Some(mapping) => {
                        let mapping = serde_json::from_str(&mapping)
                            .map_err(|e| ScriptError::Validation(e.to_string()))?;
                        set_token_mapping(&ctx.configs, &name, &args.proxy, mapping)?;
                    }
                    None => println!("{:#}", token_mapping(&ctx.configs, &name, &args.proxy)?),
                }
            }
            Command::Archive(args) => {
                let name = ctx.network_name(prompter)?;
                ctx.records.archive(&name, &args.contract, args.proxy)?;
                info!("archived {} on {}", args.contract.yellow(), name);
            }
        }

        Ok(())
    }
}
