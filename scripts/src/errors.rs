//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use deployments::StoreError;

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or writing the deployment stores
    Store(StoreError),
    /// Error initializing the RPC client or signer
    ClientInitialization(String),
    /// Error reading or parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error constructing calldata for a constructor or contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error fetching the nonce of the deployer
    NonceFetching(String),
    /// An operator-supplied value failed validation
    Validation(String),
    /// The signer lacks the role required for a call
    Unauthorized {
        /// The signing account
        account: String,
        /// The role that was checked, in hex
        role: String,
    },
    /// Error collecting input from the operator
    Prompt(String),
    /// The network is not in the catalog
    UnknownNetwork(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Store(e) => write!(f, "{}", e),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::NonceFetching(s) => write!(f, "error fetching nonce: {}", s),
            ScriptError::Validation(s) => write!(f, "invalid value: {}", s),
            ScriptError::Unauthorized { account, role } => {
                write!(f, "signer {} does not have role {}", account, role)
            }
            ScriptError::Prompt(s) => write!(f, "error reading input: {}", s),
            ScriptError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
        }
    }
}

impl Error for ScriptError {}

impl From<StoreError> for ScriptError {
    fn from(e: StoreError) -> Self {
        ScriptError::Store(e)
    }
}

impl From<eyre::Report> for ScriptError {
    fn from(e: eyre::Report) -> Self {
        ScriptError::Prompt(e.to_string())
    }
}
