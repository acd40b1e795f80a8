//! The chain the deploy scripts submit transactions to

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::debug;

use crate::errors::ScriptError;

/// The outcome of a mined transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The address of the contract the transaction created, if any
    pub contract_address: Option<Address>,
    /// Whether the transaction succeeded
    pub success: bool,
}

/// The RPC surface used by the workflows
#[allow(async_fn_in_trait)]
pub trait Chain {
    /// The account transactions are signed by, if a signer is configured
    fn sender(&self) -> Option<Address>;

    /// The number of transactions sent from `account`, including pending ones
    async fn transaction_count(&self, account: Address) -> Result<u64, ScriptError>;

    /// The chain's current gas price, in wei
    async fn gas_price(&self) -> Result<u128, ScriptError>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ScriptError>;

    /// Submit `tx` and wait for its receipt
    async fn send(&self, tx: TransactionRequest) -> Result<TxOutcome, ScriptError>;

    /// Execute `tx` as a call against the latest block
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ScriptError>;

    /// Whether any code is deployed at `address`
    async fn code_exists(&self, address: Address) -> Result<bool, ScriptError>;
}

/// A [`Chain`] backed by an HTTP JSON-RPC provider with a local signer
#[derive(Clone)]
pub struct AlloyChain {
    /// The provider, with the signer's wallet attached
    provider: DynProvider,
    /// The signer's address
    sender: Address,
}

impl AlloyChain {
    /// Connect to `rpc_url`, signing with `signer`
    pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ScriptError> {
        let url =
            Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        let sender = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            provider: DynProvider::new(provider),
            sender,
        })
    }
}

impl Chain for AlloyChain {
    fn sender(&self) -> Option<Address> {
        Some(self.sender)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, ScriptError> {
        self.provider
            .get_transaction_count(account)
            .pending()
            .await
            .map_err(|e| ScriptError::NonceFetching(e.to_string()))
    }

    async fn gas_price(&self) -> Result<u128, ScriptError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ScriptError> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn send(&self, tx: TransactionRequest) -> Result<TxOutcome, ScriptError> {
        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        debug!("sent transaction {:#x}", pending_tx.tx_hash());

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            success: receipt.status(),
        })
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ScriptError> {
        self.provider
            .call(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn code_exists(&self, address: Address) -> Result<bool, ScriptError> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        Ok(!code.is_empty())
    }
}
