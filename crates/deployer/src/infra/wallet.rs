//! A [`Wallet`] backed by a JSON-RPC node and a local private key.

use {
    crate::domain::execution::{Call, Receipt, Wallet, WalletError},
    alloy::{
        network::EthereumWallet,
        primitives::{Address, B256, Bytes},
        providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
        transports::{RpcError, TransportError},
    },
    anyhow::Context,
};

/// EIP-1193 error code of a request the user declined.
const USER_REJECTED: i64 = 4001;

pub struct NodeWallet {
    provider: DynProvider,
    account: Address,
}

impl NodeWallet {
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> anyhow::Result<Self> {
        let url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL {rpc_url:?}"))?;
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .connect_http(url)
            .erased();
        Ok(Self { provider, account })
    }
}

#[async_trait::async_trait]
impl Wallet for NodeWallet {
    async fn connect(&self) -> Result<Address, WalletError> {
        Ok(self.account)
    }

    async fn account(&self) -> Result<Option<Address>, WalletError> {
        Ok(Some(self.account))
    }

    /// A node cannot change its chain, so this only verifies that it serves
    /// the expected one.
    async fn switch_network(&self, chain_id: u64) -> Result<(), WalletError> {
        let actual = self.provider.get_chain_id().await.map_err(wallet_error)?;
        if actual != chain_id {
            return Err(WalletError::WrongNetwork {
                expected: chain_id,
                actual,
            });
        }
        Ok(())
    }

    async fn simulate(&self, call: &Call) -> Result<Bytes, WalletError> {
        self.provider
            .call(request(call))
            .await
            .map_err(wallet_error)
    }

    async fn send(&self, call: &Call) -> Result<B256, WalletError> {
        let pending = self
            .provider
            .send_transaction(request(call))
            .await
            .map_err(wallet_error)?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, transaction_hash: B256) -> Result<Receipt, WalletError> {
        let receipt =
            PendingTransactionBuilder::new(self.provider.root().clone(), transaction_hash)
                .get_receipt()
                .await
                .context("failed to wait for the deployment receipt")?;
        Ok(Receipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }
}

fn request(call: &Call) -> TransactionRequest {
    TransactionRequest::default()
        .from(call.from)
        .to(call.to)
        .input(call.data.clone().into())
}

fn wallet_error(err: TransportError) -> WalletError {
    match err {
        RpcError::ErrorResp(payload) if payload.code == USER_REJECTED => WalletError::Rejected,
        err => WalletError::Other(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::rpc::json_rpc::ErrorPayload};

    #[test]
    fn maps_user_rejection() {
        let rejected = ErrorPayload {
            code: USER_REJECTED,
            message: "User rejected the request.".into(),
            data: None,
        };
        assert!(matches!(
            wallet_error(RpcError::ErrorResp(rejected)),
            WalletError::Rejected
        ));
        assert!(matches!(
            wallet_error(RpcError::ErrorResp(ErrorPayload::internal_error())),
            WalletError::Other(_)
        ));
    }

    #[test]
    fn wallet_account_is_signer_address() {
        let signer = PrivateKeySigner::random();
        let address = signer.address();
        let wallet = NodeWallet::new("http://127.0.0.1:8545", signer).unwrap();
        assert_eq!(wallet.account, address);
        assert!(NodeWallet::new("not a url", PrivateKeySigner::random()).is_err());
    }
}
