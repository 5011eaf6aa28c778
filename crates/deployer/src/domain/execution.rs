//! Sequencing of one on-chain deployment through a wallet.
//!
//! The executor walks through [`Stage`]s strictly in order. A failure at any
//! stage ends in [`Stage::Failed`], except for the network switch and the dry
//! run which are best effort.

use {
    super::{
        ParameterValues,
        encoding::{self, EncodeError},
        manager::{ManagerCall, Plan},
    },
    alloy::{
        dyn_abi::{DynSolValue, EventExt},
        json_abi::Event,
        primitives::{Address, B256, Bytes, Log},
    },
    chrono::Utc,
    model::TemplateField,
    std::sync::Arc,
    tracing::instrument,
};

/// Field names that carry the new contract's address in the deployment
/// event, by preference.
const ADDRESS_FIELDS: [&str; 2] = ["contractAddress", "deployed"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Idle,
    Connecting,
    SwitchingNetwork,
    Encoding,
    Calling,
    AwaitingReceipt,
    Done,
    Failed,
}

/// A contract call as handed to the wallet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Call {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// The parts of a transaction receipt the executor needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

/// Capabilities of the operator's wallet.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// Requests access to the operator's account.
    async fn connect(&self) -> Result<Address, WalletError>;

    /// The currently selected account, if access was granted.
    async fn account(&self) -> Result<Option<Address>, WalletError>;

    /// Asks the wallet to use the network with the given chain id.
    async fn switch_network(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Executes the call without changing any state and returns its output.
    async fn simulate(&self, call: &Call) -> Result<Bytes, WalletError>;

    /// Signs and submits the call as a transaction, returning its hash.
    async fn send(&self, call: &Call) -> Result<B256, WalletError>;

    /// Waits for the transaction to be mined.
    async fn receipt(&self, transaction_hash: B256) -> Result<Receipt, WalletError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet is available")]
    Unavailable,
    #[error("the request was rejected in the wallet")]
    Rejected,
    #[error("wallet is on chain {actual} instead of {expected}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything needed to deploy one template.
#[derive(Clone, Debug)]
pub struct Deploy<'a> {
    pub plan: &'a Plan,
    pub fields: &'a [TemplateField],
    pub params: &'a ParameterValues,
    pub manager: Address,
    pub chain_id: u64,
    /// Whether to simulate the call first to learn the new address early.
    pub dry_run: bool,
}

/// A deployment that was mined.
#[derive(Clone, Debug, PartialEq)]
pub struct Deployed {
    pub account: Address,
    pub call: ManagerCall,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `None` if the address could neither be predicted nor found in the
    /// receipt. The contract exists regardless.
    pub contract_address: Option<Address>,
    pub predicted: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("deployment failed while {stage}: {reason}")]
pub struct ExecutionError {
    pub stage: Stage,
    #[source]
    pub reason: Reason,
}

impl ExecutionError {
    pub fn is_rejection(&self) -> bool {
        matches!(self.reason, Reason::Wallet(WalletError::Rejected))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Reason {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

pub struct Executor {
    wallet: Arc<dyn Wallet>,
    stages: Vec<Stage>,
}

impl Executor {
    pub fn new(wallet: Arc<dyn Wallet>) -> Self {
        Self {
            wallet,
            stages: vec![Stage::Idle],
        }
    }

    pub fn stage(&self) -> Stage {
        *self.stages.last().unwrap_or(&Stage::Idle)
    }

    /// All stages this executor went through.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn advance(&mut self, next: Stage) {
        let current = self.stage();
        debug_assert!(next > current, "stage went from {current} back to {next}");
        tracing::debug!(from = %current, to = %next, "deployment stage");
        self.stages.push(next);
    }

    fn fail(&mut self, reason: impl Into<Reason>) -> ExecutionError {
        let stage = self.stage();
        self.advance(Stage::Failed);
        ExecutionError {
            stage,
            reason: reason.into(),
        }
    }

    #[instrument(skip_all, fields(template = %deploy.plan.template_id, manager = %deploy.manager))]
    pub async fn execute(&mut self, deploy: Deploy<'_>) -> Result<Deployed, ExecutionError> {
        self.advance(Stage::Connecting);
        let account = match self.wallet.connect().await {
            Ok(account) => account,
            Err(err) => return Err(self.fail(err)),
        };
        tracing::debug!(%account, "wallet connected");

        self.advance(Stage::SwitchingNetwork);
        if let Err(err) = self.wallet.switch_network(deploy.chain_id).await {
            tracing::warn!(?err, chain_id = deploy.chain_id, "could not switch network, continuing");
        }

        self.advance(Stage::Encoding);
        let init = match encoding::encode(deploy.fields, deploy.params) {
            Ok(init) => init,
            Err(err) => return Err(self.fail(err)),
        };
        let manager_call = deploy.plan.call(init, Utc::now());
        let call = Call {
            from: account,
            to: deploy.manager,
            data: manager_call.calldata(),
        };

        self.advance(Stage::Calling);
        let prediction = if deploy.dry_run {
            self.predict(&manager_call, &call).await
        } else {
            None
        };
        let transaction_hash = match self.wallet.send(&call).await {
            Ok(hash) => hash,
            Err(err) => return Err(self.fail(err)),
        };
        tracing::info!(?transaction_hash, method = %manager_call.method(), "deployment submitted");

        self.advance(Stage::AwaitingReceipt);
        let receipt = match self.wallet.receipt(transaction_hash).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.fail(err)),
        };
        let contract_address = prediction.or_else(|| {
            deployed_address(&deploy.plan.event_name, &deploy.plan.event, &receipt.logs)
        });
        if contract_address.is_none() {
            tracing::warn!(
                ?transaction_hash,
                event = %deploy.plan.event_name,
                "deployment mined but the contract address could not be recovered"
            );
        }

        self.advance(Stage::Done);
        Ok(Deployed {
            account,
            call: manager_call,
            transaction_hash,
            block_number: receipt.block_number,
            contract_address,
            predicted: prediction.is_some(),
        })
    }

    /// Dry runs the call to learn the new contract's address before sending.
    async fn predict(&self, manager_call: &ManagerCall, call: &Call) -> Option<Address> {
        let output = self
            .wallet
            .simulate(call)
            .await
            .inspect_err(|err| tracing::debug!(?err, "dry run failed"))
            .ok()?;
        manager_call
            .decode_output(&output)
            .inspect_err(|err| tracing::debug!(?err, "unexpected dry run output"))
            .ok()
            .filter(|address| !address.is_zero())
    }
}

/// Finds the new contract's address in the first log of the expected event.
///
/// Only that log is decoded. If it does not carry an address, later logs of
/// the same event are not consulted.
pub fn deployed_address(event_name: &str, event: &Event, logs: &[Log]) -> Option<Address> {
    if event.name != event_name {
        return None;
    }
    let log = logs
        .iter()
        .find(|log| event.anonymous || log.topics().first() == Some(&event.selector()))?;
    let decoded = event
        .decode_log(&log.data)
        .inspect_err(|err| tracing::debug!(?err, "undecodable deployment event"))
        .ok()?;
    let mut indexed = decoded.indexed.into_iter();
    let mut body = decoded.body.into_iter();
    let fields: Vec<(&str, DynSolValue)> = event
        .inputs
        .iter()
        .filter_map(|input| {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            }?;
            Some((input.name.as_str(), value))
        })
        .collect();
    ADDRESS_FIELDS.iter().find_map(|wanted| {
        fields
            .iter()
            .find(|(name, _)| name == wanted)
            .and_then(|(_, value)| value.as_address())
    })
}
