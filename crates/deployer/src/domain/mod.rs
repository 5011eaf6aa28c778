pub mod coerce;
pub mod encoding;
pub mod execution;
pub mod manager;
pub mod resolve;
pub mod session;

pub use {
    encoding::{EncodeError, encode},
    execution::{Deploy, Deployed, ExecutionError, Executor, Stage, Wallet, WalletError},
    manager::{ManagerCall, Plan, PlanError},
    resolve::manager_address,
    session::{SelectionError, Session},
};

/// Raw operator input keyed by constructor field name.
pub type ParameterValues = std::collections::BTreeMap<String, String>;
