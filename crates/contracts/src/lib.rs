//! Bindings for the on-chain contracts the deployment console talks to.

pub mod networks {
    pub const MAINNET: u64 = 1;
    pub const GNOSIS: u64 = 100;
    pub const SEPOLIA: u64 = 11155111;
    pub const ARBITRUM_ONE: u64 = 42161;
    pub const BASE: u64 = 8453;
    pub const POLYGON: u64 = 137;
    pub const OPTIMISM: u64 = 10;
}

use alloy::json_abi::Event;

alloy::sol! {
    /// Dispatcher contract that creates contracts from registered templates
    /// or raw creation code.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IDeploymentManager {
        event ContractDeployed(
            bytes32 indexed templateId,
            address indexed contractAddress,
            address indexed deployer
        );

        function deployTemplate(bytes32 templateId, bytes initData)
            external
            returns (address deployed);

        function deployBytecode(bytes bytecode, bytes initData)
            external
            returns (address deployed);

        function deployDeterministic(bytes32 templateId, bytes initData, bytes32 salt)
            external
            returns (address deployed);
    }
}

/// Name of the event the manager emits for every created contract.
pub const DEPLOYED_EVENT: &str = "ContractDeployed";

const DEPLOYED_EVENT_DEFINITION: &str = "event ContractDeployed(bytes32 indexed templateId, \
                                         address indexed contractAddress, address indexed \
                                         deployer)";

/// JSON ABI definition of [`IDeploymentManager::ContractDeployed`], for
/// decoding receipts without static types.
pub fn deployed_event() -> Event {
    Event::parse(DEPLOYED_EVENT_DEFINITION).expect("static event definition is valid")
}
