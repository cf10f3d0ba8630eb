//! Host boundary
//!
//! The wallet never moves value or calls other contracts itself. It asks the
//! host runtime through the [`Host`] trait. [`SimulatedHost`] is an
//! in-memory runtime used by the CLI and by tests.

pub mod simulated;

use crate::codec::ParamValue;
use crate::core::Address;
use thiserror::Error;

pub use simulated::{CallRecord, DeployedContract, SimulatedHost};

/// Failures reported by the host runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Balance overflow: crediting {0} exceeds the maximum balance")]
    BalanceOverflow(Address),
    #[error("Contract not found: {0}")]
    ContractNotFound(Address),
    #[error("Method not found: {contract}.{method}")]
    MethodNotFound { contract: Address, method: String },
    #[error("Call rejected: {0}")]
    Rejected(String),
}

/// Primitives the wallet consumes from its runtime
pub trait Host {
    /// Move `amount` from `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), HostError>;

    /// Invoke `method` on `target`, sending `value` along
    ///
    /// Implementations must leave their state untouched when they fail.
    fn call(
        &mut self,
        from: &Address,
        target: &Address,
        method: &str,
        args: &[ParamValue],
        value: u128,
    ) -> Result<(), HostError>;
}
