//! Wallet notifications
//!
//! Operations never perform I/O themselves. Every notification they raise is
//! returned to the caller inside a [`Receipt`] and flushed by the host.

use crate::core::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable wallet events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    Deposit {
        from: Address,
        amount: u128,
    },
    DepositToken {
        from: Address,
        amount: u128,
        #[serde(with = "hex_bytes")]
        data: Vec<u8>,
    },
    Submission {
        transaction_id: u64,
    },
    Confirmation {
        owner: Address,
        transaction_id: u64,
    },
    Revocation {
        owner: Address,
        transaction_id: u64,
    },
    Execution {
        transaction_id: u64,
    },
    ExecutionFailure {
        transaction_id: u64,
    },
    WalletOwnerAddition {
        owner: Address,
    },
    WalletOwnerRemoval {
        owner: Address,
    },
    RequirementChange {
        required: usize,
    },
}

impl WalletEvent {
    /// Event name as seen by external observers
    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::Deposit { .. } => "Deposit",
            WalletEvent::DepositToken { .. } => "DepositToken",
            WalletEvent::Submission { .. } => "Submission",
            WalletEvent::Confirmation { .. } => "Confirmation",
            WalletEvent::Revocation { .. } => "Revocation",
            WalletEvent::Execution { .. } => "Execution",
            WalletEvent::ExecutionFailure { .. } => "ExecutionFailure",
            WalletEvent::WalletOwnerAddition { .. } => "WalletOwnerAddition",
            WalletEvent::WalletOwnerRemoval { .. } => "WalletOwnerRemoval",
            WalletEvent::RequirementChange { .. } => "RequirementChange",
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEvent::Deposit { from, amount } => write!(f, "Deposit({}, {})", from, amount),
            WalletEvent::DepositToken { from, amount, data } => write!(
                f,
                "DepositToken({}, {}, 0x{})",
                from,
                amount,
                hex::encode(data)
            ),
            WalletEvent::Submission { transaction_id }
            | WalletEvent::Execution { transaction_id }
            | WalletEvent::ExecutionFailure { transaction_id } => {
                write!(f, "{}({})", self.name(), transaction_id)
            }
            WalletEvent::Confirmation {
                owner,
                transaction_id,
            }
            | WalletEvent::Revocation {
                owner,
                transaction_id,
            } => write!(f, "{}({}, {})", self.name(), owner, transaction_id),
            WalletEvent::WalletOwnerAddition { owner }
            | WalletEvent::WalletOwnerRemoval { owner } => {
                write!(f, "{}({})", self.name(), owner)
            }
            WalletEvent::RequirementChange { required } => {
                write!(f, "RequirementChange({})", required)
            }
        }
    }
}

/// Result of a state-changing wallet operation together with the events it raised
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    pub events: Vec<WalletEvent>,
}

impl<T> Receipt<T> {
    pub fn new(value: T, events: Vec<WalletEvent>) -> Self {
        Self { value, events }
    }

    /// Check whether an event was raised
    pub fn emitted(&self, event: &WalletEvent) -> bool {
        self.events.contains(event)
    }

    /// Names of the raised events, in emission order
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.iter().map(WalletEvent::name).collect()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
