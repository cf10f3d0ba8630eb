//! Owner registry
//!
//! Holds the wallet owners and the confirmation quorum (M-of-N). Mutators are
//! only reachable through the approval pipeline once a governance
//! transaction has reached quorum.

use crate::codec::CodecError;
use crate::core::{Address, WalletEvent};
use crate::host::HostError;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by wallet operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Unauthorized: {0} is not a wallet owner")]
    Unauthorized(Address),
    #[error("Invalid destination: transaction has no destination")]
    InvalidDestination,
    #[error("Invalid requirement: {required} (owner count {owners})")]
    InvalidRequirement { required: BigInt, owners: usize },
    #[error("Duplicate owner: {0}")]
    DuplicateOwner(Address),
    #[error("Unknown owner: {0}")]
    UnknownOwner(Address),
    #[error("Cannot remove the last owner: {0}")]
    LastOwner(Address),
    #[error("Invalid owner: {0}")]
    InvalidOwner(Address),
    #[error("Invalid owner list: {0}")]
    InvalidOwnerList(String),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(u64),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Transaction {transaction_id} already confirmed by {owner}")]
    AlreadyConfirmed { owner: Address, transaction_id: u64 },
    #[error("Transaction {transaction_id} not confirmed by {owner}")]
    NotConfirmed { owner: Address, transaction_id: u64 },
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error(transparent)]
    MalformedParams(#[from] CodecError),
    #[error("Unknown wallet method: {0}")]
    UnknownMethod(String),
    #[error("Argument mismatch for {method}: expected {expected}")]
    ArgumentMismatch {
        method: &'static str,
        expected: &'static str,
    },
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Owner set and confirmation quorum of a wallet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerRegistry {
    /// Owners in insertion order
    owners: Vec<Address>,
    /// Confirmations required to execute a transaction
    required: usize,
}

impl OwnerRegistry {
    /// Create a registry
    ///
    /// # Errors
    /// Returns error if the owner list is empty or has duplicates, or if
    /// `required` is outside `1..=owners.len()`
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, WalletError> {
        if owners.is_empty() {
            return Err(WalletError::InvalidOwnerList(
                "at least one owner is required".to_string(),
            ));
        }

        for (i, owner) in owners.iter().enumerate() {
            if owners[..i].contains(owner) {
                return Err(WalletError::DuplicateOwner(*owner));
            }
        }

        Self::check_requirement(&BigInt::from(required), owners.len())?;

        Ok(Self { owners, required })
    }

    /// Create a registry from a comma-separated owner list
    pub fn from_owner_list(list: &str, required: usize) -> Result<Self, WalletError> {
        let owners = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|e| WalletError::InvalidOwnerList(format!("{}: {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(owners, required)
    }

    fn check_requirement(required: &BigInt, owner_count: usize) -> Result<usize, WalletError> {
        usize::try_from(required)
            .ok()
            .filter(|r| (1..=owner_count).contains(r))
            .ok_or_else(|| WalletError::InvalidRequirement {
                required: required.clone(),
                owners: owner_count,
            })
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn requirement(&self) -> usize {
        self.required
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Number of confirmations given by current owners
    ///
    /// Approvals from owners removed since they confirmed do not count.
    pub fn count_confirmations(&self, confirmations: &[Address]) -> usize {
        confirmations.iter().filter(|c| self.is_owner(c)).count()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required, self.owners.len())
    }

    pub(crate) fn add_owner(&mut self, owner: Address) -> Result<Vec<WalletEvent>, WalletError> {
        if self.is_owner(&owner) {
            return Err(WalletError::DuplicateOwner(owner));
        }

        self.owners.push(owner);
        log::info!("Wallet owner added: {} ({})", owner, self.description());

        Ok(vec![WalletEvent::WalletOwnerAddition { owner }])
    }

    /// Remove an owner, lowering the quorum if it would exceed the owner count
    pub(crate) fn remove_owner(&mut self, owner: Address) -> Result<Vec<WalletEvent>, WalletError> {
        let position = self
            .owners
            .iter()
            .position(|o| *o == owner)
            .ok_or(WalletError::UnknownOwner(owner))?;

        if self.owners.len() == 1 {
            return Err(WalletError::LastOwner(owner));
        }

        self.owners.remove(position);
        let mut events = vec![WalletEvent::WalletOwnerRemoval { owner }];

        if self.required > self.owners.len() {
            self.required = self.owners.len();
            events.push(WalletEvent::RequirementChange {
                required: self.required,
            });
        }

        log::info!("Wallet owner removed: {} ({})", owner, self.description());
        Ok(events)
    }

    pub(crate) fn replace_owner(
        &mut self,
        old: Address,
        new: Address,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        let position = self
            .owners
            .iter()
            .position(|o| *o == old)
            .ok_or(WalletError::UnknownOwner(old))?;

        if self.is_owner(&new) {
            return Err(WalletError::DuplicateOwner(new));
        }

        self.owners.remove(position);
        self.owners.push(new);
        log::info!("Wallet owner replaced: {} -> {}", old, new);

        Ok(vec![
            WalletEvent::WalletOwnerAddition { owner: new },
            WalletEvent::WalletOwnerRemoval { owner: old },
        ])
    }

    pub(crate) fn change_requirement(
        &mut self,
        required: &BigInt,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        self.required = Self::check_requirement(required, self.owners.len())?;
        log::info!("Requirement changed: {}", self.description());

        Ok(vec![WalletEvent::RequirementChange {
            required: self.required,
        }])
    }
}
