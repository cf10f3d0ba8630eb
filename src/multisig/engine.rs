//! Approval engine
//!
//! Drives every wallet transaction through submit → confirm → execute, with
//! revocation allowed while it is still pending. Execution runs inside the
//! confirming call as soon as the confirmation count reaches the quorum.

use crate::core::{Address, Receipt, WalletEvent};
use crate::host::Host;
use crate::multisig::dispatch::{self, Dispatch};
use crate::multisig::ledger::{TransactionLedger, TxFilter};
use crate::multisig::registry::{OwnerRegistry, WalletError};
use crate::multisig::transaction::{Transaction, TransactionRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a transaction stands after an execution attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Confirmations are still below the quorum
    Pending,
    /// Executed successfully
    Executed,
    /// Quorum reached but execution failed; the transaction stays pending
    Failed,
}

/// A quorum-controlled wallet: its identity, owners and transaction ledger
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MultiSigWallet {
    /// The wallet's own address, target of governance transactions
    address: Address,
    registry: OwnerRegistry,
    ledger: TransactionLedger,
}

impl MultiSigWallet {
    /// Create a wallet at `address` controlled by `owners`
    ///
    /// # Errors
    /// Returns error if the owner set or quorum is invalid, or if the wallet
    /// is listed among its own owners
    pub fn new(
        address: Address,
        owners: Vec<Address>,
        required: usize,
    ) -> Result<Self, WalletError> {
        if owners.contains(&address) {
            return Err(WalletError::InvalidOwner(address));
        }

        let registry = OwnerRegistry::new(owners, required)?;
        log::info!(
            "Multisig wallet {} created ({})",
            address,
            registry.description()
        );

        Ok(Self {
            address,
            registry,
            ledger: TransactionLedger::new(),
        })
    }

    /// Create a wallet from a comma-separated owner list
    pub fn from_owner_list(
        address: Address,
        owners: &str,
        required: usize,
    ) -> Result<Self, WalletError> {
        let registry = OwnerRegistry::from_owner_list(owners, required)?;
        Self::new(address, registry.owners().to_vec(), required)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), WalletError> {
        if !self.registry.is_owner(caller) {
            return Err(WalletError::Unauthorized(*caller));
        }
        Ok(())
    }

    fn pending_transaction(&self, id: u64) -> Result<&Transaction, WalletError> {
        let tx = self.ledger.get(id)?;
        if tx.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        Ok(tx)
    }

    // =========================================================================
    // Approval pipeline
    // =========================================================================

    /// Propose a transaction; the submitter's confirmation is implied
    ///
    /// Returns the new transaction id whether or not it executed.
    pub fn submit_transaction<H: Host>(
        &mut self,
        host: &mut H,
        caller: &Address,
        request: TransactionRequest,
    ) -> Result<Receipt<u64>, WalletError> {
        self.ensure_owner(caller)?;
        let tx = Transaction::new(request)?;

        let id = self.ledger.append(tx);
        let mut events = vec![WalletEvent::Submission { transaction_id: id }];
        self.record_confirmation(caller, id, &mut events)?;

        log::info!("Transaction {} submitted by {}", id, caller);
        self.attempt_execution(host, id, &mut events)?;

        Ok(Receipt::new(id, events))
    }

    /// Confirm a pending transaction, executing it once the quorum is reached
    pub fn confirm_transaction<H: Host>(
        &mut self,
        host: &mut H,
        caller: &Address,
        id: u64,
    ) -> Result<Receipt<ExecutionStatus>, WalletError> {
        self.ensure_owner(caller)?;
        let tx = self.pending_transaction(id)?;
        if tx.is_confirmed_by(caller) {
            return Err(WalletError::AlreadyConfirmed {
                owner: *caller,
                transaction_id: id,
            });
        }

        let mut events = Vec::new();
        self.record_confirmation(caller, id, &mut events)?;
        let status = self.attempt_execution(host, id, &mut events)?;

        Ok(Receipt::new(status, events))
    }

    /// Withdraw a confirmation from a pending transaction
    pub fn revoke_transaction(
        &mut self,
        caller: &Address,
        id: u64,
    ) -> Result<Receipt<()>, WalletError> {
        self.ensure_owner(caller)?;
        let tx = self.pending_transaction(id)?;
        if !tx.is_confirmed_by(caller) {
            return Err(WalletError::NotConfirmed {
                owner: *caller,
                transaction_id: id,
            });
        }

        self.ledger.get_mut(id)?.remove_confirmation(caller);
        log::debug!("Transaction {} revoked by {}", id, caller);

        Ok(Receipt::new(
            (),
            vec![WalletEvent::Revocation {
                owner: *caller,
                transaction_id: id,
            }],
        ))
    }

    /// Retry execution of a transaction that already has enough confirmations
    pub fn execute_transaction<H: Host>(
        &mut self,
        host: &mut H,
        caller: &Address,
        id: u64,
    ) -> Result<Receipt<ExecutionStatus>, WalletError> {
        self.ensure_owner(caller)?;
        let tx = self.pending_transaction(id)?;
        let have = self.registry.count_confirmations(tx.confirmations());
        let need = self.registry.requirement();
        if have < need {
            return Err(WalletError::InsufficientConfirmations { have, need });
        }

        let mut events = Vec::new();
        let status = self.attempt_execution(host, id, &mut events)?;
        Ok(Receipt::new(status, events))
    }

    fn record_confirmation(
        &mut self,
        caller: &Address,
        id: u64,
        events: &mut Vec<WalletEvent>,
    ) -> Result<(), WalletError> {
        self.ledger.get_mut(id)?.add_confirmation(*caller);
        log::debug!("Transaction {} confirmed by {}", id, caller);

        events.push(WalletEvent::Confirmation {
            owner: *caller,
            transaction_id: id,
        });
        Ok(())
    }

    /// Execute `id` if it has reached the quorum
    ///
    /// Execution errors are reported as an `ExecutionFailure` event and never
    /// propagate; only an unknown id is an error here.
    fn attempt_execution<H: Host>(
        &mut self,
        host: &mut H,
        id: u64,
        events: &mut Vec<WalletEvent>,
    ) -> Result<ExecutionStatus, WalletError> {
        let tx = self.ledger.get(id)?;
        if tx.executed {
            return Ok(ExecutionStatus::Executed);
        }
        if self.registry.count_confirmations(tx.confirmations()) < self.registry.requirement() {
            return Ok(ExecutionStatus::Pending);
        }

        let route = dispatch::route(&self.address, tx);
        let outcome = route.and_then(|route| self.dispatch(host, route));

        match outcome {
            Ok(mut raised) => {
                self.ledger.get_mut(id)?.mark_executed();
                events.append(&mut raised);
                events.push(WalletEvent::Execution { transaction_id: id });
                log::info!("Transaction {} executed", id);
                Ok(ExecutionStatus::Executed)
            }
            Err(e) => {
                events.push(WalletEvent::ExecutionFailure { transaction_id: id });
                log::warn!("Transaction {} failed to execute: {}", id, e);
                Ok(ExecutionStatus::Failed)
            }
        }
    }

    fn dispatch<H: Host>(
        &mut self,
        host: &mut H,
        route: Dispatch,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        match route {
            Dispatch::Governance(call) => call.apply(&self.address, &mut self.registry),
            Dispatch::External {
                target,
                method,
                args,
                value,
            } => {
                host.call(&self.address, &target, &method, &args, value)?;
                Ok(Vec::new())
            }
            Dispatch::Transfer { to, amount } => {
                host.transfer(&self.address, &to, amount)?;
                Ok(Vec::new())
            }
        }
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Record native value arriving at the wallet
    pub fn fallback(&self, from: &Address, amount: u128) -> Receipt<()> {
        log::info!("Deposit of {} from {}", amount, from);
        Receipt::new(
            (),
            vec![WalletEvent::Deposit {
                from: *from,
                amount,
            }],
        )
    }

    /// Record a token transfer arriving at the wallet
    pub fn token_fallback(&self, from: &Address, amount: u128, data: &[u8]) -> Receipt<()> {
        log::info!("Token deposit of {} from {}", amount, from);
        Receipt::new(
            (),
            vec![WalletEvent::DepositToken {
                from: *from,
                amount,
                data: data.to_vec(),
            }],
        )
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn wallet_owners(&self) -> &[Address] {
        self.registry.owners()
    }

    pub fn requirement(&self) -> usize {
        self.registry.requirement()
    }

    /// Confirmations on `id` that currently count toward the quorum
    pub fn confirmation_count(&self, id: u64) -> Result<usize, WalletError> {
        Ok(self
            .registry
            .count_confirmations(self.ledger.confirmations_of(id)?))
    }

    /// Current owners that confirmed `id`, in confirmation order
    pub fn confirmations(&self, id: u64) -> Result<Vec<Address>, WalletError> {
        Ok(self
            .ledger
            .confirmations_of(id)?
            .iter()
            .filter(|owner| self.registry.is_owner(owner))
            .copied()
            .collect())
    }

    pub fn transaction(&self, id: u64) -> Result<&Transaction, WalletError> {
        self.ledger.get(id)
    }

    pub fn transaction_count(&self, pending: bool, executed: bool) -> usize {
        self.ledger.count(TxFilter::from_flags(pending, executed))
    }

    pub fn transaction_ids(
        &self,
        offset: usize,
        count: usize,
        pending: bool,
        executed: bool,
    ) -> Vec<u64> {
        self.ledger
            .ids(offset, count, TxFilter::from_flags(pending, executed))
    }

    /// Summaries of matching transactions, see [`Transaction::to_info`]
    pub fn transaction_list(
        &self,
        offset: usize,
        count: usize,
        pending: bool,
        executed: bool,
    ) -> Vec<BTreeMap<String, String>> {
        self.ledger
            .entries(offset, count, TxFilter::from_flags(pending, executed))
            .into_iter()
            .map(|(id, tx)| tx.to_info(id))
            .collect()
    }

    pub fn transaction_info(&self, id: u64) -> Result<BTreeMap<String, String>, WalletError> {
        Ok(self.ledger.get(id)?.to_info(id))
    }
}
