//! Wallet transactions
//!
//! A transaction is one proposed action together with its approval state.
//! Entries are never deleted; they remain as the wallet's audit trail.

use crate::codec::{decode_params, format_hex, ParamValue};
use crate::core::Address;
use crate::multisig::registry::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Builder for a transaction proposal
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    destination: Option<Address>,
    method: Option<String>,
    params: Option<String>,
    value: Option<u128>,
    description: Option<String>,
}

impl TransactionRequest {
    /// Start a proposal targeting `destination`
    pub fn new(destination: Address) -> Self {
        Self {
            destination: Some(destination),
            ..Default::default()
        }
    }

    /// Start a proposal without a destination (rejected on submit)
    pub fn without_destination() -> Self {
        Self::default()
    }

    /// Set the target method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the encoded call parameters
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Set the value transferred alongside the call
    pub fn value(mut self, value: u128) -> Self {
        self.value = Some(value);
        self
    }

    /// Set a free-text memo
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A proposed wallet transaction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Target of the call or transfer
    pub destination: Address,
    /// Target method; absent or empty for a plain value transfer
    pub method: Option<String>,
    /// Encoded call parameters
    pub params: Option<String>,
    /// Value sent with the call
    pub value: Option<u128>,
    /// Free-text memo
    pub description: Option<String>,
    /// Set once, on successful execution
    pub executed: bool,
    /// Owners that confirmed, in confirmation order
    confirmations: Vec<Address>,
    /// When the transaction was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the transaction was executed
    pub executed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a transaction from a proposal
    pub fn new(request: TransactionRequest) -> Result<Self, WalletError> {
        let destination = request
            .destination
            .ok_or(WalletError::InvalidDestination)?;

        Ok(Self {
            destination,
            method: request.method,
            params: request.params,
            value: request.value,
            description: request.description,
            executed: false,
            confirmations: Vec::new(),
            submitted_at: Utc::now(),
            executed_at: None,
        })
    }

    /// Method name, `None` for a plain value transfer
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref().filter(|m| !m.is_empty())
    }

    /// Value to send, zero when absent
    pub fn amount(&self) -> u128 {
        self.value.unwrap_or(0)
    }

    /// Decode the stored call parameters
    pub fn decoded_params(&self) -> Result<Vec<ParamValue>, WalletError> {
        Ok(decode_params(self.params.as_deref())?)
    }

    pub fn confirmations(&self) -> &[Address] {
        &self.confirmations
    }

    /// Stored confirmations, including any from owners removed since; the
    /// quorum is counted by `OwnerRegistry::count_confirmations`
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.confirmations.contains(owner)
    }

    /// Record a confirmation, returns false if it was already present
    pub(crate) fn add_confirmation(&mut self, owner: Address) -> bool {
        if self.is_confirmed_by(&owner) {
            return false;
        }
        self.confirmations.push(owner);
        true
    }

    /// Drop a confirmation, returns false if it was not present
    pub(crate) fn remove_confirmation(&mut self, owner: &Address) -> bool {
        let before = self.confirmations.len();
        self.confirmations.retain(|o| o != owner);
        self.confirmations.len() != before
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
        self.executed_at = Some(Utc::now());
    }

    /// String-keyed summary as exposed to callers
    pub fn to_info(&self, transaction_id: u64) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        info.insert("_destination".to_string(), self.destination.to_string());
        info.insert(
            "_method".to_string(),
            self.method.clone().unwrap_or_default(),
        );
        info.insert(
            "_params".to_string(),
            self.params.clone().unwrap_or_default(),
        );
        info.insert("_value".to_string(), format_hex(self.amount()));
        info.insert(
            "_description".to_string(),
            self.description.clone().unwrap_or_default(),
        );
        info.insert(
            "_executed".to_string(),
            if self.executed { "0x1" } else { "0x0" }.to_string(),
        );
        info.insert(
            "_transactionId".to_string(),
            format_hex(transaction_id as u128),
        );
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        format!("hx{:040x}", n).parse().unwrap()
    }

    #[test]
    fn test_transaction_requires_destination() {
        assert!(matches!(
            Transaction::new(TransactionRequest::without_destination().method("foo")),
            Err(WalletError::InvalidDestination)
        ));
    }

    #[test]
    fn test_transaction_creation() {
        let tx = Transaction::new(
            TransactionRequest::new(addr(1))
                .method("setName")
                .value(5)
                .description("rename"),
        )
        .unwrap();

        assert_eq!(tx.method_name(), Some("setName"));
        assert_eq!(tx.amount(), 5);
        assert!(!tx.executed);
        assert_eq!(tx.confirmation_count(), 0);
        assert!(tx.decoded_params().unwrap().is_empty());
    }

    #[test]
    fn test_empty_method_is_plain_transfer() {
        let tx = Transaction::new(TransactionRequest::new(addr(1)).method("")).unwrap();
        assert_eq!(tx.method_name(), None);
        assert_eq!(tx.amount(), 0);
    }

    #[test]
    fn test_confirmations_are_unique() {
        let mut tx = Transaction::new(TransactionRequest::new(addr(1))).unwrap();

        assert!(tx.add_confirmation(addr(2)));
        assert!(!tx.add_confirmation(addr(2)));
        assert!(tx.add_confirmation(addr(3)));
        assert_eq!(tx.confirmations(), &[addr(2), addr(3)]);

        assert!(tx.remove_confirmation(&addr(2)));
        assert!(!tx.remove_confirmation(&addr(2)));
        assert_eq!(tx.confirmation_count(), 1);
    }

    #[test]
    fn test_info_map() {
        let mut tx = Transaction::new(TransactionRequest::new(addr(1)).method("addWalletOwner"))
            .unwrap();

        let info = tx.to_info(10);
        assert_eq!(info["_destination"], addr(1).to_string());
        assert_eq!(info["_method"], "addWalletOwner");
        assert_eq!(info["_params"], "");
        assert_eq!(info["_value"], "0x0");
        assert_eq!(info["_description"], "");
        assert_eq!(info["_executed"], "0x0");
        assert_eq!(info["_transactionId"], "0xa");

        tx.mark_executed();
        assert_eq!(tx.to_info(10)["_executed"], "0x1");
        assert!(tx.executed_at.is_some());
    }

    #[test]
    fn test_malformed_params_surface_on_decode() {
        let tx = Transaction::new(TransactionRequest::new(addr(1)).params("{}")).unwrap();
        assert!(matches!(
            tx.decoded_params(),
            Err(WalletError::MalformedParams(_))
        ));
    }
}
