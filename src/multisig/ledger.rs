//! Transaction ledger
//!
//! Append-only, densely indexed store of wallet transactions with filtered
//! enumeration and pagination.

use crate::core::Address;
use crate::multisig::registry::WalletError;
use crate::multisig::transaction::Transaction;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which transactions an enumeration includes
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TxFilter: u8 {
        /// Not yet executed
        const PENDING = 0b01;
        /// Successfully executed
        const EXECUTED = 0b10;
    }
}

impl TxFilter {
    /// Build a filter from the two inclusion flags
    pub fn from_flags(pending: bool, executed: bool) -> Self {
        let mut filter = TxFilter::empty();
        filter.set(TxFilter::PENDING, pending);
        filter.set(TxFilter::EXECUTED, executed);
        filter
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if tx.executed {
            self.contains(TxFilter::EXECUTED)
        } else {
            self.contains(TxFilter::PENDING)
        }
    }
}

/// Ordered collection of all transactions ever submitted
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionLedger {
    /// Transactions indexed by id
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Store a transaction under the next sequential id
    pub fn append(&mut self, tx: Transaction) -> u64 {
        let id = self.transactions.len() as u64;
        self.transactions.push(tx);
        id
    }

    /// Get a transaction by id
    pub fn get(&self, id: u64) -> Result<&Transaction, WalletError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get(index))
            .ok_or(WalletError::UnknownTransaction(id))
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Transaction, WalletError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get_mut(index))
            .ok_or(WalletError::UnknownTransaction(id))
    }

    /// Owners that confirmed a transaction
    pub fn confirmations_of(&self, id: u64) -> Result<&[Address], WalletError> {
        Ok(self.get(id)?.confirmations())
    }

    /// Total number of transactions, regardless of state
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of transactions matching the filter
    pub fn count(&self, filter: TxFilter) -> usize {
        self.transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .count()
    }

    /// Matching `(id, transaction)` pairs in ascending id order, paginated
    pub fn entries(
        &self,
        offset: usize,
        count: usize,
        filter: TxFilter,
    ) -> Vec<(u64, &Transaction)> {
        self.transactions
            .iter()
            .enumerate()
            .filter(|(_, tx)| filter.matches(tx))
            .skip(offset)
            .take(count)
            .map(|(id, tx)| (id as u64, tx))
            .collect()
    }

    /// Ids of matching transactions, paginated
    pub fn ids(&self, offset: usize, count: usize, filter: TxFilter) -> Vec<u64> {
        self.entries(offset, count, filter)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Matching transactions, paginated
    pub fn list(&self, offset: usize, count: usize, filter: TxFilter) -> Vec<&Transaction> {
        self.entries(offset, count, filter)
            .into_iter()
            .map(|(_, tx)| tx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::transaction::TransactionRequest;

    fn addr(n: u8) -> Address {
        format!("hx{:040x}", n).parse().unwrap()
    }

    /// Ledger of five transactions where ids 0 and 2 are executed
    fn sample_ledger() -> TransactionLedger {
        let mut ledger = TransactionLedger::new();
        for i in 0..5u8 {
            let mut tx = Transaction::new(TransactionRequest::new(addr(i))).unwrap();
            if i == 0 || i == 2 {
                tx.mark_executed();
            }
            ledger.append(tx);
        }
        ledger
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut ledger = TransactionLedger::new();
        assert!(ledger.is_empty());

        for expected in 0..3 {
            let tx = Transaction::new(TransactionRequest::new(addr(1))).unwrap();
            assert_eq!(ledger.append(tx), expected);
        }
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_unknown_transaction() {
        let ledger = sample_ledger();
        assert!(ledger.get(4).is_ok());
        assert!(matches!(
            ledger.get(5),
            Err(WalletError::UnknownTransaction(5))
        ));
        assert!(ledger.confirmations_of(u64::MAX).is_err());
    }

    #[test]
    fn test_filter_flags() {
        assert_eq!(TxFilter::from_flags(true, true), TxFilter::all());
        assert_eq!(TxFilter::from_flags(false, false), TxFilter::empty());
        assert_eq!(TxFilter::from_flags(true, false), TxFilter::PENDING);
        assert_eq!(TxFilter::from_flags(false, true), TxFilter::EXECUTED);
    }

    #[test]
    fn test_count_partitions_ledger() {
        let ledger = sample_ledger();
        assert_eq!(ledger.count(TxFilter::PENDING), 3);
        assert_eq!(ledger.count(TxFilter::EXECUTED), 2);
        assert_eq!(ledger.count(TxFilter::all()), 5);
        assert_eq!(ledger.count(TxFilter::empty()), 0);
    }

    #[test]
    fn test_filtered_ids() {
        let ledger = sample_ledger();
        assert_eq!(ledger.ids(0, 5, TxFilter::all()), vec![0, 1, 2, 3, 4]);
        assert_eq!(ledger.ids(0, 5, TxFilter::EXECUTED), vec![0, 2]);
        assert_eq!(ledger.ids(0, 5, TxFilter::PENDING), vec![1, 3, 4]);
        assert!(ledger.ids(0, 5, TxFilter::empty()).is_empty());
    }

    #[test]
    fn test_pagination_applies_after_filtering() {
        let ledger = sample_ledger();
        assert_eq!(ledger.ids(1, 1, TxFilter::PENDING), vec![3]);
        assert_eq!(ledger.ids(1, 10, TxFilter::PENDING), vec![3, 4]);
        assert!(ledger.ids(3, 10, TxFilter::PENDING).is_empty());
        assert!(ledger.ids(0, 0, TxFilter::all()).is_empty());

        let listed = ledger.list(0, 2, TxFilter::all());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].destination, addr(1));
    }
}
