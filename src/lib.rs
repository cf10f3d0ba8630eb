//! Multisig Wallet: a quorum-based multi-signature transaction engine
//!
//! A set of owners jointly controls an account. Every state-changing action
//! is proposed, confirmed by a threshold of owners and only then executed:
//! - Transaction ledger with confirm / revoke / execute state machine
//! - Parameter codec for loosely-typed call descriptions
//! - Self-governance: owner and quorum changes go through the same pipeline
//! - Host boundary for value transfers and external calls
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::core::{Address, WalletEvent};
//! use multisig_wallet::host::SimulatedHost;
//! use multisig_wallet::multisig::{MultiSigWallet, TransactionRequest};
//!
//! let alice: Address = "hx0000000000000000000000000000000000000001".parse().unwrap();
//! let bob: Address = "hx0000000000000000000000000000000000000002".parse().unwrap();
//! let dave: Address = "hx0000000000000000000000000000000000000004".parse().unwrap();
//!
//! // A 2-of-2 wallet on a simulated runtime
//! let mut host = SimulatedHost::new();
//! let address = host.deploy_contract(&alice, &[]);
//! let mut wallet = MultiSigWallet::new(address, vec![alice, bob], 2).unwrap();
//!
//! // Alice proposes adding Dave as an owner
//! let params = format!(
//!     r#"[{{"name": "_walletOwner", "type": "Address", "value": "{}"}}]"#,
//!     dave
//! );
//! let request = TransactionRequest::new(address)
//!     .method("addWalletOwner")
//!     .params(params);
//! let id = wallet.submit_transaction(&mut host, &alice, request).unwrap().value;
//!
//! // Bob's confirmation executes it
//! let receipt = wallet.confirm_transaction(&mut host, &bob, id).unwrap();
//! assert!(receipt.emitted(&WalletEvent::Execution { transaction_id: id }));
//! assert_eq!(wallet.wallet_owners().len(), 3);
//! ```

pub mod cli;
pub mod codec;
pub mod core;
pub mod host;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use codec::{decode_params, CodecError, ParamType, ParamValue};
pub use core::{Address, AddressError, Receipt, WalletEvent};
pub use host::{Host, HostError, SimulatedHost};
pub use multisig::{
    ExecutionStatus, MultiSigWallet, OwnerRegistry, Transaction, TransactionLedger,
    TransactionRequest, TxFilter, WalletError,
};
pub use storage::{Storage, StorageConfig, StorageError, WalletSnapshot};
