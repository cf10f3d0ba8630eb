//! Quorum-controlled multi-signature wallet
//!
//! A set of owners jointly controls the wallet. Every action (value
//! transfer, contract call, owner or quorum change) is proposed as a
//! transaction and executes once `required` owners have confirmed it.
//!
//! # Example
//!
//! ```rust
//! use multisig_wallet::core::Address;
//! use multisig_wallet::host::SimulatedHost;
//! use multisig_wallet::multisig::{ExecutionStatus, MultiSigWallet, TransactionRequest};
//!
//! let alice: Address = "hx0000000000000000000000000000000000000001".parse().unwrap();
//! let bob: Address = "hx0000000000000000000000000000000000000002".parse().unwrap();
//! let carol: Address = "hx0000000000000000000000000000000000000003".parse().unwrap();
//!
//! let mut host = SimulatedHost::new();
//! let address = Address::derive_contract(&alice, 0);
//! let mut wallet = MultiSigWallet::new(address, vec![alice, bob, carol], 2).unwrap();
//!
//! // Propose raising the quorum to 3
//! let request = TransactionRequest::new(address)
//!     .method("changeRequirement")
//!     .params(r#"[{"name": "_required", "type": "int", "value": "0x3"}]"#);
//! let id = wallet.submit_transaction(&mut host, &alice, request).unwrap().value;
//!
//! // A second confirmation reaches the quorum and executes it
//! let receipt = wallet.confirm_transaction(&mut host, &bob, id).unwrap();
//! assert_eq!(receipt.value, ExecutionStatus::Executed);
//! assert_eq!(wallet.requirement(), 3);
//! ```

pub mod dispatch;
pub mod engine;
pub mod ledger;
pub mod registry;
pub mod transaction;

pub use dispatch::{Dispatch, GovernanceCall};
pub use engine::{ExecutionStatus, MultiSigWallet};
pub use ledger::{TransactionLedger, TxFilter};
pub use registry::{OwnerRegistry, WalletError};
pub use transaction::{Transaction, TransactionRequest};
