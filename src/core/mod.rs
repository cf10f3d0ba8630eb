//! Core identity and notification types shared by every wallet component

pub mod address;
pub mod events;

pub use address::{Address, AddressError, AddressKind, ADDRESS_BODY_LEN};
pub use events::{Receipt, WalletEvent};
