//! Account identities
//!
//! Identities are two-letter prefixed, 20-byte addresses: `hx` for
//! externally owned accounts and `cx` for contracts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of the address body in bytes
pub const ADDRESS_BODY_LEN: usize = 20;

/// Address parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: expected 42 characters, got {0}")]
    InvalidLength(usize),
    #[error("Invalid address prefix: {0}")]
    InvalidPrefix(String),
    #[error("Invalid address body: {0}")]
    InvalidHex(String),
}

/// Kind of account an address refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressKind {
    /// Externally owned account (`hx`)
    Account,
    /// Deployed contract (`cx`)
    Contract,
}

impl AddressKind {
    fn prefix(self) -> &'static str {
        match self {
            AddressKind::Account => "hx",
            AddressKind::Contract => "cx",
        }
    }
}

/// A validated account or contract identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    kind: AddressKind,
    body: [u8; ADDRESS_BODY_LEN],
}

impl Address {
    /// Build an address from its parts
    pub fn new(kind: AddressKind, body: [u8; ADDRESS_BODY_LEN]) -> Self {
        Self { kind, body }
    }

    /// Derive a contract address from its deployer and a deployment nonce
    ///
    /// Address = `cx` || SHA256("deployer:nonce")[..20]
    pub fn derive_contract(deployer: &Address, nonce: u64) -> Self {
        let input = format!("{}:{}", deployer, nonce);
        let hash = Sha256::digest(input.as_bytes());
        let mut body = [0u8; ADDRESS_BODY_LEN];
        body.copy_from_slice(&hash[..ADDRESS_BODY_LEN]);
        Self::new(AddressKind::Contract, body)
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Contract
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 + ADDRESS_BODY_LEN * 2 {
            return Err(AddressError::InvalidLength(s.len()));
        }

        let kind = match s.get(..2) {
            Some("hx") => AddressKind::Account,
            Some("cx") => AddressKind::Contract,
            _ => return Err(AddressError::InvalidPrefix(s.chars().take(2).collect())),
        };

        let decoded = hex::decode(&s[2..]).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let mut body = [0u8; ADDRESS_BODY_LEN];
        body.copy_from_slice(&decoded);

        Ok(Self { kind, body })
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), hex::encode(self.body))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "hx0000000000000000000000000000000000000001";

    #[test]
    fn test_parse_and_display() {
        let address: Address = ALICE.parse().unwrap();
        assert_eq!(address.kind(), AddressKind::Account);
        assert_eq!(address.to_string(), ALICE);
    }

    #[test]
    fn test_uppercase_hex_is_normalized() {
        let address: Address = "cxABCDEFabcdef0000000000000000000000000000".parse().unwrap();
        assert!(address.is_contract());
        assert_eq!(
            address.to_string(),
            "cxabcdefabcdef0000000000000000000000000000"
        );
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(matches!(
            "hx1234".parse::<Address>(),
            Err(AddressError::InvalidLength(6))
        ));
        assert!(matches!(
            "zx0000000000000000000000000000000000000001".parse::<Address>(),
            Err(AddressError::InvalidPrefix(_))
        ));
        assert!(matches!(
            "hx000000000000000000000000000000000000000g".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_contract_derivation_is_deterministic() {
        let deployer: Address = ALICE.parse().unwrap();
        let a = Address::derive_contract(&deployer, 0);
        let b = Address::derive_contract(&deployer, 0);
        let c = Address::derive_contract(&deployer, 1);

        assert!(a.is_contract());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let address: Address = ALICE.parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", ALICE));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
        assert!(serde_json::from_str::<Address>("\"hxnothex\"").is_err());
    }
}
