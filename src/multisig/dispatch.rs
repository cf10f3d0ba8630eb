//! Execution routing
//!
//! Maps a confirmed transaction onto what it does: a governance primitive
//! on the wallet itself, a call into another contract, or a plain value
//! transfer. Governance methods are resolved through a fixed table; the
//! decoded arguments are converted to typed handler arguments explicitly.

use crate::codec::ParamValue;
use crate::core::{Address, WalletEvent};
use crate::multisig::registry::{OwnerRegistry, WalletError};
use crate::multisig::transaction::Transaction;
use num_bigint::BigInt;

pub const ADD_WALLET_OWNER: &str = "addWalletOwner";
pub const REMOVE_WALLET_OWNER: &str = "removeWalletOwner";
pub const REPLACE_WALLET_OWNER: &str = "replaceWalletOwner";
pub const CHANGE_REQUIREMENT: &str = "changeRequirement";

type Parser = fn(&[ParamValue]) -> Result<GovernanceCall, WalletError>;

/// Governance primitives reachable through the approval pipeline
const GOVERNANCE_TABLE: &[(&str, Parser)] = &[
    (ADD_WALLET_OWNER, parse_add_owner),
    (REMOVE_WALLET_OWNER, parse_remove_owner),
    (REPLACE_WALLET_OWNER, parse_replace_owner),
    (CHANGE_REQUIREMENT, parse_change_requirement),
];

/// A typed owner-registry mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceCall {
    AddOwner(Address),
    RemoveOwner(Address),
    ReplaceOwner { old: Address, new: Address },
    ChangeRequirement(BigInt),
}

impl GovernanceCall {
    /// Resolve a method name and its decoded arguments
    pub fn parse(method: &str, args: &[ParamValue]) -> Result<Self, WalletError> {
        let (_, parser) = GOVERNANCE_TABLE
            .iter()
            .find(|(name, _)| *name == method)
            .ok_or_else(|| WalletError::UnknownMethod(method.to_string()))?;
        parser(args)
    }

    /// Apply to the registry; the registry is unchanged when this fails
    pub fn apply(
        self,
        wallet: &Address,
        registry: &mut OwnerRegistry,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        match self {
            GovernanceCall::AddOwner(owner) => {
                ensure_not_wallet(wallet, owner)?;
                registry.add_owner(owner)
            }
            GovernanceCall::RemoveOwner(owner) => registry.remove_owner(owner),
            GovernanceCall::ReplaceOwner { old, new } => {
                ensure_not_wallet(wallet, new)?;
                registry.replace_owner(old, new)
            }
            GovernanceCall::ChangeRequirement(required) => {
                registry.change_requirement(&required)
            }
        }
    }
}

fn ensure_not_wallet(wallet: &Address, owner: Address) -> Result<(), WalletError> {
    if *wallet == owner {
        return Err(WalletError::InvalidOwner(owner));
    }
    Ok(())
}

fn parse_add_owner(args: &[ParamValue]) -> Result<GovernanceCall, WalletError> {
    match args {
        [ParamValue::Address(owner)] => Ok(GovernanceCall::AddOwner(*owner)),
        _ => Err(WalletError::ArgumentMismatch {
            method: ADD_WALLET_OWNER,
            expected: "(Address)",
        }),
    }
}

fn parse_remove_owner(args: &[ParamValue]) -> Result<GovernanceCall, WalletError> {
    match args {
        [ParamValue::Address(owner)] => Ok(GovernanceCall::RemoveOwner(*owner)),
        _ => Err(WalletError::ArgumentMismatch {
            method: REMOVE_WALLET_OWNER,
            expected: "(Address)",
        }),
    }
}

fn parse_replace_owner(args: &[ParamValue]) -> Result<GovernanceCall, WalletError> {
    match args {
        [ParamValue::Address(old), ParamValue::Address(new)] => Ok(GovernanceCall::ReplaceOwner {
            old: *old,
            new: *new,
        }),
        _ => Err(WalletError::ArgumentMismatch {
            method: REPLACE_WALLET_OWNER,
            expected: "(Address, Address)",
        }),
    }
}

fn parse_change_requirement(args: &[ParamValue]) -> Result<GovernanceCall, WalletError> {
    match args {
        [ParamValue::Int(required)] => {
            Ok(GovernanceCall::ChangeRequirement(required.clone()))
        }
        _ => Err(WalletError::ArgumentMismatch {
            method: CHANGE_REQUIREMENT,
            expected: "(int)",
        }),
    }
}

/// What executing a transaction amounts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Owner/quorum change on the wallet itself
    Governance(GovernanceCall),
    /// Method call on another contract
    External {
        target: Address,
        method: String,
        args: Vec<ParamValue>,
        value: u128,
    },
    /// Plain value transfer
    Transfer { to: Address, amount: u128 },
}

/// Route a transaction submitted to the wallet at `wallet`
///
/// Parameters are decoded first, so a malformed payload fails every route.
pub fn route(wallet: &Address, tx: &Transaction) -> Result<Dispatch, WalletError> {
    let args = tx.decoded_params()?;

    match tx.method_name() {
        None => Ok(Dispatch::Transfer {
            to: tx.destination,
            amount: tx.amount(),
        }),
        Some(method) if tx.destination == *wallet => {
            GovernanceCall::parse(method, &args).map(Dispatch::Governance)
        }
        Some(method) => Ok(Dispatch::External {
            target: tx.destination,
            method: method.to_string(),
            args,
            value: tx.amount(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::transaction::TransactionRequest;

    fn addr(n: u8) -> Address {
        format!("hx{:040x}", n).parse().unwrap()
    }

    fn wallet() -> Address {
        format!("cx{:040x}", 0xee).parse().unwrap()
    }

    fn owner_param(name: &str, owner: Address) -> String {
        format!(r#"{{"name": "{}", "type": "Address", "value": "{}"}}"#, name, owner)
    }

    #[test]
    fn test_governance_table() {
        let owner = [ParamValue::Address(addr(1))];
        assert_eq!(
            GovernanceCall::parse(ADD_WALLET_OWNER, &owner).unwrap(),
            GovernanceCall::AddOwner(addr(1))
        );
        assert_eq!(
            GovernanceCall::parse(REMOVE_WALLET_OWNER, &owner).unwrap(),
            GovernanceCall::RemoveOwner(addr(1))
        );
        assert!(GovernanceCall::parse(REPLACE_WALLET_OWNER, &owner).is_err());
        assert_eq!(
            GovernanceCall::parse(CHANGE_REQUIREMENT, &[ParamValue::Int(2.into())]).unwrap(),
            GovernanceCall::ChangeRequirement(BigInt::from(2))
        );
        assert!(matches!(
            GovernanceCall::parse("transfer", &owner),
            Err(WalletError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_oversized_requirement_fails_on_apply() {
        let mut registry = OwnerRegistry::new(vec![addr(1), addr(2)], 1).unwrap();
        let huge = format!(
            r#"[{{"name": "_required", "type": "int", "value": "0x{}"}}]"#,
            "f".repeat(64)
        );
        let tx = Transaction::new(
            TransactionRequest::new(wallet())
                .method(CHANGE_REQUIREMENT)
                .params(huge),
        )
        .unwrap();

        let call = match route(&wallet(), &tx).unwrap() {
            Dispatch::Governance(call) => call,
            other => panic!("unexpected route: {:?}", other),
        };
        assert!(matches!(
            call.apply(&wallet(), &mut registry),
            Err(WalletError::InvalidRequirement { owners: 2, .. })
        ));
        assert_eq!(registry.requirement(), 1);
    }

    #[test]
    fn test_route_add_owner() {
        let params = format!("[{}]", owner_param("_walletOwner", addr(4)));
        let tx = Transaction::new(
            TransactionRequest::new(wallet())
                .method(ADD_WALLET_OWNER)
                .params(params),
        )
        .unwrap();

        assert_eq!(
            route(&wallet(), &tx).unwrap(),
            Dispatch::Governance(GovernanceCall::AddOwner(addr(4)))
        );
    }

    #[test]
    fn test_route_replace_owner() {
        let params = format!(
            "[{},{}]",
            owner_param("_walletOwner", addr(1)),
            owner_param("_newWalletOwner", addr(5))
        );
        let tx = Transaction::new(
            TransactionRequest::new(wallet())
                .method(REPLACE_WALLET_OWNER)
                .params(params),
        )
        .unwrap();

        assert_eq!(
            route(&wallet(), &tx).unwrap(),
            Dispatch::Governance(GovernanceCall::ReplaceOwner {
                old: addr(1),
                new: addr(5)
            })
        );
    }

    #[test]
    fn test_route_argument_mismatch() {
        let params = r#"[{"name": "_required", "type": "str", "value": "2"}]"#;
        let tx = Transaction::new(
            TransactionRequest::new(wallet())
                .method(CHANGE_REQUIREMENT)
                .params(params),
        )
        .unwrap();

        assert!(matches!(
            route(&wallet(), &tx),
            Err(WalletError::ArgumentMismatch {
                method: CHANGE_REQUIREMENT,
                ..
            })
        ));
    }

    #[test]
    fn test_route_unknown_wallet_method() {
        let request = TransactionRequest::new(wallet()).method("selfDestruct");
        let tx = Transaction::new(request).unwrap();
        assert!(matches!(
            route(&wallet(), &tx),
            Err(WalletError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_route_external_and_transfer() {
        let target: Address = format!("cx{:040x}", 1).parse().unwrap();
        let tx = Transaction::new(
            TransactionRequest::new(target)
                .method("setName")
                .params(r#"[{"name": "name", "type": "str", "value": "Bob"}]"#)
                .value(3),
        )
        .unwrap();

        assert_eq!(
            route(&wallet(), &tx).unwrap(),
            Dispatch::External {
                target,
                method: "setName".to_string(),
                args: vec![ParamValue::Str("Bob".to_string())],
                value: 3,
            }
        );

        let transfer = Transaction::new(TransactionRequest::new(addr(1)).value(9)).unwrap();
        assert_eq!(
            route(&wallet(), &transfer).unwrap(),
            Dispatch::Transfer {
                to: addr(1),
                amount: 9
            }
        );
    }

    #[test]
    fn test_malformed_params_fail_every_route() {
        let tx = Transaction::new(
            TransactionRequest::new(addr(1)).params("not json"),
        )
        .unwrap();
        assert!(matches!(
            route(&wallet(), &tx),
            Err(WalletError::MalformedParams(_))
        ));
    }

    #[test]
    fn test_wallet_cannot_own_itself() {
        let mut registry = OwnerRegistry::new(vec![addr(1)], 1).unwrap();
        let result = GovernanceCall::AddOwner(wallet()).apply(&wallet(), &mut registry);

        assert!(matches!(result, Err(WalletError::InvalidOwner(_))));
        assert_eq!(registry.owner_count(), 1);
    }
}
