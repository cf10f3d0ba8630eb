//! In-memory host runtime
//!
//! Tracks native balances, deployed contracts with their callable methods,
//! and a journal of successful external calls.

use crate::codec::ParamValue;
use crate::core::Address;
use crate::host::{Host, HostError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A contract known to the simulated runtime
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployedContract {
    /// Contract address (derived from deployer + nonce)
    pub address: Address,
    /// Deployer address
    pub deployer: Address,
    /// Methods the contract accepts
    pub methods: Vec<String>,
    /// Contract to reject every call, for exercising failure paths
    pub reverts: bool,
    pub deployed_at: DateTime<Utc>,
}

/// A successful external call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallRecord {
    pub from: Address,
    pub target: Address,
    pub method: String,
    pub args: Vec<ParamValue>,
    pub value: u128,
    pub timestamp: DateTime<Utc>,
}

/// Simulated runtime implementing [`Host`]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulatedHost {
    /// Native balances by address
    balances: HashMap<Address, u128>,
    /// Deployed contracts by address
    contracts: HashMap<Address, DeployedContract>,
    /// Successful external calls, oldest first
    journal: Vec<CallRecord>,
    /// Deployment counter for address generation
    nonce: u64,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy a contract accepting the given methods
    pub fn deploy_contract(&mut self, deployer: &Address, methods: &[&str]) -> Address {
        self.deploy(deployer, methods, false)
    }

    /// Deploy a contract whose every call fails
    pub fn deploy_reverting_contract(&mut self, deployer: &Address, methods: &[&str]) -> Address {
        self.deploy(deployer, methods, true)
    }

    fn deploy(&mut self, deployer: &Address, methods: &[&str], reverts: bool) -> Address {
        let mut address = Address::derive_contract(deployer, self.nonce);
        self.nonce += 1;
        while self.contracts.contains_key(&address) {
            address = Address::derive_contract(deployer, self.nonce);
            self.nonce += 1;
        }

        let contract = DeployedContract {
            address,
            deployer: *deployer,
            methods: methods.iter().map(|m| m.to_string()).collect(),
            reverts,
            deployed_at: Utc::now(),
        };
        self.contracts.insert(address, contract);

        log::info!("Contract deployed at {}", address);
        address
    }

    /// Add native balance to an address
    pub fn credit(&mut self, address: &Address, amount: u128) -> Result<(), HostError> {
        let balance = self
            .balance_of(address)
            .checked_add(amount)
            .ok_or(HostError::BalanceOverflow(*address))?;
        self.balances.insert(*address, balance);
        Ok(())
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn contract(&self, address: &Address) -> Option<&DeployedContract> {
        self.contracts.get(address)
    }

    pub fn contracts(&self) -> Vec<&DeployedContract> {
        self.contracts.values().collect()
    }

    pub fn journal(&self) -> &[CallRecord] {
        &self.journal
    }

    /// Move value between balances; nothing changes unless both sides fit
    fn move_value(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), HostError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(HostError::InsufficientBalance { have, need: amount });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(HostError::BalanceOverflow(*to))?;
        self.balances.insert(*from, have - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl Host for SimulatedHost {
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), HostError> {
        self.move_value(from, to, amount)?;
        log::debug!("Transferred {} from {} to {}", amount, from, to);
        Ok(())
    }

    fn call(
        &mut self,
        from: &Address,
        target: &Address,
        method: &str,
        args: &[ParamValue],
        value: u128,
    ) -> Result<(), HostError> {
        let contract = self
            .contracts
            .get(target)
            .ok_or(HostError::ContractNotFound(*target))?;

        if !contract.methods.iter().any(|m| m == method) {
            return Err(HostError::MethodNotFound {
                contract: *target,
                method: method.to_string(),
            });
        }
        if contract.reverts {
            return Err(HostError::Rejected(format!("{}.{} reverted", target, method)));
        }
        self.move_value(from, target, value)?;
        self.journal.push(CallRecord {
            from: *from,
            target: *target,
            method: method.to_string(),
            args: args.to_vec(),
            value,
            timestamp: Utc::now(),
        });

        log::debug!("Called {}.{} with {} argument(s)", target, method, args.len());
        Ok(())
    }
}
