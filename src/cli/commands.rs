//! CLI commands for the wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::core::{Address, Receipt, WalletEvent};
use crate::host::SimulatedHost;
use crate::multisig::{ExecutionStatus, MultiSigWallet, TransactionRequest};
use crate::storage::{self, Storage, StorageConfig, WalletSnapshot};
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub snapshot: WalletSnapshot,
    pub storage: Storage,
}

impl AppState {
    /// Load the wallet saved in `data_dir`
    pub fn load(data_dir: &Path) -> CliResult<Self> {
        let storage = Storage::new(storage_config(data_dir))?;

        if !storage.exists() {
            return Err(format!(
                "no wallet found in {:?}, create one with: multisig init",
                data_dir
            )
            .into());
        }

        let snapshot = storage.load()?;
        Ok(Self { snapshot, storage })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.snapshot)?;
        Ok(())
    }

    /// Journal and print the events of a receipt
    fn flush<T>(&mut self, receipt: Receipt<T>) -> T {
        for event in &receipt.events {
            println!("   📣 {}", event);
        }
        self.snapshot.record(receipt.events);
        receipt.value
    }
}

fn storage_config(data_dir: &Path) -> StorageConfig {
    StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

fn parse_address(value: &str) -> CliResult<Address> {
    value
        .parse::<Address>()
        .map_err(|e| format!("invalid address '{}': {}", value, e).into())
}

/// Create a new wallet
pub fn cmd_init(data_dir: &Path, deployer: &str, owners: &str, required: usize) -> CliResult<()> {
    let storage = Storage::new(storage_config(data_dir))?;

    if storage.exists() {
        println!("⚠️  A wallet already exists at {:?}", data_dir);
        return Ok(());
    }

    let deployer = parse_address(deployer)?;
    let mut host = SimulatedHost::new();
    let address = host.deploy_contract(&deployer, &[]);
    let wallet = MultiSigWallet::from_owner_list(address, owners, required)?;

    println!("✅ Wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   👥 Owners: {}", wallet.wallet_owners().len());
    println!("   🔐 Policy: {}", wallet.registry().description());

    storage.save(&WalletSnapshot::new(wallet, host))?;
    Ok(())
}

/// Deploy a contract on the simulated runtime
pub fn cmd_deploy_contract(state: &mut AppState, deployer: &str, methods: &str) -> CliResult<()> {
    let deployer = parse_address(deployer)?;
    let methods: Vec<&str> = methods
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();

    let address = state.snapshot.host.deploy_contract(&deployer, &methods);
    println!("📜 Contract deployed at {}", address);
    println!("   Methods: {}", methods.join(", "));

    state.save()
}

/// Send native value to the wallet
pub fn cmd_deposit(state: &mut AppState, from: &str, amount: u128) -> CliResult<()> {
    let from = parse_address(from)?;
    let wallet_address = *state.snapshot.wallet.address();

    state.snapshot.host.credit(&wallet_address, amount)?;
    let receipt = state.snapshot.wallet.fallback(&from, amount);
    state.flush(receipt);

    println!(
        "💰 Wallet balance: {}",
        state.snapshot.host.balance_of(&wallet_address)
    );
    state.save()
}

/// Propose a transaction
pub fn cmd_submit(
    state: &mut AppState,
    caller: &str,
    destination: &str,
    method: Option<String>,
    params: Option<String>,
    value: Option<u128>,
    description: Option<String>,
) -> CliResult<()> {
    let caller = parse_address(caller)?;
    let mut request = TransactionRequest::new(parse_address(destination)?);
    if let Some(method) = method {
        request = request.method(method);
    }
    if let Some(params) = params {
        request = request.params(params);
    }
    if let Some(value) = value {
        request = request.value(value);
    }
    if let Some(description) = description {
        request = request.description(description);
    }

    let snapshot = &mut state.snapshot;
    let receipt = snapshot
        .wallet
        .submit_transaction(&mut snapshot.host, &caller, request)?;
    let id = state.flush(receipt);

    println!("📝 Transaction {} submitted", id);
    print_status(state, id)?;
    state.save()
}

/// Confirm a transaction
pub fn cmd_confirm(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    let caller = parse_address(caller)?;
    let snapshot = &mut state.snapshot;
    let receipt = snapshot
        .wallet
        .confirm_transaction(&mut snapshot.host, &caller, id)?;
    let status = state.flush(receipt);

    println!("✍️  Transaction {} confirmed: {}", id, describe(status));
    state.save()
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    let caller = parse_address(caller)?;
    let receipt = state.snapshot.wallet.revoke_transaction(&caller, id)?;
    state.flush(receipt);

    println!("↩️  Confirmation on transaction {} revoked", id);
    print_status(state, id)?;
    state.save()
}

/// Retry execution of a confirmed transaction
pub fn cmd_execute(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    let caller = parse_address(caller)?;
    let snapshot = &mut state.snapshot;
    let receipt = snapshot
        .wallet
        .execute_transaction(&mut snapshot.host, &caller, id)?;
    let status = state.flush(receipt);

    println!("⚙️  Transaction {}: {}", id, describe(status));
    state.save()
}

/// Show owners and quorum
pub fn cmd_owners(state: &AppState) -> CliResult<()> {
    let wallet = &state.snapshot.wallet;

    println!("👥 Wallet {} ({})", wallet.address(), wallet.registry().description());
    for owner in wallet.wallet_owners() {
        println!("   └─ {}", owner);
    }
    println!(
        "💰 Balance: {}",
        state.snapshot.host.balance_of(wallet.address())
    );

    Ok(())
}

/// Show one transaction
pub fn cmd_info(state: &AppState, id: u64) -> CliResult<()> {
    let info = state.snapshot.wallet.transaction_info(id)?;

    println!("📄 Transaction {}", id);
    for (key, value) in &info {
        println!("   {:<16} {}", key, value);
    }
    print_status(state, id)?;

    Ok(())
}

/// List transactions
pub fn cmd_list(
    state: &AppState,
    offset: usize,
    count: usize,
    pending: bool,
    executed: bool,
) -> CliResult<()> {
    let wallet = &state.snapshot.wallet;
    let ids = wallet.transaction_ids(offset, count, pending, executed);

    println!(
        "📋 Transactions ({} matching, showing {})",
        wallet.transaction_count(pending, executed),
        ids.len()
    );
    for id in ids {
        let tx = wallet.transaction(id)?;
        println!(
            "   #{:<4} {} {} → {} [{}/{}]",
            id,
            if tx.executed { "✅" } else { "⏳" },
            tx.method_name().unwrap_or("transfer"),
            tx.destination,
            wallet.confirmation_count(id)?,
            wallet.requirement()
        );
    }

    Ok(())
}

/// Show the event journal
pub fn cmd_events(state: &AppState, last: Option<usize>) -> CliResult<()> {
    let events: &[WalletEvent] = &state.snapshot.events;
    let start = last.map_or(0, |n| events.len().saturating_sub(n));

    println!("📣 Events ({} total)", events.len());
    for (index, event) in events.iter().enumerate().skip(start) {
        println!("   {:>5}  {}", index, event);
    }

    Ok(())
}

/// Export the wallet state to a file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    storage::save_to_file(&state.snapshot, path)?;
    println!("📦 Wallet exported to {:?}", path);
    Ok(())
}

/// Replace the wallet state with one read from a file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let snapshot = storage::load_from_file(path)?;
    state.snapshot = snapshot;
    state.save()?;

    let wallet = &state.snapshot.wallet;
    println!("📥 Wallet imported from {:?}", path);
    println!("   📍 Address: {}", wallet.address());
    println!("   🔐 Policy: {}", wallet.registry().description());
    println!("   📋 Transactions: {}", wallet.ledger().len());

    Ok(())
}

/// Show saved backups
pub fn cmd_backups(state: &AppState) -> CliResult<()> {
    let stats = state.storage.stats()?;

    println!("💾 Storage at {:?}", stats.data_dir);
    println!("   State file: {} bytes", stats.file_size);
    println!("   Backups: {}", stats.backup_count);
    for index in state.storage.list_backups() {
        println!("   └─ #{}", index);
    }

    Ok(())
}

/// Roll the wallet state back to a backup
pub fn cmd_restore(state: &mut AppState, index: usize) -> CliResult<()> {
    let snapshot = state.storage.restore_backup(index)?;
    state.snapshot = snapshot;
    state.save()?;

    let wallet = &state.snapshot.wallet;
    println!("⏪ Restored backup #{}", index);
    println!("   🔐 Policy: {}", wallet.registry().description());
    println!("   📋 Transactions: {}", wallet.ledger().len());

    Ok(())
}

fn print_status(state: &AppState, id: u64) -> CliResult<()> {
    let wallet = &state.snapshot.wallet;
    let tx = wallet.transaction(id)?;

    println!(
        "   Confirmations: {}/{}",
        wallet.confirmation_count(id)?,
        wallet.requirement()
    );
    for owner in wallet.confirmations(id)? {
        println!("   └─ {}", owner);
    }
    println!(
        "   Status: {}",
        if tx.executed { "executed" } else { "pending" }
    );

    Ok(())
}

fn describe(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Pending => "awaiting confirmations",
        ExecutionStatus::Executed => "executed",
        ExecutionStatus::Failed => "execution failed, still pending",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: &str = "hx0000000000000000000000000000000000000001";
    const OWNERS: &str = "hx0000000000000000000000000000000000000001,\
                          hx0000000000000000000000000000000000000002";

    fn init_state(data_dir: &Path) -> AppState {
        cmd_init(data_dir, DEPLOYER, OWNERS, 2).unwrap();
        AppState::load(data_dir).unwrap()
    }

    fn submit_transfer(state: &mut AppState) {
        cmd_submit(
            state,
            DEPLOYER,
            "hx0000000000000000000000000000000000000009",
            None,
            None,
            Some(0),
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_load_requires_init() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(AppState::load(temp_dir.path()).is_err());

        let state = init_state(temp_dir.path());
        assert_eq!(state.snapshot.wallet.requirement(), 2);
    }

    #[test]
    fn test_restore_rolls_back_to_backup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut state = init_state(temp_dir.path());

        submit_transfer(&mut state);
        assert_eq!(state.snapshot.wallet.ledger().len(), 1);
        assert_eq!(state.storage.list_backups(), vec![0]);
        cmd_backups(&state).unwrap();

        // Backup 0 holds the state from before the submission
        cmd_restore(&mut state, 0).unwrap();
        assert!(state.snapshot.wallet.ledger().is_empty());

        let reloaded = AppState::load(temp_dir.path()).unwrap();
        assert!(reloaded.snapshot.wallet.ledger().is_empty());
        assert!(cmd_restore(&mut state, 4).is_err());
    }

    #[test]
    fn test_export_then_import() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let export_path = source_dir.path().join("export.json");

        let mut source = init_state(source_dir.path());
        submit_transfer(&mut source);
        cmd_export(&source, &export_path).unwrap();

        let mut target = init_state(target_dir.path());
        cmd_import(&mut target, &export_path).unwrap();

        assert_eq!(target.snapshot.wallet, source.snapshot.wallet);
        assert_eq!(target.snapshot.events, source.snapshot.events);
        let reloaded = AppState::load(target_dir.path()).unwrap();
        assert_eq!(reloaded.snapshot.wallet.ledger().len(), 1);
    }
}
