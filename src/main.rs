//! Multisig Wallet CLI Application
//!
//! A command-line interface for operating a quorum-controlled wallet on a
//! simulated runtime.

use clap::{Parser, Subcommand};
use multisig_wallet::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A quorum-based multi-signature wallet", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet
    Init {
        /// Account deploying the wallet
        #[arg(long)]
        deployer: String,

        /// Initial owners (comma-separated addresses)
        #[arg(short, long)]
        owners: String,

        /// Confirmations required to execute a transaction
        #[arg(short, long)]
        required: usize,
    },

    /// Deploy a contract on the simulated runtime
    DeployContract {
        /// Account deploying the contract
        #[arg(long)]
        deployer: String,

        /// Methods the contract accepts (comma-separated)
        #[arg(short, long)]
        methods: String,
    },

    /// Send value to the wallet
    Deposit {
        /// Sender address
        #[arg(short, long)]
        from: String,

        /// Amount to send
        #[arg(short, long)]
        amount: u128,
    },

    /// Propose a transaction
    Submit {
        /// Submitting owner
        #[arg(short, long)]
        caller: String,

        /// Target address (the wallet itself for owner/quorum changes)
        #[arg(long)]
        destination: String,

        /// Target method; omit for a plain value transfer
        #[arg(short, long)]
        method: Option<String>,

        /// Call parameters as a JSON array of {name, type, value}
        #[arg(short, long)]
        params: Option<String>,

        /// Value sent with the transaction
        #[arg(short, long)]
        value: Option<u128>,

        /// Free-text memo
        #[arg(long)]
        description: Option<String>,
    },

    /// Confirm a pending transaction
    Confirm {
        /// Confirming owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        id: u64,
    },

    /// Revoke a confirmation
    Revoke {
        /// Revoking owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        id: u64,
    },

    /// Retry execution of a transaction that has reached the quorum
    Execute {
        /// Executing owner
        #[arg(short, long)]
        caller: String,

        /// Transaction id
        #[arg(short, long)]
        id: u64,
    },

    /// Show owners and quorum
    Owners,

    /// Show a transaction
    Info {
        /// Transaction id
        #[arg(short, long)]
        id: u64,
    },

    /// List transactions
    List {
        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "20")]
        count: usize,

        /// Include pending transactions
        #[arg(long)]
        pending: bool,

        /// Include executed transactions
        #[arg(long)]
        executed: bool,
    },

    /// Show the event journal
    Events {
        /// Only show the last N events
        #[arg(short, long)]
        last: Option<usize>,
    },

    /// Export wallet state to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import wallet state from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List saved backups
    Backups,

    /// Restore wallet state from a backup
    Restore {
        /// Backup index (0 is the most recent)
        #[arg(short, long)]
        index: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need a saved wallet)
    if let Commands::Init {
        deployer,
        owners,
        required,
    } = &cli.command
    {
        return cli::cmd_init(&cli.data_dir, deployer, owners, *required);
    }

    let mut state = AppState::load(&cli.data_dir)?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::DeployContract { deployer, methods } => {
            cli::cmd_deploy_contract(&mut state, &deployer, &methods)
        }
        Commands::Deposit { from, amount } => cli::cmd_deposit(&mut state, &from, amount),
        Commands::Submit {
            caller,
            destination,
            method,
            params,
            value,
            description,
        } => cli::cmd_submit(
            &mut state,
            &caller,
            &destination,
            method,
            params,
            value,
            description,
        ),
        Commands::Confirm { caller, id } => cli::cmd_confirm(&mut state, &caller, id),
        Commands::Revoke { caller, id } => cli::cmd_revoke(&mut state, &caller, id),
        Commands::Execute { caller, id } => cli::cmd_execute(&mut state, &caller, id),
        Commands::Owners => cli::cmd_owners(&state),
        Commands::Info { id } => cli::cmd_info(&state, id),
        Commands::List {
            offset,
            count,
            pending,
            executed,
        } => {
            // With neither flag given, list everything
            let (pending, executed) = if pending || executed {
                (pending, executed)
            } else {
                (true, true)
            };
            cli::cmd_list(&state, offset, count, pending, executed)
        }
        Commands::Events { last } => cli::cmd_events(&state, last),
        Commands::Export { output } => cli::cmd_export(&state, &output),
        Commands::Import { input } => cli::cmd_import(&mut state, &input),
        Commands::Backups => cli::cmd_backups(&state),
        Commands::Restore { index } => cli::cmd_restore(&mut state, index),
    }
}
