//! Command-line interface over a persisted wallet

pub mod commands;

pub use commands::*;
