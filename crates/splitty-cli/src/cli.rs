//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{allocate::AllocateArgs, balance::BalanceArgs, bill::BillArgs};

/// Split bills fairly, to the cent.
///
/// Shares always add up to the bill's rounded total, and balances are
/// tracked across every recorded bill.
#[derive(Debug, Parser)]
#[command(name = "splitty", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split an amount between a number of people.
    Allocate(AllocateArgs),

    /// Split a bill between named participants, optionally recording it.
    Bill(BillArgs),

    /// Show net balances from the ledger.
    Balance(BalanceArgs),
}
