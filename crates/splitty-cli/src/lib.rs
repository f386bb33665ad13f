//! Splitty CLI library.
//!
//! This crate provides the CLI interface for splitting bills and tracking
//! balances on top of `splitty-core`.

mod cli;
pub mod commands;
mod config;
pub mod ledger;

pub use cli::{Cli, Commands};
pub use config::Config;
