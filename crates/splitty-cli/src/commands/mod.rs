//! CLI subcommand implementations.

pub mod allocate;
pub mod balance;
pub mod bill;
