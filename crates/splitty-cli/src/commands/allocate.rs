//! Allocate command for splitting an amount between a number of people.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use splitty_core::{BillAmounts, FixedDecimal, allocate_bill};

use crate::Config;

#[derive(Debug, Args)]
pub struct AllocateArgs {
    /// Amount to split, before tax and tip.
    #[arg(allow_negative_numbers = true)]
    pub amount: FixedDecimal,

    /// Number of people sharing the amount.
    #[arg(short = 'n', long)]
    pub people: usize,

    /// Comma-separated weights, one per person. Defaults to an equal split.
    #[arg(short, long, value_delimiter = ',')]
    pub weights: Vec<FixedDecimal>,

    /// Tax added on top of the amount.
    #[arg(long, allow_negative_numbers = true)]
    pub tax: Option<FixedDecimal>,

    /// Tip added on top of the amount.
    #[arg(long, allow_negative_numbers = true)]
    pub tip: Option<FixedDecimal>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Allocation result for JSON output.
#[derive(Debug, Serialize)]
struct AllocationOutput<'a> {
    currency: &'a str,
    total: FixedDecimal,
    shares: Vec<FixedDecimal>,
}

pub fn run<W: Write>(writer: &mut W, args: &AllocateArgs, config: &Config) -> Result<()> {
    let mut amounts = BillAmounts::new(args.amount);
    if let Some(tax) = args.tax {
        amounts = amounts.with_tax(tax);
    }
    if let Some(tip) = args.tip {
        amounts = amounts.with_tip(tip);
    }
    let weights = (!args.weights.is_empty()).then_some(args.weights.as_slice());

    let shares = allocate_bill(&amounts, args.people, weights)?;
    let total = amounts.total()?.round_currency()?;
    tracing::debug!(%total, people = args.people, "allocated shares");

    if args.json {
        let output = AllocationOutput {
            currency: &config.currency,
            total,
            shares,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    writeln!(writer, "Total: {total} {}", config.currency)?;
    for (index, share) in shares.iter().enumerate() {
        writeln!(writer, "Person {}: {share}", index + 1)?;
    }
    Ok(())
}
