//! Bill command for splitting a bill between named participants.
//!
//! Prints what each participant owes and, with `--record`, appends the
//! resulting ledger entries to the ledger file.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use splitty_core::{Bill, BillAmounts, BillId, FixedDecimal, LedgerEntry, ParticipantId, SplitMethod};
use uuid::Uuid;

use crate::{Config, ledger};

#[derive(Debug, Args)]
pub struct BillArgs {
    /// Short description of the bill.
    #[arg(long)]
    pub title: String,

    /// Who paid the bill up front.
    #[arg(long)]
    pub payer: ParticipantId,

    /// Comma-separated participants sharing the bill.
    #[arg(long, value_delimiter = ',', required = true)]
    pub participants: Vec<ParticipantId>,

    /// Amount before tax and tip.
    #[arg(long, allow_negative_numbers = true)]
    pub subtotal: FixedDecimal,

    /// Tax added to the subtotal.
    #[arg(long, allow_negative_numbers = true)]
    pub tax: Option<FixedDecimal>,

    /// Tip added to the subtotal.
    #[arg(long, allow_negative_numbers = true)]
    pub tip: Option<FixedDecimal>,

    /// Comma-separated weights, one per participant. Defaults to an equal split.
    #[arg(short, long, value_delimiter = ',')]
    pub weights: Vec<FixedDecimal>,

    /// Bill identifier. Defaults to a random UUID.
    #[arg(long)]
    pub id: Option<BillId>,

    /// Append the entries to the ledger file.
    #[arg(long)]
    pub record: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl BillArgs {
    fn to_bill(&self) -> Result<Bill> {
        let title = self.title.trim();
        if title.is_empty() {
            bail!("title cannot be empty");
        }

        let id = match &self.id {
            Some(id) => id.clone(),
            None => BillId::new(Uuid::new_v4().to_string())?,
        };

        let mut amounts = BillAmounts::new(self.subtotal);
        if let Some(tax) = self.tax {
            amounts = amounts.with_tax(tax);
        }
        if let Some(tip) = self.tip {
            amounts = amounts.with_tip(tip);
        }

        let split = if self.weights.is_empty() {
            SplitMethod::Equal
        } else {
            SplitMethod::Weighted(self.weights.clone())
        };

        Ok(Bill {
            id,
            title: title.to_string(),
            payer: self.payer.clone(),
            participants: self.participants.clone(),
            amounts,
            split,
        })
    }
}

/// Bill and its entries for JSON output.
#[derive(Debug, Serialize)]
struct BillOutput<'a> {
    id: &'a BillId,
    title: &'a str,
    currency: &'a str,
    total: FixedDecimal,
    payer: &'a ParticipantId,
    entries: &'a [LedgerEntry],
}

pub fn run<W: Write>(writer: &mut W, args: &BillArgs, config: &Config) -> Result<()> {
    let bill = args.to_bill()?;
    let entries = bill.ledger_entries()?;
    let total = bill.amounts.total()?.round_currency()?;

    if args.record {
        ledger::append(&config.ledger_path, &entries)?;
        tracing::info!(bill = %bill.id, path = ?config.ledger_path, "recorded bill");
    }

    if args.json {
        let output = BillOutput {
            id: &bill.id,
            title: &bill.title,
            currency: &config.currency,
            total,
            payer: &bill.payer,
            entries: &entries,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    writeln!(writer, "Bill: {} ({})", bill.title, bill.id)?;
    writeln!(
        writer,
        "Total: {total} {} paid by {}",
        config.currency, bill.payer
    )?;
    for entry in &entries {
        writeln!(
            writer,
            "{}: owes {}, paid {}",
            entry.participant_id(),
            entry.amount_owed(),
            entry.amount_paid()
        )?;
    }
    if args.record {
        writeln!(
            writer,
            "Recorded {} entries in {}",
            entries.len(),
            config.ledger_path.display()
        )?;
    }
    Ok(())
}
