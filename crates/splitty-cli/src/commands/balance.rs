//! Balance command for showing who owes whom.
//!
//! With `--participant`, shows that participant's totals. Otherwise lists the
//! net balance of everyone in the ledger, sorted by participant ID.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use splitty_core::{BalanceSummary, LedgerEntry, NetBalance, ParticipantId, net_balances, summarize};

use crate::{Config, ledger};

#[derive(Debug, Args)]
pub struct BalanceArgs {
    /// Show totals for a single participant.
    #[arg(long)]
    pub participant: Option<ParticipantId>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Single participant summary for JSON output.
#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    participant_id: &'a ParticipantId,
    currency: &'a str,
    #[serde(flatten)]
    summary: BalanceSummary,
}

/// Group balances for JSON output.
#[derive(Debug, Serialize)]
struct GroupOutput<'a> {
    currency: &'a str,
    balances: Vec<NetBalance>,
}

/// Net balances sorted by participant ID.
pub fn sorted_balances(entries: &[LedgerEntry]) -> Vec<NetBalance> {
    let mut balances: Vec<NetBalance> = net_balances(entries).into_values().collect();
    balances.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
    balances
}

/// Format a single participant's summary for human-readable output.
pub fn format_summary(participant: &ParticipantId, summary: &BalanceSummary, currency: &str) -> String {
    let mut output = String::new();
    writeln!(output, "Balance for {participant}").unwrap();
    writeln!(output, "Owed to you: {:>10} {currency}", summary.owed_to_you).unwrap();
    writeln!(output, "You owe:     {:>10} {currency}", summary.you_owe).unwrap();
    writeln!(output, "Net:         {:>10} {currency}", summary.net).unwrap();
    output
}

/// Format group balances for human-readable output.
pub fn format_group(balances: &[NetBalance], currency: &str) -> String {
    let mut output = String::new();

    if balances.is_empty() {
        writeln!(output, "No ledger entries recorded.").unwrap();
        return output;
    }

    let width = balances
        .iter()
        .map(|b| b.participant_id.as_str().chars().count())
        .max()
        .unwrap_or(0);
    for balance in balances {
        let status = if balance.is_creditor() {
            "is owed"
        } else if balance.is_debtor() {
            "owes"
        } else {
            "settled"
        };
        writeln!(
            output,
            "{:<width$}  {:>10} {currency}  {status}",
            balance.participant_id, balance.value
        )
        .unwrap();
    }
    output
}

pub fn run<W: Write>(writer: &mut W, args: &BalanceArgs, config: &Config) -> Result<()> {
    let entries = ledger::load(&config.ledger_path)?;
    tracing::debug!(entries = entries.len(), "loaded ledger");

    match &args.participant {
        Some(participant) => {
            let summary = summarize(participant, &entries);
            if args.json {
                let output = SummaryOutput {
                    participant_id: participant,
                    currency: &config.currency,
                    summary,
                };
                writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            } else {
                write!(
                    writer,
                    "{}",
                    format_summary(participant, &summary, &config.currency)
                )?;
            }
        }
        None => {
            let balances = sorted_balances(&entries);
            if args.json {
                let output = GroupOutput {
                    currency: &config.currency,
                    balances,
                };
                writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            } else {
                write!(writer, "{}", format_group(&balances, &config.currency))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use splitty_core::{Bill, BillAmounts, BillId, SplitMethod};

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    fn bill(bill_id: &str, payer: &str, subtotal: &str) -> Bill {
        Bill {
            id: BillId::new(bill_id).unwrap(),
            title: bill_id.to_string(),
            payer: id(payer),
            participants: vec![id("alice"), id("bob"), id("carol")],
            amounts: BillAmounts::new(subtotal.parse().unwrap()),
            split: SplitMethod::Equal,
        }
    }

    /// Ledger with a 10.00 bill paid by alice and a 30.00 bill paid by bob.
    fn write_ledger(dir: &std::path::Path) -> Config {
        let ledger_path = dir.join("ledger.jsonl");
        ledger::append(&ledger_path, &bill("dinner", "alice", "10.00").ledger_entries().unwrap())
            .unwrap();
        ledger::append(&ledger_path, &bill("taxi", "bob", "30.00").ledger_entries().unwrap())
            .unwrap();
        Config {
            ledger_path,
            currency: "USD".to_string(),
        }
    }

    fn render(args: &BalanceArgs, config: &Config) -> String {
        let mut output = Vec::new();
        run(&mut output, args, config).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn group_balances_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = write_ledger(temp.path());
        let args = BalanceArgs {
            participant: None,
            json: false,
        };
        assert_snapshot!(render(&args, &config), @r"
        alice       -3.34 USD  owes
        bob         16.67 USD  is owed
        carol      -13.33 USD  owes
        ");
    }

    #[test]
    fn participant_summary_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = write_ledger(temp.path());
        let args = BalanceArgs {
            participant: Some(id("alice")),
            json: false,
        };
        assert_snapshot!(render(&args, &config), @r"
        Balance for alice
        Owed to you:       6.66 USD
        You owe:          10.00 USD
        Net:              -3.34 USD
        ");
    }

    #[test]
    fn participant_summary_json() {
        let temp = tempfile::tempdir().unwrap();
        let config = write_ledger(temp.path());
        let args = BalanceArgs {
            participant: Some(id("bob")),
            json: true,
        };
        assert_snapshot!(render(&args, &config), @r#"
        {
          "participant_id": "bob",
          "currency": "USD",
          "owed_to_you": "20.00",
          "you_owe": "3.33",
          "net": "16.67"
        }
        "#);
    }

    #[test]
    fn group_balances_json() {
        let temp = tempfile::tempdir().unwrap();
        let config = write_ledger(temp.path());
        let args = BalanceArgs {
            participant: None,
            json: true,
        };
        let output: serde_json::Value = serde_json::from_str(&render(&args, &config)).unwrap();
        assert_eq!(output["balances"][0]["participant_id"], "alice");
        assert_eq!(output["balances"][0]["value"], "-3.34");
        assert_eq!(output["balances"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_ledger_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            ledger_path: temp.path().join("missing.jsonl"),
            currency: "USD".to_string(),
        };
        let args = BalanceArgs {
            participant: None,
            json: false,
        };
        assert_snapshot!(render(&args, &config), @"No ledger entries recorded.");

        let args = BalanceArgs {
            participant: Some(id("alice")),
            json: false,
        };
        let output = render(&args, &config);
        assert!(output.contains("Net:               0.00 USD"), "{output}");
    }

    #[test]
    fn group_balances_sum_to_zero() {
        let temp = tempfile::tempdir().unwrap();
        let config = write_ledger(temp.path());
        let entries = ledger::load(&config.ledger_path).unwrap();
        let total = sorted_balances(&entries)
            .iter()
            .fold("0.00".parse::<splitty_core::FixedDecimal>().unwrap(), |acc, b| {
                acc + b.value
            });
        assert!(total.is_zero());
    }
}
