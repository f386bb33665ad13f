//! Net balance aggregation over ledger entries.
//!
//! Every bill produces one [`LedgerEntry`] per participant recording what they
//! owe and what they paid. A participant's net balance is the sum of
//! `paid - owed` over all their entries, across however many bills are
//! supplied. Positive means the group owes them money (creditor), negative
//! means they owe the group (debtor).
//!
//! Entry amounts are bounded by [`MAX_ENTRY_AMOUNT`], so the sums below stay
//! far inside the decimal range for any ledger that fits in memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decimal::{CURRENCY_SCALE, DecimalError, FixedDecimal};
use crate::ids::{BillId, ParticipantId};

/// Largest absolute amount, in whole currency units, a ledger entry may carry.
pub const MAX_ENTRY_AMOUNT: i64 = 1_000_000_000_000_000;

/// What one participant owes and paid on one bill.
///
/// Amounts are held at [`CURRENCY_SCALE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLedgerEntry")]
pub struct LedgerEntry {
    bill_id: BillId,
    participant_id: ParticipantId,
    amount_owed: FixedDecimal,
    amount_paid: FixedDecimal,
}

/// Unvalidated shape of a serialized [`LedgerEntry`].
#[derive(Deserialize)]
struct RawLedgerEntry {
    bill_id: BillId,
    participant_id: ParticipantId,
    amount_owed: FixedDecimal,
    amount_paid: FixedDecimal,
}

impl TryFrom<RawLedgerEntry> for LedgerEntry {
    type Error = DecimalError;

    fn try_from(raw: RawLedgerEntry) -> Result<Self, Self::Error> {
        Self::new(
            raw.bill_id,
            raw.participant_id,
            raw.amount_owed,
            raw.amount_paid,
        )
    }
}

impl LedgerEntry {
    /// Creates an entry, rounding both amounts half-up to the minor unit.
    ///
    /// Fails with [`DecimalError::OutOfRange`] when either amount exceeds
    /// [`MAX_ENTRY_AMOUNT`] in magnitude.
    pub fn new(
        bill_id: BillId,
        participant_id: ParticipantId,
        amount_owed: FixedDecimal,
        amount_paid: FixedDecimal,
    ) -> Result<Self, DecimalError> {
        Ok(Self {
            bill_id,
            participant_id,
            amount_owed: bounded(amount_owed)?,
            amount_paid: bounded(amount_paid)?,
        })
    }

    pub const fn bill_id(&self) -> &BillId {
        &self.bill_id
    }

    pub const fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub const fn amount_owed(&self) -> FixedDecimal {
        self.amount_owed
    }

    pub const fn amount_paid(&self) -> FixedDecimal {
        self.amount_paid
    }

    /// `amount_paid - amount_owed` for this entry.
    pub fn net(&self) -> FixedDecimal {
        self.amount_paid - self.amount_owed
    }
}

fn bounded(amount: FixedDecimal) -> Result<FixedDecimal, DecimalError> {
    let limit = FixedDecimal::from_integer(MAX_ENTRY_AMOUNT);
    if amount.abs() > limit {
        return Err(DecimalError::OutOfRange {
            value: amount,
            limit,
        });
    }
    amount.round_currency()
}

/// A participant's cumulative `paid - owed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetBalance {
    pub participant_id: ParticipantId,
    pub value: FixedDecimal,
}

impl NetBalance {
    /// The group owes this participant money.
    pub fn is_creditor(&self) -> bool {
        self.value.is_positive()
    }

    /// This participant owes the group money.
    pub fn is_debtor(&self) -> bool {
        self.value.is_negative()
    }
}

/// Home-screen style totals for one participant.
///
/// `owed_to_you` sums the entries where the participant paid more than their
/// share, `you_owe` (reported as a positive amount) the entries where they
/// paid less. `net == owed_to_you - you_owe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub owed_to_you: FixedDecimal,
    pub you_owe: FixedDecimal,
    pub net: FixedDecimal,
}

/// Net balance of `participant` over `entries`.
///
/// Returns zero when no entry belongs to the participant.
pub fn net_balance(participant: &ParticipantId, entries: &[LedgerEntry]) -> FixedDecimal {
    entries
        .iter()
        .filter(|entry| entry.participant_id == *participant)
        .fold(FixedDecimal::zero(CURRENCY_SCALE), |acc, entry| {
            acc + entry.net()
        })
}

/// Net balances of every participant appearing in `entries`, in one pass.
pub fn net_balances(entries: &[LedgerEntry]) -> HashMap<ParticipantId, NetBalance> {
    let mut balances: HashMap<ParticipantId, NetBalance> = HashMap::new();
    for entry in entries {
        balances
            .entry(entry.participant_id.clone())
            .or_insert_with(|| NetBalance {
                participant_id: entry.participant_id.clone(),
                value: FixedDecimal::zero(CURRENCY_SCALE),
            })
            .value += entry.net();
    }
    tracing::debug!(
        entries = entries.len(),
        participants = balances.len(),
        "aggregated net balances"
    );
    balances
}

/// Splits `participant`'s entries into what they are owed and what they owe.
pub fn summarize(participant: &ParticipantId, entries: &[LedgerEntry]) -> BalanceSummary {
    let zero = FixedDecimal::zero(CURRENCY_SCALE);
    let mut owed_to_you = zero;
    let mut you_owe = zero;
    for entry in entries
        .iter()
        .filter(|entry| entry.participant_id == *participant)
    {
        let net = entry.net();
        if net.is_positive() {
            owed_to_you += net;
        } else {
            you_owe -= net;
        }
    }
    BalanceSummary {
        owed_to_you,
        you_owe,
        net: owed_to_you - you_owe,
    }
}
