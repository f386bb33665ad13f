//! Bills and the ledger entries they produce.

use std::collections::HashSet;

use thiserror::Error;

use crate::allocation::{AllocationError, AmountField, allocate_bill};
use crate::balance::LedgerEntry;
use crate::decimal::{CURRENCY_SCALE, FixedDecimal, Rounding};
use crate::ids::{BillId, ParticipantId};

/// Errors from turning a bill into ledger entries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BillError {
    /// The same participant was listed twice.
    #[error("participant listed more than once: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// The components a bill's total is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillAmounts {
    pub subtotal: FixedDecimal,
    pub tax: FixedDecimal,
    pub tip: FixedDecimal,
}

impl BillAmounts {
    /// A bill with no tax or tip.
    #[must_use]
    pub fn new(subtotal: FixedDecimal) -> Self {
        Self {
            subtotal,
            tax: FixedDecimal::zero(CURRENCY_SCALE),
            tip: FixedDecimal::zero(CURRENCY_SCALE),
        }
    }

    #[must_use]
    pub const fn with_tax(mut self, tax: FixedDecimal) -> Self {
        self.tax = tax;
        self
    }

    #[must_use]
    pub const fn with_tip(mut self, tip: FixedDecimal) -> Self {
        self.tip = tip;
        self
    }

    /// `subtotal + tax + tip`, exact, at the largest scale among the three.
    pub fn total(&self) -> Result<FixedDecimal, AllocationError> {
        let parts = [
            (AmountField::Subtotal, self.subtotal),
            (AmountField::Tax, self.tax),
            (AmountField::Tip, self.tip),
        ];
        if let Some(&(field, value)) = parts.iter().find(|(_, value)| value.is_negative()) {
            return Err(AllocationError::NegativeAmount { field, value });
        }

        let scale = parts.iter().map(|(_, value)| value.scale()).max().unwrap_or(0);
        let total = self
            .subtotal
            .add_at(self.tax, scale, Rounding::HalfUp)?
            .add_at(self.tip, scale, Rounding::HalfUp)?;
        Ok(total)
    }
}

/// How a bill's total is divided between its participants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SplitMethod {
    /// Everyone pays the same.
    #[default]
    Equal,
    /// Shares proportional to one weight per participant.
    Weighted(Vec<FixedDecimal>),
}

impl SplitMethod {
    pub fn weights(&self) -> Option<&[FixedDecimal]> {
        match self {
            Self::Equal => None,
            Self::Weighted(weights) => Some(weights.as_slice()),
        }
    }
}

/// A bill paid up front by one person and shared by a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    pub id: BillId,
    pub title: String,
    pub payer: ParticipantId,
    pub participants: Vec<ParticipantId>,
    pub amounts: BillAmounts,
    pub split: SplitMethod,
}

impl Bill {
    /// Ledger entries for this bill, one per participant in order.
    ///
    /// Each participant owes their allocated share. The payer is recorded as
    /// having paid the rounded total; if the payer does not share the bill
    /// they get an extra entry owing nothing. The entries' `paid - owed`
    /// always sums to zero.
    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, BillError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.participants.iter().find(|p| !seen.insert(*p)) {
            return Err(BillError::DuplicateParticipant(duplicate.clone()));
        }

        let shares = allocate_bill(&self.amounts, self.participants.len(), self.split.weights())?;
        let paid = self
            .amounts
            .total()?
            .round_currency()
            .map_err(AllocationError::from)?;
        let nothing = FixedDecimal::zero(CURRENCY_SCALE);

        let mut entries = self
            .participants
            .iter()
            .zip(shares)
            .map(|(participant, share)| {
                let amount_paid = if *participant == self.payer {
                    paid
                } else {
                    nothing
                };
                LedgerEntry::new(self.id.clone(), participant.clone(), share, amount_paid)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(AllocationError::from)?;

        if !self.participants.contains(&self.payer) {
            let entry = LedgerEntry::new(self.id.clone(), self.payer.clone(), nothing, paid)
                .map_err(AllocationError::from)?;
            entries.push(entry);
        }

        tracing::debug!(
            bill = %self.id,
            total = %paid,
            entries = entries.len(),
            "built ledger entries"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{net_balance, net_balances};

    fn dec(s: &str) -> FixedDecimal {
        s.parse().unwrap()
    }

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    fn dinner() -> Bill {
        Bill {
            id: BillId::new("dinner").unwrap(),
            title: "Dinner".to_string(),
            payer: id("alice"),
            participants: vec![id("alice"), id("bob"), id("carol")],
            amounts: BillAmounts::new(dec("10.00")),
            split: SplitMethod::Equal,
        }
    }

    fn net_sum(entries: &[LedgerEntry]) -> FixedDecimal {
        entries
            .iter()
            .fold(FixedDecimal::zero(CURRENCY_SCALE), |acc, e| acc + e.net())
    }

    #[test]
    fn payer_paid_total_and_everyone_owes_a_share() {
        let entries = dinner().ledger_entries().unwrap();
        let owed: Vec<String> = entries.iter().map(|e| e.amount_owed().to_string()).collect();
        let paid: Vec<String> = entries.iter().map(|e| e.amount_paid().to_string()).collect();
        assert_eq!(owed, ["3.34", "3.33", "3.33"]);
        assert_eq!(paid, ["10.00", "0.00", "0.00"]);
        assert!(net_sum(&entries).is_zero());
        assert_eq!(net_balance(&id("alice"), &entries), dec("6.66"));
        assert_eq!(net_balance(&id("bob"), &entries), dec("-3.33"));
    }

    #[test]
    fn payer_outside_the_split_gets_own_entry() {
        let mut bill = dinner();
        bill.payer = id("dave");
        let entries = bill.ledger_entries().unwrap();
        assert_eq!(entries.len(), 4);
        let last = entries.last().unwrap();
        assert_eq!(last.participant_id(), &id("dave"));
        assert_eq!(last.amount_owed(), dec("0.00"));
        assert_eq!(last.amount_paid(), dec("10.00"));
        assert!(net_sum(&entries).is_zero());
    }

    #[test]
    fn weighted_bill_with_tax_and_tip() {
        let mut bill = dinner();
        bill.amounts = BillAmounts::new(dec("80"))
            .with_tax(dec("6.40"))
            .with_tip(dec("13.605"));
        bill.split = SplitMethod::Weighted(vec![dec("2"), dec("1"), dec("1")]);
        let entries = bill.ledger_entries().unwrap();
        let owed: Vec<String> = entries.iter().map(|e| e.amount_owed().to_string()).collect();
        // 100.005 rounds to 100.01; exact shares 50.0025, 25.00125, 25.00125
        // round to 100.00, and the largest remainder takes the missing cent.
        assert_eq!(owed, ["50.01", "25.00", "25.00"]);
        assert_eq!(entries[0].amount_paid(), dec("100.01"));
        assert!(net_sum(&entries).is_zero());
    }

    #[test]
    fn balances_across_several_bills() {
        let first = dinner();
        let mut second = dinner();
        second.id = BillId::new("taxi").unwrap();
        second.payer = id("bob");
        second.amounts = BillAmounts::new(dec("30.00"));

        let mut entries = first.ledger_entries().unwrap();
        entries.extend(second.ledger_entries().unwrap());

        let balances = net_balances(&entries);
        assert_eq!(balances[&id("alice")].value, dec("-3.34"));
        assert_eq!(balances[&id("bob")].value, dec("16.67"));
        assert_eq!(balances[&id("carol")].value, dec("-13.33"));
    }

    #[test]
    fn total_rejects_negative_components() {
        let amounts = BillAmounts::new(dec("10")).with_tip(dec("-1"));
        assert_eq!(
            amounts.total(),
            Err(AllocationError::NegativeAmount {
                field: AmountField::Tip,
                value: dec("-1"),
            })
        );
    }

    #[test]
    fn total_keeps_largest_scale() {
        let amounts = BillAmounts::new(dec("1.5")).with_tax(dec("0.125"));
        assert_eq!(amounts.total().unwrap().to_string(), "1.625");
    }

    #[test]
    fn rejects_duplicate_participants() {
        let mut bill = dinner();
        bill.participants.push(id("bob"));
        assert_eq!(
            bill.ledger_entries(),
            Err(BillError::DuplicateParticipant(id("bob")))
        );
    }

    #[test]
    fn rejects_empty_participant_list() {
        let mut bill = dinner();
        bill.participants.clear();
        assert_eq!(
            bill.ledger_entries(),
            Err(BillError::Allocation(
                AllocationError::InvalidParticipantCount { count: 0 }
            ))
        );
    }
}
