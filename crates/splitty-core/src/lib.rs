//! Core money logic for splitty.
//!
//! This crate contains the pure, synchronous computations behind bill
//! splitting:
//! - Decimal: fixed-point amounts with explicit scale and rounding
//! - Allocation: splitting a total into minor-unit shares that sum exactly
//! - Balances: folding ledger entries into per-participant net balances
//! - Bills: turning a bill into ledger entries

mod allocation;
mod balance;
mod bill;
pub mod decimal;
mod ids;

pub use allocation::{AllocationError, AmountField, allocate, allocate_bill};
pub use balance::{
    BalanceSummary, LedgerEntry, MAX_ENTRY_AMOUNT, NetBalance, net_balance, net_balances, summarize,
};
pub use bill::{Bill, BillAmounts, BillError, SplitMethod};
pub use decimal::{CURRENCY_SCALE, DecimalError, EXACT_SCALE, FixedDecimal, Rounding};
pub use ids::{BillId, ParticipantId, ValidationError};
