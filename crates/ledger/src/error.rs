//! The module contains the errors the ledger core can return.
//!
//! Every variant describes invalid input and is non-retryable, except
//! [`Unreconciled`], which signals a defect in the allocator itself.
//!
//! The outer layer maps each variant to a user-facing message through
//! [`LedgerError::code`].
//!
//!  [`Unreconciled`]: LedgerError::Unreconciled
use thiserror::Error;

use crate::{MemberId, Money};

/// Ledger custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid total: {0} must be > 0")]
    InvalidTotal(Money),
    #[error("At least one participant is required")]
    NoParticipants,
    #[error("Missing exact amount for \"{0}\"")]
    MissingAmount(MemberId),
    #[error("Missing percent for \"{0}\"")]
    MissingPercent(MemberId),
    #[error("Missing shares for \"{0}\"")]
    MissingShares(MemberId),
    #[error("Negative amount for \"{0}\"")]
    NegativeAmount(MemberId),
    #[error("Exact amounts sum to {actual}, expected {expected}")]
    AmountsMustMatchTotal { expected: Money, actual: Money },
    #[error("Percentages sum to {0}, expected 100")]
    PercentagesMustSum100(u32),
    #[error("Total shares must be > 0")]
    SharesMustBePositive,
    #[error("Participant \"{0}\" does not match the split policy")]
    MixedPolicy(MemberId),
    #[error("\"{0}\" appears more than once")]
    DuplicateParticipant(MemberId),
    #[error("\"{0}\" is not a member of the group")]
    UnknownMember(MemberId),
    #[error("Balance of \"{0}\" exceeds the largest representable amount")]
    AmountOverflow(MemberId),
    #[error("Balances do not sum to zero (residual {residual})")]
    UnbalancedLedger { residual: Money },
    #[error("Invalid money: {0}")]
    InvalidMoney(String),
    #[error("Split does not reconcile: {actual} allocated, {expected} expected")]
    Unreconciled { expected: Money, actual: Money },
}

impl LedgerError {
    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTotal(_) => "INVALID_TOTAL",
            Self::NoParticipants => "NO_PARTICIPANTS",
            Self::MissingAmount(_) => "MISSING_EXACT_AMOUNTS",
            Self::MissingPercent(_) => "MISSING_PERCENTAGES",
            Self::MissingShares(_) => "MISSING_SHARES",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::AmountsMustMatchTotal { .. } => "EXACT_AMOUNTS_MUST_MATCH_TOTAL",
            Self::PercentagesMustSum100(_) => "PERCENTAGES_MUST_SUM_100",
            Self::SharesMustBePositive => "SHARES_MUST_BE_POSITIVE",
            Self::MixedPolicy(_) => "MIXED_POLICY",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::UnknownMember(_) => "UNKNOWN_MEMBER",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::UnbalancedLedger { .. } => "UNBALANCED_LEDGER",
            Self::InvalidMoney(_) => "INVALID_MONEY_FORMAT",
            Self::Unreconciled { .. } => "SPLIT_UNRECONCILED",
        }
    }

    /// Returns `true` when the error points at a bug rather than bad input.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::Unreconciled { .. })
    }
}
