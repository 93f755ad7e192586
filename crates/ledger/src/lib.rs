//! Ledger core for shared group expenses.
//!
//! Three independent, pure components working on integer minor units:
//!
//! - [`allocate`] divides an expense total among its participants.
//! - [`aggregate`] folds expenses and settlements into net [`Balance`]s.
//! - [`minimize`] turns balances into [`SettlementSuggestion`]s.
//!
//! Nothing here performs I/O or keeps state; every function can be called
//! concurrently on its own inputs.
//!
//! ```rust
//! use ledger::{Expense, MemberId, Money, ParticipantInput, SplitPolicy};
//!
//! let members: Vec<MemberId> = ["A", "B", "C"].into_iter().map(MemberId::from).collect();
//! let participants: Vec<_> = members.iter().cloned().map(ParticipantInput::unweighted).collect();
//!
//! let split = ledger::allocate(Money::new(4500), SplitPolicy::Equal, &participants)?;
//! let balances = ledger::aggregate(&members, &[Expense::from_split("A", split)], &[])?;
//! let suggestions = ledger::minimize(&balances)?;
//!
//! assert_eq!(suggestions.len(), 2);
//! assert_eq!(suggestions[0].to.as_str(), "A");
//! # Ok::<(), ledger::LedgerError>(())
//! ```

pub use balances::{Balance, Expense, Settlement, aggregate, aggregate_strict};
pub use error::LedgerError;
pub use member::MemberId;
pub use money::Money;
pub use settlements::{SettlementSuggestion, minimize};
pub use split::{
    ParticipantInput, SplitLine, SplitPolicy, SplitResult, SplitWeight, allocate,
    ensure_unique_participants,
};

mod balances;
mod error;
mod member;
mod money;
mod settlements;
mod split;

pub type ResultLedger<T> = Result<T, LedgerError>;
