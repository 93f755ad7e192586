//! Balance aggregation.
//!
//! Folds already-recorded expenses and settlements into one net [`Balance`]
//! per member. Positive means the group owes the member, negative means the
//! member owes the group.
//!
//! Folding is plain integer addition in `i128`, so the result only depends on
//! the set of events, never on their order. Only the final nets have to fit in
//! a [`Money`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{LedgerError, MemberId, Money, ResultLedger, SplitLine, SplitResult};

/// A recorded expense: `payer` paid `total`, each participant owes its line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub payer: MemberId,
    pub total: Money,
    pub participants: Vec<SplitLine>,
}

impl Expense {
    /// Builds an expense from an allocation paid by `payer`.
    pub fn from_split(payer: impl Into<MemberId>, split: SplitResult) -> Self {
        Self {
            payer: payer.into(),
            total: split.total,
            participants: split.lines,
        }
    }
}

/// A recorded repayment from `from` to `to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub member_id: MemberId,
    pub net: Money,
}

impl Balance {
    pub fn new(member_id: impl Into<MemberId>, net: Money) -> Self {
        Self {
            member_id: member_id.into(),
            net,
        }
    }
}

/// Net balance of every member after applying `expenses` and `settlements`.
///
/// Declared members come first, in declaration order (repeated ids collapse to
/// their first position), each starting at zero. Ids referenced by an event
/// but missing from `members` are kept rather than rejected: they are appended
/// after the declared members in ascending id order, so the balances still sum
/// to zero. Use [`aggregate_strict`] to reject them instead.
///
/// # Errors
///
/// [`LedgerError::AmountOverflow`] if a net balance does not fit in a
/// [`Money`].
pub fn aggregate(
    members: &[MemberId],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> ResultLedger<Vec<Balance>> {
    let mut sheet = BalanceSheet::new(members);
    for expense in expenses {
        sheet.apply_expense(expense);
    }
    for settlement in settlements {
        sheet.apply_settlement(settlement);
    }
    sheet.into_balances(members)
}

/// Same as [`aggregate`], but every referenced id must be a declared member.
///
/// # Errors
///
/// [`LedgerError::UnknownMember`] for the first undeclared id, scanning
/// expenses (payer, then participants) before settlements (sender, then
/// receiver). Otherwise the errors of [`aggregate`].
pub fn aggregate_strict(
    members: &[MemberId],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> ResultLedger<Vec<Balance>> {
    let declared: BTreeSet<&MemberId> = members.iter().collect();
    let ensure_known = |member_id: &MemberId| -> ResultLedger<()> {
        if declared.contains(member_id) {
            Ok(())
        } else {
            Err(LedgerError::UnknownMember(member_id.clone()))
        }
    };

    for expense in expenses {
        ensure_known(&expense.payer)?;
        for line in &expense.participants {
            ensure_known(&line.member_id)?;
        }
    }
    for settlement in settlements {
        ensure_known(&settlement.from)?;
        ensure_known(&settlement.to)?;
    }

    aggregate(members, expenses, settlements)
}

struct BalanceSheet {
    nets: BTreeMap<MemberId, i128>,
}

impl BalanceSheet {
    fn new(members: &[MemberId]) -> Self {
        Self {
            nets: members
                .iter()
                .map(|member_id| (member_id.clone(), 0))
                .collect(),
        }
    }

    fn entry(&mut self, member_id: &MemberId) -> &mut i128 {
        self.nets.entry(member_id.clone()).or_default()
    }

    // i128 holds the sum of far more i64 events than a ledger can contain.
    fn apply_expense(&mut self, expense: &Expense) {
        *self.entry(&expense.payer) += i128::from(expense.total.minor());
        for line in &expense.participants {
            *self.entry(&line.member_id) -= i128::from(line.owed.minor());
        }
    }

    fn apply_settlement(&mut self, settlement: &Settlement) {
        *self.entry(&settlement.from) += i128::from(settlement.amount.minor());
        *self.entry(&settlement.to) -= i128::from(settlement.amount.minor());
    }

    fn into_balances(mut self, members: &[MemberId]) -> ResultLedger<Vec<Balance>> {
        let mut balances = Vec::with_capacity(self.nets.len());
        for member_id in members {
            if let Some(net) = self.nets.remove(member_id) {
                balances.push(balance(member_id.clone(), net)?);
            }
        }
        // Whatever is left was never declared; BTreeMap yields it sorted.
        for (member_id, net) in self.nets {
            balances.push(balance(member_id, net)?);
        }
        Ok(balances)
    }
}

fn balance(member_id: MemberId, net: i128) -> ResultLedger<Balance> {
    match i64::try_from(net) {
        Ok(net) => Ok(Balance {
            member_id,
            net: Money::new(net),
        }),
        Err(_) => Err(LedgerError::AmountOverflow(member_id)),
    }
}
