//! Settlement minimizer.
//!
//! Turns a zero-sum balance snapshot into transfers that clear it, using a
//! single greedy pass that always pairs the largest remaining creditor with the
//! largest remaining debtor. The pass emits at most
//! `creditors + debtors - 1` transfers; it is not a global optimum.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::{Balance, LedgerError, MemberId, Money, ResultLedger};

/// A proposed payment from a debtor to a creditor. `amount` is always > 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

// Magnitudes are unsigned: a debt of `i64::MIN` has no positive `i64` twin.
struct Party<'a> {
    member_id: &'a MemberId,
    remaining: u64,
}

/// Suggests transfers that bring every balance to zero.
///
/// Creditors are matched largest first, debtors most negative first; equal
/// magnitudes are ordered by member id, so the output is reproducible.
///
/// # Errors
///
/// [`LedgerError::UnbalancedLedger`] if the balances do not sum to zero.
pub fn minimize(balances: &[Balance]) -> ResultLedger<Vec<SettlementSuggestion>> {
    let residual: i128 = balances.iter().map(|b| i128::from(b.net.minor())).sum();
    if residual != 0 {
        return Err(LedgerError::UnbalancedLedger {
            residual: Money::new(i64::try_from(residual).unwrap_or(i64::MAX)),
        });
    }

    let mut creditors: Vec<Party<'_>> = balances
        .iter()
        .filter(|b| b.net.is_positive())
        .map(|b| Party {
            member_id: &b.member_id,
            remaining: b.net.minor().unsigned_abs(),
        })
        .collect();
    let mut debtors: Vec<Party<'_>> = balances
        .iter()
        .filter(|b| b.net.is_negative())
        .map(|b| Party {
            member_id: &b.member_id,
            remaining: b.net.minor().unsigned_abs(),
        })
        .collect();

    creditors.sort_by_key(|party| (Reverse(party.remaining), party.member_id));
    debtors.sort_by_key(|party| (Reverse(party.remaining), party.member_id));

    let mut suggestions = Vec::new();
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let creditor = &mut creditors[c];
        let debtor = &mut debtors[d];

        let amount = creditor.remaining.min(debtor.remaining);
        if amount > 0 {
            // Bounded by a creditor's positive net.
            let amount = i64::try_from(amount)
                .map_err(|_| LedgerError::AmountOverflow(creditor.member_id.clone()))?;
            suggestions.push(SettlementSuggestion {
                from: debtor.member_id.clone(),
                to: creditor.member_id.clone(),
                amount: Money::new(amount),
            });
        }

        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining == 0 {
            c += 1;
        }
        if debtor.remaining == 0 {
            d += 1;
        }
    }

    Ok(suggestions)
}
