//! Split allocator.
//!
//! [`allocate`] divides a positive total across the participants of an expense
//! under a single [`SplitPolicy`]. Whatever the policy, the returned lines sum
//! to the total exactly.
//!
//! Rounding is always floor-then-distribute:
//! - `Equal`: the first `total % n` participants, by input position, get one
//!   extra minor unit.
//! - `Percentages` / `Shares`: each participant gets
//!   `floor(total * weight / total_weight)`; the leftover units go one at a
//!   time to participants with a non-zero weight, ordered by [`MemberId`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{LedgerError, MemberId, Money, ResultLedger};

/// How a total is divided among the participants of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitPolicy {
    Equal,
    ExactAmounts,
    Percentages,
    Shares,
}

impl SplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::ExactAmounts => "EXACT_AMOUNTS",
            Self::Percentages => "PERCENTAGES",
            Self::Shares => "SHARES",
        }
    }
}

impl TryFrom<&str> for SplitPolicy {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(Self::Equal),
            "EXACT" | "EXACT_AMOUNTS" => Ok(Self::ExactAmounts),
            "PERCENT" | "PERCENTAGES" => Ok(Self::Percentages),
            "SHARES" => Ok(Self::Shares),
            other => Err(format!("unsupported split policy: {other}")),
        }
    }
}

/// Per-participant input for a split.
///
/// Each variant belongs to exactly one policy; `Unweighted` is the only valid
/// weight under [`SplitPolicy::Equal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SplitWeight {
    Unweighted,
    Amount(Money),
    Percent(u8),
    Shares(u32),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub member_id: MemberId,
    pub weight: SplitWeight,
}

impl ParticipantInput {
    pub fn unweighted(member_id: impl Into<MemberId>) -> Self {
        Self {
            member_id: member_id.into(),
            weight: SplitWeight::Unweighted,
        }
    }

    pub fn amount(member_id: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            member_id: member_id.into(),
            weight: SplitWeight::Amount(amount),
        }
    }

    pub fn percent(member_id: impl Into<MemberId>, percent: u8) -> Self {
        Self {
            member_id: member_id.into(),
            weight: SplitWeight::Percent(percent),
        }
    }

    pub fn shares(member_id: impl Into<MemberId>, shares: u32) -> Self {
        Self {
            member_id: member_id.into(),
            weight: SplitWeight::Shares(shares),
        }
    }
}

/// What a single participant owes for an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    pub member_id: MemberId,
    pub owed: Money,
}

/// Outcome of [`allocate`]: one line per participant, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    pub policy: SplitPolicy,
    pub total: Money,
    pub lines: Vec<SplitLine>,
}

impl SplitResult {
    /// Owed amount for `member_id`, if they took part in the split.
    pub fn owed_by(&self, member_id: &str) -> Option<Money> {
        self.lines
            .iter()
            .find(|line| line.member_id.as_str() == member_id)
            .map(|line| line.owed)
    }

    /// Owed amounts in input order.
    pub fn amounts(&self) -> Vec<Money> {
        self.lines.iter().map(|line| line.owed).collect()
    }
}

/// Divides `total` across `participants` under `policy`.
///
/// Participant ids must be pairwise unique; the allocator does not deduplicate
/// them (see [`ensure_unique_participants`]).
///
/// # Errors
///
/// Returns the first failed precondition: [`InvalidTotal`],
/// [`NoParticipants`], a weight/policy mismatch ([`MixedPolicy`] or one of the
/// `Missing*` variants), then the policy-specific checks.
///
///  [`InvalidTotal`]: LedgerError::InvalidTotal
///  [`NoParticipants`]: LedgerError::NoParticipants
///  [`MixedPolicy`]: LedgerError::MixedPolicy
pub fn allocate(
    total: Money,
    policy: SplitPolicy,
    participants: &[ParticipantInput],
) -> ResultLedger<SplitResult> {
    if !total.is_positive() {
        return Err(LedgerError::InvalidTotal(total));
    }
    if participants.is_empty() {
        return Err(LedgerError::NoParticipants);
    }

    let owed = match policy {
        SplitPolicy::Equal => {
            collect_weights(participants, LedgerError::MixedPolicy, |weight| {
                matches!(weight, SplitWeight::Unweighted).then_some(())
            })?;
            split_equal(total, participants.len())?
        }
        SplitPolicy::ExactAmounts => {
            let amounts = collect_weights(participants, LedgerError::MissingAmount, |weight| {
                match weight {
                    SplitWeight::Amount(amount) => Some(amount),
                    _ => None,
                }
            })?;
            split_exact(total, participants, amounts)?
        }
        SplitPolicy::Percentages => {
            let percents = collect_weights(participants, LedgerError::MissingPercent, |weight| {
                match weight {
                    SplitWeight::Percent(percent) => Some(u64::from(percent)),
                    _ => None,
                }
            })?;
            let total_percent: u64 = percents.iter().sum();
            if total_percent != 100 {
                // At most 255 * len; saturate rather than wrap for absurd inputs.
                let reported = u32::try_from(total_percent).unwrap_or(u32::MAX);
                return Err(LedgerError::PercentagesMustSum100(reported));
            }
            split_weighted(total, participants, &percents, total_percent)?
        }
        SplitPolicy::Shares => {
            let shares = collect_weights(participants, LedgerError::MissingShares, |weight| {
                match weight {
                    SplitWeight::Shares(shares) => Some(u64::from(shares)),
                    _ => None,
                }
            })?;
            let total_shares: u64 = shares.iter().sum();
            if total_shares == 0 {
                return Err(LedgerError::SharesMustBePositive);
            }
            split_weighted(total, participants, &shares, total_shares)?
        }
    };

    let split = SplitResult {
        policy,
        total,
        lines: participants
            .iter()
            .zip(owed)
            .map(|(participant, owed)| SplitLine {
                member_id: participant.member_id.clone(),
                owed,
            })
            .collect(),
    };
    ensure_reconciled(total, &split.amounts())?;
    Ok(split)
}

/// Fails with [`LedgerError::DuplicateParticipant`] on the first repeated id.
///
/// [`allocate`] assumes unique participants; callers building inputs from
/// untrusted records run this first.
pub fn ensure_unique_participants(participants: &[ParticipantInput]) -> ResultLedger<()> {
    let mut seen = BTreeSet::new();
    for participant in participants {
        if !seen.insert(&participant.member_id) {
            return Err(LedgerError::DuplicateParticipant(
                participant.member_id.clone(),
            ));
        }
    }
    Ok(())
}

/// Extract the policy weight of every participant, in input order.
///
/// An `Unweighted` participant is reported with `missing`; any other weight
/// that `pick` rejects belongs to a different policy.
fn collect_weights<T>(
    participants: &[ParticipantInput],
    missing: fn(MemberId) -> LedgerError,
    pick: impl Fn(SplitWeight) -> Option<T>,
) -> ResultLedger<Vec<T>> {
    participants
        .iter()
        .map(|participant| match pick(participant.weight) {
            Some(value) => Ok(value),
            None if participant.weight == SplitWeight::Unweighted => {
                Err(missing(participant.member_id.clone()))
            }
            None => Err(LedgerError::MixedPolicy(participant.member_id.clone())),
        })
        .collect()
}

fn split_equal(total: Money, count: usize) -> ResultLedger<Vec<Money>> {
    let count = i64::try_from(count).map_err(|_| unreconciled(total, i128::MAX))?;
    let base = total.minor() / count;
    let remainder = total.minor() - base * count;
    Ok((0..count)
        .map(|index| Money::new(base + i64::from(index < remainder)))
        .collect())
}

fn split_exact(
    total: Money,
    participants: &[ParticipantInput],
    amounts: Vec<Money>,
) -> ResultLedger<Vec<Money>> {
    if let Some((participant, _)) = participants
        .iter()
        .zip(&amounts)
        .find(|(_, amount)| amount.is_negative())
    {
        return Err(LedgerError::NegativeAmount(participant.member_id.clone()));
    }

    let sum: i128 = amounts.iter().map(|amount| i128::from(amount.minor())).sum();
    if sum != i128::from(total.minor()) {
        return Err(LedgerError::AmountsMustMatchTotal {
            expected: total,
            actual: saturate(sum),
        });
    }
    Ok(amounts)
}

fn split_weighted(
    total: Money,
    participants: &[ParticipantInput],
    weights: &[u64],
    total_weight: u64,
) -> ResultLedger<Vec<Money>> {
    let mut owed: Vec<i64> = weights
        .iter()
        .map(|&weight| floor_share(total, weight, total_weight))
        .collect::<ResultLedger<_>>()?;

    let mut remainder = total.minor() - owed.iter().sum::<i64>();

    let mut order: Vec<usize> = (0..participants.len()).collect();
    order.sort_by(|&a, &b| {
        participants[a]
            .member_id
            .cmp(&participants[b].member_id)
            .then(a.cmp(&b))
    });

    let mut cursor = 0;
    while remainder > 0 && !order.is_empty() {
        owed[order[cursor % order.len()]] += 1;
        remainder -= 1;
        cursor += 1;
    }

    Ok(owed.into_iter().map(Money::new).collect())
}

/// `floor(total * weight / total_weight)` without intermediate overflow.
fn floor_share(total: Money, weight: u64, total_weight: u64) -> ResultLedger<i64> {
    let share = i128::from(total.minor()) * i128::from(weight) / i128::from(total_weight);
    i64::try_from(share).map_err(|_| unreconciled(total, share))
}

fn ensure_reconciled(total: Money, owed: &[Money]) -> ResultLedger<()> {
    let sum: i128 = owed.iter().map(|amount| i128::from(amount.minor())).sum();
    if sum != i128::from(total.minor()) {
        return Err(unreconciled(total, sum));
    }
    Ok(())
}

fn unreconciled(total: Money, actual: i128) -> LedgerError {
    LedgerError::Unreconciled {
        expected: total,
        actual: saturate(actual),
    }
}

fn saturate(minor: i128) -> Money {
    Money::new(i64::try_from(minor).unwrap_or(if minor < 0 { i64::MIN } else { i64::MAX }))
}
