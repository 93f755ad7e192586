//! Conversion of wire records and command line arguments into ledger inputs.
//!
//! This is where the checks the core leaves to its caller happen: decimal
//! strings become [`Money`], participant records become tagged
//! [`SplitWeight`]s, duplicate participants are rejected, and soft-deleted or
//! future-dated events are dropped.

use api_types::{
    SplitMethod,
    ledger::{ExpenseRecord, GroupLedger, ParticipantRecord, SettlementRecord},
};
use chrono::NaiveDate;
use ledger::{
    Expense, LedgerError, MemberId, Money, ParticipantInput, ResultLedger, Settlement,
    SplitPolicy, SplitWeight, allocate, ensure_unique_participants,
};

use crate::error::{AppError, Result};

/// Ledger events ready for aggregation.
#[derive(Debug, Default)]
pub struct Events {
    pub members: Vec<MemberId>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

pub fn policy_for(method: SplitMethod) -> SplitPolicy {
    match method {
        SplitMethod::Equal => SplitPolicy::Equal,
        SplitMethod::ExactAmounts => SplitPolicy::ExactAmounts,
        SplitMethod::Percentages => SplitPolicy::Percentages,
        SplitMethod::Shares => SplitPolicy::Shares,
    }
}

pub fn method_for(policy: SplitPolicy) -> SplitMethod {
    match policy {
        SplitPolicy::Equal => SplitMethod::Equal,
        SplitPolicy::ExactAmounts => SplitMethod::ExactAmounts,
        SplitPolicy::Percentages => SplitMethod::Percentages,
        SplitPolicy::Shares => SplitMethod::Shares,
    }
}

/// Turns a loose participant record into a tagged input.
///
/// A record populating more than one of `amount`/`percent`/`shares` cannot
/// belong to a single policy and is rejected as [`LedgerError::MixedPolicy`].
pub fn participant_input(record: &ParticipantRecord) -> ResultLedger<ParticipantInput> {
    let member_id = MemberId::from(record.member.as_str());
    let populated = [
        record.amount.is_some(),
        record.percent.is_some(),
        record.shares.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();
    if populated > 1 {
        return Err(LedgerError::MixedPolicy(member_id));
    }

    let weight = match (&record.amount, record.percent, record.shares) {
        (Some(amount), _, _) => SplitWeight::Amount(amount.parse::<Money>()?),
        (_, Some(percent), _) => SplitWeight::Percent(percent),
        (_, _, Some(shares)) => SplitWeight::Shares(shares),
        _ => SplitWeight::Unweighted,
    };

    Ok(ParticipantInput { member_id, weight })
}

/// Parses a `--participant ID[=VALUE]` argument for `policy`.
pub fn participant_arg(policy: SplitPolicy, raw: &str) -> Result<ParticipantInput> {
    let (id, value) = match raw.split_once('=') {
        Some((id, value)) => (id.trim(), Some(value.trim())),
        None => (raw.trim(), None),
    };
    if id.is_empty() {
        return Err(AppError::Input(format!("missing participant id in \"{raw}\"")));
    }

    let weight = match (policy, value) {
        (_, None) => SplitWeight::Unweighted,
        (SplitPolicy::Equal, Some(_)) => {
            return Err(AppError::Input(format!(
                "equal splits take no weight, got \"{raw}\""
            )));
        }
        (SplitPolicy::ExactAmounts, Some(value)) => SplitWeight::Amount(value.parse()?),
        (SplitPolicy::Percentages, Some(value)) => SplitWeight::Percent(
            value
                .parse()
                .map_err(|_| AppError::Input(format!("invalid percent in \"{raw}\"")))?,
        ),
        (SplitPolicy::Shares, Some(value)) => SplitWeight::Shares(
            value
                .parse()
                .map_err(|_| AppError::Input(format!("invalid shares in \"{raw}\"")))?,
        ),
    };

    Ok(ParticipantInput {
        member_id: MemberId::from(id),
        weight,
    })
}

fn is_after(date: Option<NaiveDate>, as_of: Option<NaiveDate>) -> bool {
    matches!((date, as_of), (Some(date), Some(as_of)) if date > as_of)
}

/// Re-splits a stored expense and returns it as a ledger event.
pub fn expense_event(record: &ExpenseRecord) -> ResultLedger<Expense> {
    let total: Money = record.total.parse()?;
    let participants = record
        .participants
        .iter()
        .map(participant_input)
        .collect::<ResultLedger<Vec<_>>>()?;
    ensure_unique_participants(&participants)?;
    let split = allocate(total, policy_for(record.split_method), &participants)?;
    if let Some(own_share) = split.owed_by(&record.paid_by) {
        tracing::debug!("{} paid {total} and owes {own_share} of it", record.paid_by);
    }
    Ok(Expense::from_split(record.paid_by.as_str(), split))
}

pub fn settlement_event(record: &SettlementRecord) -> ResultLedger<Settlement> {
    Ok(Settlement {
        from: MemberId::from(record.from.as_str()),
        to: MemberId::from(record.to.as_str()),
        amount: record.amount.parse()?,
    })
}

/// Collects the events of `ledger` that count towards balances at `as_of`.
pub fn events(ledger: &GroupLedger, as_of: Option<NaiveDate>) -> Result<Events> {
    let mut events = Events {
        members: ledger
            .members
            .iter()
            .map(|member| MemberId::from(member.id.as_str()))
            .collect(),
        ..Events::default()
    };

    for (index, record) in ledger.expenses.iter().enumerate() {
        let label = record
            .id
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1));
        if record.deleted {
            tracing::debug!("skipping deleted expense {label}");
            continue;
        }
        if is_after(record.expense_date, as_of) {
            tracing::debug!("skipping expense {label} dated after the cut-off");
            continue;
        }
        let expense = expense_event(record).map_err(|source| AppError::Expense {
            expense: label,
            source,
        })?;
        events.expenses.push(expense);
    }

    for (index, record) in ledger.settlements.iter().enumerate() {
        if is_after(record.settled_on, as_of) {
            tracing::debug!("skipping settlement #{} dated after the cut-off", index + 1);
            continue;
        }
        let settlement = settlement_event(record)
            .map_err(|source| AppError::Settlement {
                index: index + 1,
                source,
            })?;
        events.settlements.push(settlement);
    }

    Ok(events)
}
