use std::io::Write;

use api_types::{
    SplitMethod,
    ledger::GroupLedger,
    report::{BalanceView, LedgerReport, SplitLineView, SplitView, SuggestionView},
};
use chrono::NaiveDate;
use ledger::{Balance, Money, SettlementSuggestion, SplitResult};

use crate::{config::OutputFormat, error::Result, input::method_for};

pub fn split_view(split: &SplitResult) -> SplitView {
    SplitView {
        split_method: method_for(split.policy),
        total_minor: split.total.minor(),
        lines: split
            .lines
            .iter()
            .map(|line| SplitLineView {
                member: line.member_id.to_string(),
                owed_minor: line.owed.minor(),
            })
            .collect(),
    }
}

pub fn ledger_report(
    ledger: &GroupLedger,
    as_of: Option<NaiveDate>,
    balances: &[Balance],
    suggestions: Option<&[SettlementSuggestion]>,
) -> LedgerReport {
    let name_of = |member_id: &str| {
        ledger
            .members
            .iter()
            .find(|member| member.id == member_id)
            .and_then(|member| member.name.clone())
    };

    LedgerReport {
        name: ledger.name.clone(),
        currency: ledger.currency.clone(),
        as_of,
        balances: balances
            .iter()
            .map(|balance| BalanceView {
                member: balance.member_id.to_string(),
                name: name_of(balance.member_id.as_str()),
                net_minor: balance.net.minor(),
            })
            .collect(),
        suggestions: suggestions.map(|suggestions| {
            suggestions
                .iter()
                .map(|suggestion| SuggestionView {
                    from: suggestion.from.to_string(),
                    to: suggestion.to.to_string(),
                    amount_minor: suggestion.amount.minor(),
                })
                .collect()
        }),
    }
}

fn method_label(method: SplitMethod) -> &'static str {
    match method {
        SplitMethod::Equal => "Equal",
        SplitMethod::ExactAmounts => "Exact",
        SplitMethod::Percentages => "Percentage",
        SplitMethod::Shares => "Shares",
    }
}

fn signed(minor: i64) -> String {
    let amount = Money::new(minor);
    if amount.is_positive() {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}

pub fn write_split(out: &mut impl Write, format: OutputFormat, view: &SplitView) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, view)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{} split of {}",
                method_label(view.split_method),
                Money::new(view.total_minor)
            )?;
            for line in &view.lines {
                writeln!(out, "  {:<16} {:>12}", line.member, Money::new(line.owed_minor))?;
            }
        }
    }
    Ok(())
}

pub fn write_report(out: &mut impl Write, format: OutputFormat, report: &LedgerReport) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let title = report.name.as_deref().unwrap_or("Group");
            match (&report.currency, report.as_of) {
                (Some(currency), Some(as_of)) => {
                    writeln!(out, "{title} balances ({currency}, as of {as_of})")?
                }
                (Some(currency), None) => writeln!(out, "{title} balances ({currency})")?,
                (None, Some(as_of)) => writeln!(out, "{title} balances (as of {as_of})")?,
                (None, None) => writeln!(out, "{title} balances")?,
            }
            for balance in &report.balances {
                let label = match &balance.name {
                    Some(name) => format!("{} ({name})", balance.member),
                    None => balance.member.clone(),
                };
                writeln!(out, "  {label:<24} {:>12}", signed(balance.net_minor))?;
            }

            if let Some(suggestions) = &report.suggestions {
                writeln!(out)?;
                if suggestions.is_empty() {
                    writeln!(out, "All settled up.")?;
                } else {
                    writeln!(out, "Suggested transfers")?;
                    for suggestion in suggestions {
                        writeln!(
                            out,
                            "  {} -> {}: {}",
                            suggestion.from,
                            suggestion.to,
                            Money::new(suggestion.amount_minor)
                        )?;
                    }
                }
            }
        }
    }
    Ok(())
}
