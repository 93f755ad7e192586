use std::{io, path::PathBuf, process::ExitCode};

use api_types::ledger::GroupLedger;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ledger::{Balance, Money, SplitPolicy};

use crate::{
    config::{OutputFormat, Overrides, Settings},
    error::{AppError, Result},
};

mod config;
mod error;
mod input;
mod report;

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Split shared expenses and work out who owes whom")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the log level (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Reject events that reference undeclared members.
    #[arg(long, global = true)]
    strict: bool,
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate a total across participants.
    Split(SplitArgs),
    /// Print the net balance of every member.
    Balances(LedgerArgs),
    /// Print balances and the transfers that settle them.
    Settle(LedgerArgs),
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Total as a decimal string, e.g. `12.34`.
    #[arg(long)]
    total: String,
    /// One of `equal`, `exact`, `percent`, `shares`.
    #[arg(long, default_value = "equal", value_parser = parse_policy)]
    policy: SplitPolicy,
    /// `ID` for equal splits, `ID=VALUE` otherwise. Repeat per participant.
    #[arg(long = "participant", short = 'p', required = true)]
    participants: Vec<String>,
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// Group ledger exported as JSON.
    #[arg(long, env = "LEDGER_FILE")]
    ledger: PathBuf,
    /// Ignore events dated after this day (YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

fn parse_policy(raw: &str) -> std::result::Result<SplitPolicy, String> {
    SplitPolicy::try_from(raw)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match config::load(Overrides {
        config: cli.config.clone(),
        level: cli.log_level.clone(),
        strict_members: cli.strict.then_some(true),
        format: cli.format,
    }) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error [{}]: {err}", err.code());
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger_cli={level},ledger={level}",
            level = settings.level
        ))
        .with_writer(io::stderr)
        .init();

    match run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {err:?}");
            eprintln!("error [{}]: {err}", err.code());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Command::Split(args) => {
            let total: Money = args.total.parse()?;
            let participants = args
                .participants
                .iter()
                .map(|raw| input::participant_arg(args.policy, raw))
                .collect::<Result<Vec<_>>>()?;
            ledger::ensure_unique_participants(&participants)?;

            let split = ledger::allocate(total, args.policy, &participants)?;
            tracing::debug!(
                "split {total} across {} participants ({})",
                participants.len(),
                args.policy.as_str()
            );
            report::write_split(&mut out, settings.format, &report::split_view(&split))
        }
        Command::Balances(args) => {
            let group = read_ledger(&args)?;
            let balances = balances(&group, args.as_of, settings)?;
            let view = report::ledger_report(&group, args.as_of, &balances, None);
            report::write_report(&mut out, settings.format, &view)
        }
        Command::Settle(args) => {
            let group = read_ledger(&args)?;
            let balances = balances(&group, args.as_of, settings)?;
            let suggestions = ledger::minimize(&balances)?;
            tracing::info!("{} transfers settle the group", suggestions.len());
            let view =
                report::ledger_report(&group, args.as_of, &balances, Some(suggestions.as_slice()));
            report::write_report(&mut out, settings.format, &view)
        }
    }
}

fn read_ledger(args: &LedgerArgs) -> Result<GroupLedger> {
    let file = std::fs::File::open(&args.ledger)?;
    let group: GroupLedger = serde_json::from_reader(io::BufReader::new(file))?;
    tracing::info!(
        "loaded {} with {} members, {} expenses, {} settlements",
        args.ledger.display(),
        group.members.len(),
        group.expenses.len(),
        group.settlements.len()
    );
    Ok(group)
}

fn balances(
    group: &GroupLedger,
    as_of: Option<NaiveDate>,
    settings: &Settings,
) -> Result<Vec<Balance>> {
    let events = input::events(group, as_of)?;
    if settings.strict_members {
        return ledger::aggregate_strict(&events.members, &events.expenses, &events.settlements)
            .map_err(AppError::from);
    }

    let balances = ledger::aggregate(&events.members, &events.expenses, &events.settlements)?;
    for balance in balances.iter().filter(|b| !events.members.contains(&b.member_id)) {
        tracing::warn!("\"{}\" is not a declared member of the group", balance.member_id);
    }
    Ok(balances)
}
