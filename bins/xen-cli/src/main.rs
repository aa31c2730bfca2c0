//! xen-cli — Calculator and simulator for the XEN emission engine.
//!
//! Evaluates the decay schedules and reward formulas at arbitrary points in
//! time, and replays JSON scripts of operations against an in-memory ledger.

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use xen_core::constants::{COIN, EAA_PRECISION, SECONDS_IN_DAY, TOKEN_DECIMALS};
use xen_core::traits::RewardCalculator;
use xen_ledger::EngineConfig;
use xen_reward::RewardEngine;

/// XEN emission engine calculator.
#[derive(Parser)]
#[command(name = "xen-cli")]
#[command(version, about = "Rank-based token emission: calculator and simulator.")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show amplifier, EAA rate, APY, max term and penalty at a point in time.
    Schedule(ScheduleArgs),
    /// Compute the reward for settling a rank claim.
    QuoteMint(QuoteMintArgs),
    /// Compute the payout for withdrawing a stake.
    QuoteStake(QuoteStakeArgs),
    /// Run a JSON script of operations and print the final report.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct ScheduleArgs {
    /// Days since genesis.
    #[arg(long, default_value_t = 0)]
    days: u64,

    /// Emitted supply in whole XEN.
    #[arg(long, default_value_t = 0)]
    supply: u128,

    /// Global rank.
    #[arg(long, default_value_t = 0)]
    rank: u64,

    /// Days past maturity, for the penalty.
    #[arg(long, default_value_t = 0)]
    days_late: u64,
}

#[derive(Args)]
struct QuoteMintArgs {
    /// Term in days.
    #[arg(long)]
    term: u64,

    /// Global rank at settlement.
    #[arg(long)]
    global_rank: u64,

    /// Rank recorded by the claim.
    #[arg(long)]
    claim_rank: u64,

    /// Amplifier snapshotted by the claim.
    #[arg(long, default_value_t = 3_000)]
    amplifier: u64,

    /// EAA rate (per-mille) snapshotted by the claim.
    #[arg(long, default_value_t = 100)]
    eaa_rate: u64,

    /// Days past maturity at settlement.
    #[arg(long, default_value_t = 0)]
    days_late: u64,
}

#[derive(Args)]
struct QuoteStakeArgs {
    /// Principal in base units.
    #[arg(long)]
    amount: u128,

    /// Term in days.
    #[arg(long)]
    term: u64,

    /// APY in hundredths of a percent (2000 = 20%).
    #[arg(long, default_value_t = 2_000)]
    apy: u64,

    /// Days elapsed since the stake was opened.
    #[arg(long)]
    elapsed: Option<u64>,
}

#[derive(Args)]
struct SimulateArgs {
    /// Script file (JSON).
    script: PathBuf,

    /// Engine config file (JSON). Defaults apply to missing fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the final engine state (bincode) to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Exit with an error if any step failed.
    #[arg(long)]
    strict: bool,
}

fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Schedule(args) => cmd_schedule(args),
        Commands::QuoteMint(args) => cmd_quote_mint(args),
        Commands::QuoteStake(args) => cmd_quote_stake(args),
        Commands::Simulate(args) => cmd_simulate(args),
    }
}

/// Render base units as a decimal XEN amount.
fn format_xen(units: u128) -> String {
    format!(
        "{}.{:0width$}",
        units / COIN,
        units % COIN,
        width = TOKEN_DECIMALS as usize
    )
}

fn days_to_secs(days: u64) -> Result<u64> {
    days.checked_mul(SECONDS_IN_DAY)
        .with_context(|| format!("{days} days overflows a timestamp"))
}

fn cmd_schedule(args: ScheduleArgs) -> Result<()> {
    let engine = RewardEngine::new();
    let elapsed = days_to_secs(args.days)?;
    let supply = args
        .supply
        .checked_mul(COIN)
        .context("supply overflows base units")?;

    let amplifier = engine.reward_amplifier(elapsed, supply);
    let eaa = engine.eaa_rate(args.rank);
    let apy = engine.apy(elapsed, 0);
    let max_term = engine.max_term(args.rank);
    let penalty = engine.withdrawal_penalty(days_to_secs(args.days_late)?);

    println!("=== SCHEDULE (day {}, rank {}) ===", args.days, args.rank);
    println!("Amplifier:       {amplifier}");
    println!("EAA rate:        {}.{}%", eaa / 10, eaa % 10);
    println!("APY:             {}.{:02}%", apy / 100, apy % 100);
    println!("Max mint term:   {} days", max_term / SECONDS_IN_DAY);
    println!("Late penalty:    {penalty}% at {} days late", args.days_late);
    Ok(())
}

fn cmd_quote_mint(args: QuoteMintArgs) -> Result<()> {
    if args.claim_rank > args.global_rank {
        bail!(
            "claim rank {} is ahead of global rank {}",
            args.claim_rank,
            args.global_rank
        );
    }
    let engine = RewardEngine::new();
    let term_secs = days_to_secs(args.term)?;
    let maturity = term_secs;
    let now = maturity
        .checked_add(days_to_secs(args.days_late)?)
        .context("settlement time overflows")?;

    let gross = engine
        .gross_mint_reward(
            args.global_rank - args.claim_rank,
            args.amplifier,
            args.term,
            EAA_PRECISION + args.eaa_rate,
        )
        .context("gross reward")?;
    let net = engine
        .net_mint_reward(
            args.global_rank,
            args.claim_rank,
            args.term,
            now,
            maturity,
            args.amplifier,
            args.eaa_rate,
        )
        .context("net reward")?;
    let penalty = engine.withdrawal_penalty(now - maturity);

    println!("=== MINT QUOTE ===");
    println!("Rank delta:  {}", args.global_rank - args.claim_rank);
    println!("Gross:       {gross}");
    println!("Penalty:     {penalty}%");
    println!("Reward:      {} XEN", format_xen(net));
    Ok(())
}

fn cmd_quote_stake(args: QuoteStakeArgs) -> Result<()> {
    let engine = RewardEngine::new();
    let maturity = days_to_secs(args.term)?;
    let now = days_to_secs(args.elapsed.unwrap_or(args.term))?;
    let payout = engine
        .stake_reward(args.amount, args.term, now, maturity, args.apy)
        .context("stake reward")?;

    println!("=== STAKE QUOTE ===");
    println!("Principal:   {} XEN", format_xen(args.amount));
    println!("Matured:     {}", now >= maturity);
    println!("Yield:       {} XEN", format_xen(payout - args.amount));
    println!("Payout:      {} XEN", format_xen(payout));
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> Result<()> {
    let script = script::load_script(&args.script)?;
    let config = match &args.config {
        Some(path) => script::load_config(path)?,
        None => EngineConfig::default(),
    };
    info!(steps = script.steps.len(), "simulate: starting");

    let (report, engine) = script::run(&script, config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing report")?
    );

    if let Some(path) = &args.snapshot {
        let bytes = engine.snapshot().encode()?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "simulate: snapshot written");
    }

    let failures = report.failures();
    if args.strict && failures > 0 {
        bail!("{failures} of {} steps failed", report.results.len());
    }
    Ok(())
}
