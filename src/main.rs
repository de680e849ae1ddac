//! Chitty Manager CLI
//!
//! Seeds a fund from a config (or the stock 5 Lakh Chitty) and optionally
//! simulates its whole lifetime: one lift and one settlement slip per month.

use anyhow::Context;
use chitty_manager::config::SeedConfig;
use chitty_manager::members::load_roster;
use chitty_manager::{ChittyManager, Fund, MonthlySlip};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "chitty_manager", version, about = "Seed and simulate a chitty fund")]
struct Cli {
    /// JSON seed config; defaults to the 5 Lakh Chitty with 20 members
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV roster with a Name column, overriding the config's member names
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Lift one member and settle one slip for every month of the fund
    #[arg(long)]
    simulate: bool,

    /// Write the slip ledger to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

/// One row of the slip ledger CSV
#[derive(Debug, Serialize)]
struct LedgerRow {
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "SlipId")]
    slip_id: String,
    #[serde(rename = "LiftedMember")]
    lifted_member: String,
    #[serde(rename = "LiftedCount")]
    lifted_count: usize,
    #[serde(rename = "TotalDue")]
    total_due: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Chitty Manager v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    let mut config = match &cli.config {
        Some(path) => SeedConfig::from_path(path)?,
        None => SeedConfig::default(),
    };
    let roster = cli.roster.clone().or_else(|| config.roster_path.clone());
    if let Some(path) = roster {
        config.member_names = load_roster(&path)
            .with_context(|| format!("failed to load roster {}", path.display()))?;
    }
    config.validate()?;

    let manager = ChittyManager::new();
    let (fund, members) = manager.create_fund_with_members(&config.to_request())?;

    println!("Fund: {} ({})", fund.name, fund.id);
    println!("  Principal:       {:.2}", fund.principal);
    println!("  Duration:        {} months", fund.duration);
    println!("  Start date:      {}", fund.start_date);
    println!("  Regular payment: {:.2}", fund.regular_payment());
    println!("  Lifted payment:  {:.2}", fund.lifted_payment());
    println!("  Members:         {}/{}", members.len(), fund.capacity());
    println!();

    if !cli.simulate {
        for (i, member) in members.iter().enumerate() {
            println!("{:>3}. {}", i + 1, member.name);
        }
        return Ok(());
    }

    let slips = simulate(&manager, &fund)?;
    print_ledger(&manager, &fund, &slips)?;

    if let Some(path) = &cli.output {
        write_ledger(path, &manager, &slips)?;
        println!("\nSlip ledger written to: {}", path.display());
    }
    Ok(())
}

/// Lift the next eligible member each month and settle that month
fn simulate(manager: &ChittyManager, fund: &Fund) -> anyhow::Result<Vec<MonthlySlip>> {
    let mut slips = Vec::new();
    for month in 1..=fund.duration {
        if let Some(next) = manager.eligible_members(fund.id)?.first() {
            manager.lift_member(next.id, Some(month))?;
        }
        slips.push(manager.generate_slip(fund.id, month, fund.cycle_date(month))?);
    }
    Ok(slips)
}

fn lifted_name(manager: &ChittyManager, slip: &MonthlySlip) -> anyhow::Result<String> {
    Ok(match slip.lifted_member_id {
        Some(id) => manager.get_member(id)?.name,
        None => "-".to_string(),
    })
}

fn print_ledger(manager: &ChittyManager, fund: &Fund, slips: &[MonthlySlip]) -> anyhow::Result<()> {
    println!("{:>5} {:>10} {:<20} {:>7} {:>14}", "Month", "Date", "Lifted by", "Lifted", "Total due");
    println!("{}", "-".repeat(60));
    for slip in slips {
        println!(
            "{:>5} {:>10} {:<20} {:>7} {:>14.2}",
            slip.month,
            slip.date,
            lifted_name(manager, slip)?,
            slip.lifted_count(),
            slip.total_due()
        );
    }

    let collected: f64 = slips.iter().map(|s| s.total_due()).sum();
    println!("\nSummary:");
    println!("  Slips issued:    {}", slips.len());
    println!("  Total collected: {:.2}", collected);
    println!("  Pool paid out:   {:.2}", fund.principal);
    Ok(())
}

fn write_ledger(path: &Path, manager: &ChittyManager, slips: &[MonthlySlip]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for slip in slips {
        writer.serialize(LedgerRow {
            month: slip.month,
            date: slip.date.to_string(),
            slip_id: slip.id.to_string(),
            lifted_member: lifted_name(manager, slip)?,
            lifted_count: slip.lifted_count(),
            total_due: slip.total_due(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
