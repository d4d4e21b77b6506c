//! DCF valuation CLI
//!
//! Command-line interface for running valuations from saved settings files

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;

use dcf_valuation::integrations::{
    record_quietly, render_report, resolve_price, write_projection_csv, CsvHistorySink,
    HistoryEntry, PriceTable,
};
use dcf_valuation::valuation::implied_wacc;
use dcf_valuation::{
    ProjectionConfig, ProjectionEngine, ReinvestmentPolicy, ScenarioRunner, SettingsDocument,
};

#[derive(Parser)]
#[command(name = "dcf", version, about = "Discounted cash flow valuation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Value a company and print the projection table
    Value(ValueArgs),
    /// Per-share values over a WACC x terminal growth grid
    Sensitivity(SensitivityArgs),
    /// WACC at which the value per share equals a market price
    ImpliedWacc(ImpliedArgs),
    /// Write the effective settings to a JSON file
    ExportSettings(ExportArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Saved analysis (.json); the reference case is used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Reinvestment policy: backward or forward
    #[arg(long)]
    policy: Option<ReinvestmentPolicy>,
}

#[derive(Args)]
struct ValueArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Current share price, overriding the settings and price table
    #[arg(long)]
    price: Option<f64>,

    /// CSV price table with ticker,price columns
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Write the projection table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a text report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Append the valuation to this history CSV
    #[arg(long)]
    history: Option<PathBuf>,

    /// Print the full valuation as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SensitivityArgs {
    #[command(flatten)]
    input: InputArgs,

    /// WACC values in percent, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    wacc: Vec<f64>,

    /// Terminal growth values in percent, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    growth: Vec<f64>,
}

#[derive(Args)]
struct ImpliedArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Market price per share
    #[arg(long)]
    price: f64,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file
    output: PathBuf,
}

fn load_settings(input: &InputArgs) -> Result<SettingsDocument> {
    let mut settings = match &input.settings {
        Some(path) => SettingsDocument::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SettingsDocument::default(),
    };
    if input.policy.is_some() {
        settings.reinvestment_policy = input.policy;
    }
    Ok(settings)
}

fn engine_for(settings: &SettingsDocument) -> ProjectionEngine {
    ProjectionEngine::new(ProjectionConfig::with_policy(
        settings.reinvestment_policy.unwrap_or_default(),
    ))
}

fn run_value(args: ValueArgs) -> Result<()> {
    let settings = load_settings(&args.input)?;
    let profile = settings.profile();
    let assumptions = settings.to_assumptions();
    let engine = engine_for(&settings);

    let current_price = match (args.price, &args.prices) {
        (Some(price), _) => Some(price).filter(|p| *p > 0.0),
        (None, Some(path)) => match PriceTable::from_csv(path) {
            Ok(table) => resolve_price(&table, &profile.ticker).or(profile.current_price),
            Err(e) => {
                warn!("Price table {} unavailable: {}", path.display(), e);
                profile.current_price
            }
        },
        (None, None) => profile.current_price,
    };

    let valuation = engine
        .value(&assumptions, current_price)
        .context("Valuation failed")?;
    let result = &valuation.result;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&valuation)?);
    } else {
        println!("DCF Valuation: {} ({})", profile.name, profile.ticker);
        println!("{}", "=".repeat(60));
        println!(
            "{:>4} {:>12} {:>11} {:>11} {:>12} {:>11} {:>11} {:>11}",
            "Year", "Revenue", "EBIT", "NOPAT", "Inv.Cap", "Investment", "FCFF", "PV FCFF"
        );
        println!("{}", "-".repeat(90));
        for row in &valuation.projection.records {
            println!(
                "{:>4} {:>12.1} {:>11.1} {:>11.1} {:>12.1} {:>11.1} {:>11.1} {:>11.1}",
                row.year,
                row.revenue,
                row.ebit,
                row.nopat,
                row.invested_capital,
                row.investment,
                row.fcff,
                row.pv_fcff
            );
        }

        println!("\nValuation:");
        println!("  Explicit period value: {:.1}", result.explicit_value);
        println!("  PV terminal value:     {:.1}", result.pv_terminal_value());
        println!("  Enterprise value:      {:.1}", result.enterprise_value);
        println!("  Equity value:          {:.1}", result.equity_value);
        println!("  Value per share:       {:.2}", result.value_per_share);
        println!(
            "  After margin ({:.0}%):   {:.2}",
            assumptions.safety_margin * 100.0,
            result.margin_adjusted_value
        );
        match (result.current_price, result.upside) {
            (Some(price), Some(upside)) => {
                println!("  Current price:         {:.2}", price);
                println!("  Upside:                {:.1}%", upside * 100.0);
            }
            _ => {
                println!("  Current price:         N/A");
                println!("  Upside:                N/A");
            }
        }
    }

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        write_projection_csv(file, &valuation.projection.records)?;
        println!("\nProjection table written to: {}", path.display());
    }

    if let Some(path) = &args.report {
        let today = chrono::Local::now().date_naive();
        let report = render_report(&profile, today, &assumptions, &valuation);
        std::fs::write(path, report)
            .with_context(|| format!("Unable to write {}", path.display()))?;
        println!("Report written to: {}", path.display());
    }

    if let Some(path) = &args.history {
        let sink = CsvHistorySink::new(path);
        let mut logged = settings.clone();
        logged.current_price = current_price.unwrap_or(0.0);
        match HistoryEntry::new(chrono::Local::now().naive_local(), &logged, result) {
            Ok(entry) => {
                record_quietly(&sink, &entry);
            }
            Err(e) => warn!("History entry not created: {}", e),
        }
    }

    Ok(())
}

fn run_sensitivity(args: SensitivityArgs) -> Result<()> {
    let settings = load_settings(&args.input)?;
    let engine = engine_for(&settings);
    let runner = ScenarioRunner::new(settings.to_assumptions(), engine.config().clone());

    let wacc: Vec<f64> = args.wacc.iter().map(|w| w / 100.0).collect();
    let growth: Vec<f64> = args.growth.iter().map(|g| g / 100.0).collect();
    let grid = runner.sensitivity(&wacc, &growth);

    print!("{:>10}", "WACC \\ g");
    for g in &growth {
        print!(" {:>10}", format!("{:.2}%", g * 100.0));
    }
    println!();
    for (i, w) in wacc.iter().enumerate() {
        print!("{:>10}", format!("{:.2}%", w * 100.0));
        for j in 0..growth.len() {
            let cell = grid
                .get(i, j)
                .map(|c| match &c.value_per_share {
                    Ok(v) => format!("{:.2}", v),
                    Err(_) => "n/a".to_string(),
                })
                .unwrap_or_default();
            print!(" {:>10}", cell);
        }
        println!();
    }

    Ok(())
}

fn run_implied(args: ImpliedArgs) -> Result<()> {
    if args.price <= 0.0 {
        bail!("Market price must be positive");
    }
    let settings = load_settings(&args.input)?;
    let engine = engine_for(&settings);

    match implied_wacc(&engine, &settings.to_assumptions(), args.price)? {
        Some(wacc) => println!("Implied WACC at {:.2}: {:.2}%", args.price, wacc * 100.0),
        None => println!("No WACC above terminal growth prices the company at {:.2}", args.price),
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let settings = load_settings(&args.input)?;
    settings
        .save(&args.output)
        .with_context(|| format!("Unable to write {}", args.output.display()))?;
    println!("Settings written to: {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Value(args) => run_value(args),
        Command::Sensitivity(args) => run_sensitivity(args),
        Command::ImpliedWacc(args) => run_implied(args),
        Command::ExportSettings(args) => run_export(args),
    }
}
