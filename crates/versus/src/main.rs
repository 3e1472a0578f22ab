//! Versus CLI
//!
//! Simulate ranking sessions and inspect saved reports.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use versus::{simulate, telemetry, SessionReport, SimulationSettings};
use versus_core::{BattlePolicy, EloScope};

#[derive(Debug, Parser)]
#[command(name = "versus", about = "Pairwise Elo ranking sessions", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a simulated session with a hidden preference order
    Simulate(SimulateArgs),
    /// Print the leaderboard of a saved report
    #[command(alias = "elo")]
    Leaderboard {
        /// Report written by `simulate --out`
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// TOML settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    /// Number of simulated items
    #[arg(long, short = 'n')]
    items: Option<u32>,
    /// complete, fixed, per-movie or infinite
    #[arg(long, short = 'p')]
    policy: Option<BattlePolicy>,
    /// Battle limit for fixed and per-movie
    #[arg(long, short = 'l')]
    limit: Option<u32>,
    /// Use the rating-gap dependent K-factor
    #[arg(long)]
    dynamic_k: bool,
    #[arg(long)]
    global: bool,
    #[arg(long)]
    skip_rate: Option<f64>,
    #[arg(long)]
    max_battles: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Log every battle
    #[arg(long, short = 'v')]
    verbose: bool,
    /// Write the JSON report here
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl SimulateArgs {
    fn settings(&self) -> Result<SimulationSettings, versus::SettingsError> {
        let mut settings = match &self.config {
            Some(path) => SimulationSettings::load(path)?,
            None => SimulationSettings::default(),
        };

        if let Some(name) = &self.name {
            settings.name = name.clone();
        }
        if let Some(items) = self.items {
            settings.items = items;
        }
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        if self.limit.is_some() {
            settings.limit = self.limit;
        }
        if self.dynamic_k {
            settings.dynamic_k = true;
        }
        if self.global {
            settings.elo_scope = EloScope::Global;
        }
        if let Some(skip_rate) = self.skip_rate {
            settings.skip_rate = skip_rate;
        }
        if let Some(max_battles) = self.max_battles {
            settings.max_battles = max_battles;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.verbose {
            settings.verbose = true;
        }
        Ok(settings)
    }
}

fn run_simulation(args: &SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.settings()?;
    let report = simulate(&settings)?;
    report.print_report();

    if let Some(path) = &args.out {
        report.save(path)?;
        info!(path = %path.display(), "report saved");
    }
    Ok(())
}

fn show_leaderboard(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = SessionReport::load(file)?;
    println!("\n=== {} ===", report.name);
    println!("{}", report.leaderboard_table());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = telemetry::init(&cli.log_level) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Simulate(args) => run_simulation(args),
        Command::Leaderboard { file } => show_leaderboard(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
