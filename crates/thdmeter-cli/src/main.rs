//! thdmeter - measure total harmonic distortion of loopback captures.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thdmeter")]
#[command(author, version, about = "THD test harness for audio loopback captures", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure THD of a single capture against a threshold
    Measure(commands::measure::MeasureArgs),

    /// Measure every capture listed in a test plan
    Run(commands::run::RunArgs),

    /// Generate reference tones and noise
    Generate(commands::generate::GenerateArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),

    /// List and create test plans
    Plans(commands::plans::PlansArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Measure(args) => commands::measure::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Generate(args) => commands::generate::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Info(args) => commands::info::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Plans(args) => commands::plans::run(args).map(|()| ExitCode::SUCCESS),
    }
}
