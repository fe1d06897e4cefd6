mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{PaymentArgs, RecastArgs, ScheduleArgs};

/// Mortgage recast calculator
#[derive(Parser)]
#[command(
    name = "recast",
    version,
    about = "Mortgage recast calculator",
    long_about = "Models a mortgage recast: a lump-sum principal payment followed by \
                  re-amortization of the remaining balance over the remaining term at \
                  the existing rate. Compares amortization schedules before and after \
                  the recast with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the loan before and after a recast
    Recast(RecastArgs),
    /// Build a single fixed-payment amortization schedule
    Schedule(ScheduleArgs),
    /// Calculate the level monthly payment for a loan
    Payment(PaymentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Recast(args) => commands::amortization::run_recast(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Version => {
            println!("recast {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
