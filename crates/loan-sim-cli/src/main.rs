mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::payoff::{PayoffArgs, ScheduleArgs};

/// Deterministic loan repayment simulation
#[derive(Parser)]
#[command(
    name = "loansim",
    version,
    about = "Deterministic loan repayment simulation",
    long_about = "Simulates repayment of a borrowed amount across one or more \
                  sequential mortgage instruments, each with its own rate, term, \
                  monthly repayment, optional downpayment or capital release, and \
                  optional yearly overpayment. All arithmetic is decimal-precise \
                  and bit-for-bit reproducible."
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
    /// Pay off a loan with the instruments from a YAML definition file
    Payoff(PayoffArgs),
    /// Run a single named instrument in isolation and show its schedule
    Schedule(ScheduleArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payoff(args) => commands::payoff::run_payoff(args),
        Commands::Schedule(args) => commands::payoff::run_schedule(args),
        Commands::Version => {
            println!("loansim {}", env!("CARGO_PKG_VERSION"));
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
