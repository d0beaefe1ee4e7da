use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_sim_core::Loan;

use crate::input;

#[derive(Args)]
pub struct PayoffArgs {
    /// Amount borrowed to repay back
    #[arg(short, long)]
    pub amount: Decimal,

    /// Start date from which interest is accrued (DD-MM-YYYY)
    #[arg(short, long, value_parser = parse_start_date)]
    pub start_date: NaiveDate,

    /// YAML file containing the instrument definitions, in repayment order
    #[arg(short = 'm', long)]
    pub mortgages: String,
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Amount the instrument is run against
    #[arg(short, long)]
    pub amount: Decimal,

    /// Date the instrument is bound to (DD-MM-YYYY)
    #[arg(short, long, value_parser = parse_start_date)]
    pub start_date: NaiveDate,

    /// YAML file containing the instrument definitions
    #[arg(short = 'm', long)]
    pub mortgages: String,

    /// Name of the instrument to simulate in isolation
    #[arg(short, long)]
    pub instrument: String,
}

fn parse_start_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .map_err(|e| format!("expected DD-MM-YYYY: {e}"))
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgages = input::mortgage_file::read_mortgages(&args.mortgages)?;
    let loan = Loan::new(args.amount, args.start_date, mortgages)?;
    let result = loan.payoff()?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgages = input::mortgage_file::read_mortgages(&args.mortgages)?;
    let loan = Loan::new(args.amount, args.start_date, mortgages)?;
    let mortgage = loan.instrument(&args.instrument).ok_or_else(|| {
        format!(
            "no instrument named '{}' in {}",
            args.instrument, args.mortgages
        )
    })?;
    let result = mortgage.simulate(args.amount, args.start_date)?;
    Ok(serde_json::to_value(result)?)
}
