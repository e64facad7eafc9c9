use crate::error::AmortizeError;
use crate::loan::LoanParameters;
use crate::report::ReportConfig;
use chrono::NaiveDate;
use clap::{ArgAction, CommandFactory, Parser};
use log::LevelFilter;
use std::ffi::OsString;

/// Generates amortization table and summary info based on standard
/// amortization formula (interest compounded monthly).
#[derive(Parser, Debug)]
#[command(
    name = "amortize",
    version,
    arg_required_else_help = true,
    after_help = "Based on the amortize utility written by Gerhard W. Gross, 1999."
)]
pub struct Cli {
    /// Print full monthly payment schedule for all years of loan
    #[arg(short, long)]
    pub full: bool,

    /// Log progress to stderr; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Date of the first payment, adds payment dates to the report
    #[arg(short = 'd', long, value_name = "YYYY-MM-DD")]
    pub first_payment: Option<NaiveDate>,

    /// Initial amount of loan in dollars (decimal OK, no commas)
    #[arg(value_name = "LoanAmt", allow_negative_numbers = true)]
    pub loan_amt: f64,

    /// Annual interest rate as a percent (decimal OK)
    #[arg(value_name = "IntPcnt", allow_negative_numbers = true)]
    pub int_pcnt: f64,

    /// Loan period in years (decimal OK)
    #[arg(value_name = "LoanPeriod", allow_negative_numbers = true)]
    pub loan_period: f64,

    /// Amount of extra monthly payments (decimal OK, no commas)
    #[arg(
        value_name = "ExtraPymts",
        requires = "ex_pm_start_mo",
        allow_negative_numbers = true
    )]
    pub extra_pymts: Option<f64>,

    /// Month in which to start extra payments, from 1 up to the number of
    /// months in the loan period (e.g. 180 for a 15 year loan)
    #[arg(value_name = "ExPmStartMo")]
    pub ex_pm_start_mo: Option<u32>,
}

impl Cli {
    /// Parses a full argument list, program name first. A lone `|` ends the
    /// arguments meant for this program.
    pub fn parse_args<I, T>(args: I) -> Result<Self, AmortizeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Ok(Self::try_parse_from(truncate_at_terminator(args))?)
    }

    pub fn loan_parameters(&self) -> Result<LoanParameters, AmortizeError> {
        LoanParameters::new(
            self.loan_amt,
            self.int_pcnt,
            self.loan_period,
            self.extra_pymts.unwrap_or(0.),
            self.ex_pm_start_mo.unwrap_or(0),
        )
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            full_schedule: self.full,
            first_payment: self.first_payment,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub fn usage() -> String {
    Cli::command().render_long_help().to_string()
}

fn truncate_at_terminator<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .take_while(|arg| arg.as_os_str() != "|")
        .collect()
}
