use amortize::cli::{usage, Cli};
use amortize::error::AmortizeError;
use amortize::loan::amortize;
use amortize::report::write_report;
use log::info;
use simple_logger::SimpleLogger;
use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let cli = match Cli::parse_args(env::args_os()) {
        Ok(cli) => cli,
        Err(err) => return exit_with(&err),
    };

    if let Err(err) = SimpleLogger::new().with_level(cli.log_level()).init() {
        eprintln!("logger unavailable: {}", err);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_with(&err),
    }
}

fn run(cli: &Cli) -> Result<(), AmortizeError> {
    let params = cli.loan_parameters()?;
    info!("computing schedule for {}", params);

    let amortization = amortize(&params);
    info!(
        "loan paid off after {} payments",
        amortization.summary.payment_count
    );

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &amortization, &cli.report_config())?;
    Ok(())
}

fn exit_with(err: &AmortizeError) -> ExitCode {
    match err {
        // help and version requests are rendered by clap and are not failures
        AmortizeError::Usage(err) => {
            let _ = err.print();
            if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        err if err.is_parameter_error() => {
            eprintln!("\nError - {}\n", err);
            eprint!("{}", usage());
            ExitCode::FAILURE
        }
        err => {
            eprintln!("Error - {}", err);
            ExitCode::FAILURE
        }
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<amortize::loan::LoanParameters>();
    is_normal::<amortize::loan::MonthlyEntry>();
    is_normal::<amortize::loan::AmortizationSummary>();
    is_normal::<amortize::loan::Schedule>();
    is_normal::<amortize::report::ReportConfig>();
}
