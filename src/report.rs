use crate::loan::{round_to_cent, year_and_month, Amortization, MonthlyEntry};
use chrono::{Months, NaiveDate};
use std::io::{self, Write};

const RULE_WIDTH: usize = 67;
const DATE_WIDTH: usize = 12;

/// Output switches chosen on the command line.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ReportConfig {
    /// Print every month after the summary block.
    pub full_schedule: bool,
    /// Calendar date of the first payment, if the schedule should carry dates.
    pub first_payment: Option<NaiveDate>,
}

impl ReportConfig {
    /// Date of payment `month` (1-based), or `None` without a first payment
    /// date or past the end of the calendar.
    pub fn payment_date(&self, month: u32) -> Option<NaiveDate> {
        let first = self.first_payment?;
        first.checked_add_months(Months::new(month.saturating_sub(1)))
    }
}

pub fn write_report<W: Write>(
    out: &mut W,
    amortization: &Amortization,
    config: &ReportConfig,
) -> io::Result<()> {
    write_summary(out, amortization, config)?;
    if config.full_schedule {
        write_schedule(out, &amortization.entries, config)?;
    }
    out.flush()
}

pub fn write_summary<W: Write>(
    out: &mut W,
    amortization: &Amortization,
    config: &ReportConfig,
) -> io::Result<()> {
    let params = &amortization.parameters;
    let summary = &amortization.summary;
    let (start_year, start_month) = year_and_month(params.extra_start_month());

    write!(out, "\n\n")?;
    writeln!(out, "{:>40}", "Amortization Schedule")?;
    write!(out, "{:>40}\n\n\n", "---------------------")?;
    writeln!(out, "Loan amount\t\t= {:.2}", round_to_cent(params.principal()))?;
    writeln!(out, "Annual interest\t\t= {:.3}", params.annual_rate())?;
    writeln!(out, "Loan period (years)\t= {:.2}", params.term_years())?;
    writeln!(
        out,
        "Extra monthly payments\t= {:.2}",
        round_to_cent(params.extra_payment())
    )?;
    write!(
        out,
        "      starting in month\t= {}   (Year {}, Month {})\n\n",
        params.extra_start_month(),
        start_year,
        start_month
    )?;

    write!(out, "Monthly Payments\t= {:.2}", summary.monthly_payment)?;
    if params.extra_payment() > 0. {
        writeln!(out, "\t(not incl extra pymnts)")?;
        write!(
            out,
            "Total Monthly Payments\t= {:.2}\t(incl extra pymnts)\n\n",
            summary.total_monthly_payment
        )?;
    } else {
        write!(out, "\n\n")?;
    }

    if let Some(first) = config.first_payment {
        writeln!(out, "First payment on\t: {}", first)?;
    }
    write!(
        out,
        "Last payment on\t\t: Year {}, Month {}",
        summary.payoff_year, summary.payoff_month
    )?;
    match config.payment_date(summary.payment_count) {
        Some(date) => write!(out, "   ({})\n\n", date)?,
        None => write!(out, "\n\n")?,
    }

    writeln!(out, "Total Principal Paid\t= {:.2}", summary.total_principal)?;
    writeln!(out, "Total Interest Paid\t= {:.2}", summary.total_interest)?;
    write!(out, "Total Paid\t\t= {:.2}\n\n\n", summary.total_paid)?;

    if config.full_schedule {
        write_column_headers(out, config)?;
    }
    write!(out, "{}\n\n", "*".repeat(RULE_WIDTH))
}

/// Writes one row per month, closing every loan year with repeated column
/// headers and an `End Year` rule.
pub fn write_schedule<W: Write>(
    out: &mut W,
    entries: &[MonthlyEntry],
    config: &ReportConfig,
) -> io::Result<()> {
    for entry in entries {
        write!(out, "{:>5}", entry.month_of_year())?;
        if config.first_payment.is_some() {
            let date = config
                .payment_date(entry.month)
                .map(|d| d.to_string())
                .unwrap_or_default();
            write!(out, "{:>width$}", date, width = DATE_WIDTH)?;
        }
        writeln!(
            out,
            "{:>12.2}{:>12.2}{:>12.2}{:>12.2}{:>12.2}",
            round_to_cent(entry.principal),
            round_to_cent(entry.cumulative_principal),
            round_to_cent(entry.interest),
            round_to_cent(entry.cumulative_interest),
            round_to_cent(entry.balance)
        )?;

        if entry.ends_year() {
            writeln!(out)?;
            write_column_headers(out, config)?;
            writeln!(out, "{} End Year {}", "-".repeat(rule_width(config)), entry.year())?;
        }
    }
    Ok(())
}

fn write_column_headers<W: Write>(out: &mut W, config: &ReportConfig) -> io::Result<()> {
    write!(out, "Month")?;
    if config.first_payment.is_some() {
        write!(out, "{:>width$}", "Date", width = DATE_WIDTH)?;
    }
    writeln!(
        out,
        "{:>12}{:>12}{:>12}{:>12}{:>12}",
        "Principal", "----> accum", "Interest", "----> accum", "Balance"
    )
}

fn rule_width(config: &ReportConfig) -> usize {
    match config.first_payment {
        Some(_) => RULE_WIDTH + DATE_WIDTH,
        None => RULE_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::{write_report, ReportConfig};
    use crate::loan::{amortize, LoanParameters};
    use chrono::NaiveDate;
    use test_log::test;

    fn render(params: LoanParameters, config: ReportConfig) -> String {
        let mut out = Vec::new();
        write_report(&mut out, &amortize(&params), &config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_only() {
        let report = render(
            LoanParameters::new(100000., 6., 30., 0., 0).unwrap(),
            ReportConfig::default(),
        );

        assert!(report.contains("Amortization Schedule"));
        assert!(report.contains("Loan amount\t\t= 100000.00\n"));
        assert!(report.contains("Annual interest\t\t= 6.000\n"));
        assert!(report.contains("Loan period (years)\t= 30.00\n"));
        assert!(report.contains("Extra monthly payments\t= 0.00\n"));
        assert!(report.contains("starting in month\t= 0   (Year 0, Month 0)\n"));
        assert!(report.contains("Monthly Payments\t= 599.55\n\n"));
        assert!(!report.contains("Total Monthly Payments"));
        assert!(report.contains("Last payment on\t\t: Year 30, Month 12\n"));
        assert!(report.contains("Total Principal Paid\t= 100000.00\n"));
        assert!(report.contains("Total Interest Paid\t= 115838.19\n"));
        assert!(report.contains("Total Paid\t\t= 215838.19\n"));
        assert!(report.ends_with(&format!("{}\n\n", "*".repeat(67))));
        assert!(!report.contains("Balance"));
        assert!(!report.contains("End Year"));
    }

    #[test]
    fn test_full_schedule_with_extra_payments() {
        let report = render(
            LoanParameters::new(10000., 5., 5., 50., 1).unwrap(),
            ReportConfig {
                full_schedule: true,
                ..Default::default()
            },
        );

        assert!(report.contains("Monthly Payments\t= 188.71\t(not incl extra pymnts)\n"));
        assert!(report.contains("Total Monthly Payments\t= 238.71\t(incl extra pymnts)\n"));
        assert!(report.contains("starting in month\t= 1   (Year 1, Month 1)\n"));
        assert!(report.contains("Last payment on\t\t: Year 4, Month 11\n"));
        assert!(report.contains(
            "    1      197.05      197.05       41.67       41.67     9802.95\n"
        ));
        assert!(report.contains(
            "Month   Principal ----> accum    Interest ----> accum     Balance\n"
        ));

        // 47 payments close three full years
        assert_eq!(report.matches(" End Year ").count(), 3);
        assert!(report.contains(" End Year 3\n"));
        assert!(!report.contains(" End Year 4"));
        let last_row = report.lines().last().unwrap();
        assert!(last_row.starts_with("   11"));
        assert!(last_row.ends_with("        0.00"));
    }

    #[test]
    fn test_year_separators() {
        let report = render(
            LoanParameters::new(24000., 0., 2., 0., 0).unwrap(),
            ReportConfig {
                full_schedule: true,
                ..Default::default()
            },
        );
        let separator = format!("{} End Year 1\n", "-".repeat(67));
        assert!(report.contains(&separator));
        assert!(report.contains(&format!("{} End Year 2\n", "-".repeat(67))));
        assert!(report.contains("   12     1000.00    12000.00        0.00        0.00    12000.00\n"));
    }

    #[test]
    fn test_payment_dates() {
        let config = ReportConfig {
            full_schedule: true,
            first_payment: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        assert_eq!(config.payment_date(1), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(config.payment_date(2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(config.payment_date(13), NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(ReportConfig::default().payment_date(1), None);

        let report = render(LoanParameters::new(1000., 12., 1., 0., 0).unwrap(), config);
        assert!(report.contains("First payment on\t: 2024-01-31\n"));
        assert!(report.contains("Last payment on\t\t: Year 1, Month 12   (2024-12-31)\n"));
        assert!(report.contains("Month        Date   Principal"));
        assert!(report.contains("    2  2024-02-29"));
        assert!(report.contains(&format!("{} End Year 1\n", "-".repeat(79))));
    }
}
