use crate::error::AmortizeError;
use log::{debug, trace};
use std::{fmt, iter::FusedIterator};

/// Validated inputs of a fixed-rate loan with monthly payments.
///
/// Only serializable: deserializing would skip the checks in
/// [`LoanParameters::new`].
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoanParameters {
    principal: f64,
    annual_rate: f64,
    term_months: f64,
    extra_payment: f64,
    extra_start_month: u32,
}

impl LoanParameters {
    /// Builds the parameters of a loan.
    ///
    /// `annual_rate` is a percentage (7.0 for 7%), `term_years` is converted to
    /// months. Extra payments and their start month must either both be zero or
    /// both be set, and extra payments cannot start after the last scheduled
    /// month. The first month's payment has to exceed its interest, otherwise
    /// the balance never goes down.
    pub fn new(
        principal: f64,
        annual_rate: f64,
        term_years: f64,
        extra_payment: f64,
        extra_start_month: u32,
    ) -> Result<Self, AmortizeError> {
        if !principal.is_finite() || round_to_cent(principal) <= 0. {
            return Err(invalid("loan amount", "must be at least one cent"));
        }
        if !annual_rate.is_finite() || annual_rate < 0. {
            return Err(invalid("interest rate", "must not be negative"));
        }
        if !term_years.is_finite() || term_years <= 0. {
            return Err(invalid("loan period", "must be greater than zero"));
        }
        if !extra_payment.is_finite() || extra_payment < 0. {
            return Err(invalid("extra payment", "must not be negative"));
        }

        let term_months = term_years * 12.;

        if extra_payment != 0. && extra_start_month == 0 {
            return Err(AmortizeError::ExtraPaymentWithoutStartMonth);
        }
        if f64::from(extra_start_month) > term_months.trunc() {
            return Err(AmortizeError::StartMonthBeyondTerm {
                start_month: extra_start_month,
                term_months,
            });
        }
        if extra_payment == 0. && extra_start_month != 0 {
            return Err(AmortizeError::StartMonthWithoutExtraPayment);
        }

        let params = Self {
            principal,
            annual_rate,
            term_months,
            extra_payment,
            extra_start_month,
        };
        // a long enough term rounds the annuity down to interest only
        if params.monthly_payment() + extra_payment <= principal * params.monthly_rate() {
            return Err(invalid("loan period", "too long to pay down the loan"));
        }
        Ok(params)
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn term_months(&self) -> f64 {
        self.term_months
    }

    pub fn term_years(&self) -> f64 {
        self.term_months / 12.
    }

    pub fn extra_payment(&self) -> f64 {
        self.extra_payment
    }

    pub fn extra_start_month(&self) -> u32 {
        self.extra_start_month
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 1200.
    }

    /// Scheduled monthly payment, not rounded and without extra payments.
    ///
    /// A zero rate has no annuity solution, so the principal is spread evenly
    /// over the term instead.
    pub fn monthly_payment(&self) -> f64 {
        get_pmt_amount(self.principal, self.monthly_rate(), self.term_months)
    }

    /// Lazily walks the loan month by month. Every call starts over from the
    /// original principal.
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self)
    }

    /// Runs the schedule to completion without keeping the entries.
    pub fn summary(&self) -> AmortizationSummary {
        AmortizationSummary::from_entries(self, self.schedule())
    }
}

impl fmt::Display for LoanParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal ${:.2}, rate {:.3}%, term {} months, extra ${:.2} from month {}",
            round_to_cent(self.principal),
            self.annual_rate,
            self.term_months,
            round_to_cent(self.extra_payment),
            self.extra_start_month
        )
    }
}

/// One month of the schedule. Amounts keep full precision; round them with
/// [`round_to_cent`] for display.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyEntry {
    pub month: u32,
    pub principal: f64,
    pub cumulative_principal: f64,
    pub interest: f64,
    pub cumulative_interest: f64,
    pub balance: f64,
}

impl MonthlyEntry {
    /// Loan year this payment falls in, starting at 1.
    pub fn year(&self) -> u32 {
        year_and_month(self.month).0
    }

    /// Month within the loan year, 1 through 12.
    pub fn month_of_year(&self) -> u32 {
        year_and_month(self.month).1
    }

    pub fn ends_year(&self) -> bool {
        self.month % 12 == 0
    }
}

impl fmt::Display for MonthlyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "month {}, principal ${:.2}, interest ${:.2}, ending balance ${:.2}",
            self.month,
            round_to_cent(self.principal),
            round_to_cent(self.interest),
            round_to_cent(self.balance)
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Accumulating,
    FinalMonth,
    Terminated,
}

/// Iterator over the months of a loan, produced by [`LoanParameters::schedule`].
#[derive(Clone, Debug)]
pub struct Schedule {
    rate: f64,
    payment: f64,
    extra_payment: f64,
    extra_start_month: u32,
    balance: f64,
    month: u32,
    total_principal: f64,
    total_interest: f64,
    phase: Phase,
}

impl Schedule {
    fn new(params: &LoanParameters) -> Self {
        let payment = params.monthly_payment();
        debug!("scheduling {}, monthly payment {}", params, payment);
        Self {
            rate: params.monthly_rate(),
            payment,
            extra_payment: params.extra_payment,
            extra_start_month: params.extra_start_month,
            balance: params.principal,
            month: 0,
            total_principal: 0.,
            total_interest: 0.,
            phase: Phase::Accumulating,
        }
    }
}

impl Iterator for Schedule {
    type Item = MonthlyEntry;

    fn next(&mut self) -> Option<MonthlyEntry> {
        // the loop is driven by the rounded balance so float drift near zero
        // cannot add a phantom month
        if self.phase == Phase::Terminated || round_to_cent(self.balance) <= 0. {
            self.phase = Phase::Terminated;
            return None;
        }

        self.month += 1;
        let interest = self.balance * self.rate;
        let principal;

        if self.balance + interest < self.payment + self.extra_payment {
            self.phase = Phase::FinalMonth;
            principal = self.balance;
            self.balance = 0.;
        } else {
            let mut paid = self.payment - interest;
            self.balance -= paid;
            if self.month >= self.extra_start_month {
                paid += self.extra_payment;
                self.balance -= self.extra_payment;
            }
            principal = paid;
        }

        self.total_principal += principal;
        self.total_interest += interest;

        let entry = MonthlyEntry {
            month: self.month,
            principal,
            cumulative_principal: self.total_principal,
            interest,
            cumulative_interest: self.total_interest,
            balance: self.balance,
        };
        trace!("{}", entry);

        if self.phase == Phase::FinalMonth {
            trace!("final payment in month {}", self.month);
            self.phase = Phase::Terminated;
        }
        Some(entry)
    }
}

impl FusedIterator for Schedule {}

/// Totals of a completed schedule, rounded to cents.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationSummary {
    pub monthly_payment: f64,
    pub total_monthly_payment: f64,
    pub payment_count: u32,
    pub payoff_year: u32,
    pub payoff_month: u32,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl AmortizationSummary {
    /// Folds a schedule of `params` into its totals.
    pub fn from_entries<I>(params: &LoanParameters, entries: I) -> Self
    where
        I: IntoIterator<Item = MonthlyEntry>,
    {
        let payment = params.monthly_payment();
        let (count, last) = entries
            .into_iter()
            .fold((0, None), |(count, _), entry| (count + 1, Some(entry)));
        let (total_principal, total_interest) = last
            .map(|e| (e.cumulative_principal, e.cumulative_interest))
            .unwrap_or((0., 0.));
        let (payoff_year, payoff_month) = year_and_month(count);

        Self {
            monthly_payment: round_to_cent(payment),
            total_monthly_payment: round_to_cent(payment + params.extra_payment),
            payment_count: count,
            payoff_year,
            payoff_month,
            total_principal: round_to_cent(total_principal),
            total_interest: round_to_cent(total_interest),
            total_paid: round_to_cent(total_principal + total_interest),
        }
    }
}

/// A loan computed in a single pass: every month plus the totals folded from
/// them.
#[derive(Clone, PartialEq, Debug)]
pub struct Amortization {
    pub parameters: LoanParameters,
    pub summary: AmortizationSummary,
    pub entries: Vec<MonthlyEntry>,
}

pub fn amortize(params: &LoanParameters) -> Amortization {
    let entries: Vec<MonthlyEntry> = params.schedule().collect();
    let summary = AmortizationSummary::from_entries(params, entries.iter().copied());
    debug!(
        "amortized over {} payments, total interest {}",
        summary.payment_count, summary.total_interest
    );
    Amortization {
        parameters: *params,
        summary,
        entries,
    }
}

/// Rounds to two decimals, half up: the fractional part of the amount in
/// cents is rounded up from 0.5, otherwise truncated toward zero.
pub fn round_to_cent(amt: f64) -> f64 {
    let cents = amt * 100.;
    let whole = cents.trunc();
    if cents.fract() >= 0.5 {
        (whole + 1.) / 100.
    } else {
        whole / 100.
    }
}

/// Splits a 1-based month count into (loan year, month of year). Month 0
/// maps to (0, 0).
pub fn year_and_month(month: u32) -> (u32, u32) {
    match month {
        0 => (0, 0),
        m => ((m - 1) / 12 + 1, (m - 1) % 12 + 1),
    }
}

fn get_pmt_amount(principal: f64, monthly_rate: f64, term_months: f64) -> f64 {
    // 1 - (1 + r)^-n, without losing tiny rates to 1 + r == 1
    let discount = -(-term_months * monthly_rate.ln_1p()).exp_m1();
    if monthly_rate == 0. || discount == 0. {
        principal / term_months
    } else {
        principal * (monthly_rate / discount)
    }
}

fn invalid(name: &'static str, reason: &'static str) -> AmortizeError {
    AmortizeError::InvalidParameter { name, reason }
}
