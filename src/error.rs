use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmortizeError {
    /// Wrong number of arguments, unparsable values or unknown flags.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("If start month is 0 extra payments must be 0.")]
    ExtraPaymentWithoutStartMonth,
    #[error("If extra payments is 0 start month must be 0.")]
    StartMonthWithoutExtraPayment,
    #[error("Start month ({start_month}) must be less than or equal to loan period ({term_months} months).")]
    StartMonthBeyondTerm { start_month: u32, term_months: f64 },
    #[error("Invalid {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

impl AmortizeError {
    /// True for the errors that describe an inconsistent combination of loan
    /// parameters, as opposed to a malformed command line.
    pub fn is_parameter_error(&self) -> bool {
        !matches!(self, AmortizeError::Usage(_) | AmortizeError::Io(_))
    }
}
