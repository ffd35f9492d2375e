use core::fmt;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the generation entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The population contained no persons.
    EmptyPopulation,

    /// The requested generation step does not exist.
    StepOutOfRange {
        /// Requested step index.
        step: usize,
        /// Number of configured steps.
        steps: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyPopulation => write!(f, "population is empty"),
            Error::StepOutOfRange { step, steps } => {
                write!(f, "step index {step} out of range for {steps} configured steps")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
