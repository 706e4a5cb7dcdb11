//! Error status - whether an error is worth retrying

use std::fmt;

/// How an error should be handled with respect to retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// The error is final; retrying the same operation cannot succeed
    Permanent,
    /// The error is transient; the operation may succeed if retried
    Temporary,
    /// The error was temporary but retries have been exhausted
    Persistent,
}

impl ErrorStatus {
    /// Check if an operation that failed with this status may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    /// Transition after retries are exhausted: temporary errors become
    /// persistent, everything else is unchanged.
    pub fn persist(self) -> Self {
        match self {
            ErrorStatus::Temporary => ErrorStatus::Persistent,
            other => other,
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
            ErrorStatus::Persistent => "persistent",
        };
        write!(f, "{}", s)
    }
}
