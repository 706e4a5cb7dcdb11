//! Error kinds for sciforge operations

use std::fmt;

/// The kind of error that occurred.
///
/// Categorizes errors so callers can write clear handling logic: the retry
/// wrapper matches on retryability, the controller matches on the fatal
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid configuration or parameters
    ConfigInvalid,

    // =========================================================================
    // Candidate generation errors (retried by the attempt wrapper)
    // =========================================================================
    /// No tagged code fence found in the LLM response
    ExtractionFailed,

    /// Generated model source failed to load (lex/parse error)
    ExecutionFailed,

    /// Expected constructor symbol absent after executing the source
    SymbolMissing,

    /// Parameter fitting failed
    FitFailed,

    // =========================================================================
    // Archive errors
    // =========================================================================
    /// No candidate was ever inserted into the archive
    ArchiveEmpty,

    // =========================================================================
    // Inference/LLM errors
    // =========================================================================
    /// LLM inference failed
    InferenceFailed,

    /// Rate limit exceeded
    RateLimited,

    /// Authentication with the provider failed
    AuthenticationFailed,

    /// Network error
    NetworkFailed,

    // =========================================================================
    // Data errors
    // =========================================================================
    /// Dataset is malformed (shape mismatch, empty split)
    DataInvalid,

    /// Serialization/deserialization failed
    SerializationFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse input
    ParseFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::ConfigInvalid => "ConfigInvalid",

            ErrorKind::ExtractionFailed => "ExtractionFailed",
            ErrorKind::ExecutionFailed => "ExecutionFailed",
            ErrorKind::SymbolMissing => "SymbolMissing",
            ErrorKind::FitFailed => "FitFailed",

            ErrorKind::ArchiveEmpty => "ArchiveEmpty",

            ErrorKind::InferenceFailed => "InferenceFailed",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::NetworkFailed => "NetworkFailed",

            ErrorKind::DataInvalid => "DataInvalid",
            ErrorKind::SerializationFailed => "SerializationFailed",

            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",

            ErrorKind::ParseFailed => "ParseFailed",
        }
    }

    /// Check if this error kind is retryable by default.
    ///
    /// Generation-phase failures are retryable: a fresh LLM sample can
    /// produce a valid candidate where the previous one did not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ExtractionFailed
                | ErrorKind::ExecutionFailed
                | ErrorKind::SymbolMissing
                | ErrorKind::FitFailed
                | ErrorKind::InferenceFailed
                | ErrorKind::RateLimited
                | ErrorKind::NetworkFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
