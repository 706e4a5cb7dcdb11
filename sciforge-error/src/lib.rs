//! # sciforge-error
//!
//! Unified error handling for sciforge.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what failed (e.g., ExtractionFailed, FitFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use sciforge_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::SymbolMissing, "constructor 'Physics' not defined")
//!         .with_operation("scope::instantiate")
//!         .with_context("symbol", "Physics"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, sciforge_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the sciforge Error
pub type Result<T> = std::result::Result<T, Error>;
