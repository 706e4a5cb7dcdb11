//! # Sciforge Agent
//!
//! The agent drives the LLM <-> model-VM optimization loop:
//! 1. Ask the LLM for candidate model source, with the current top-k
//!    candidates (code + loss) rendered as feedback context
//! 2. Extract the fenced `model` block, execute it with the fit harness,
//!    instantiate the expected constructor
//! 3. Fit the candidate's free parameters against the training split
//! 4. Score it on the validation split and keep it if it makes the top-k
//! 5. After the iteration budget, export the best candidate
//!
//! Failures inside one generate+fit attempt are retried up to a bounded
//! budget; an iteration that exhausts its budget is skipped, not fatal.

pub mod agent;
pub mod archive;
pub mod candidate;
pub mod evaluator;
pub mod exporter;
pub mod generator;
pub mod loader;
pub mod prompt;
pub mod retry;

pub use agent::{AgentConfig, GenerativeAgent};
pub use archive::{FeedbackEntry, TopKArchive};
pub use candidate::Candidate;
pub use evaluator::Evaluator;
pub use exporter::Exporter;
pub use generator::{extract_code_block, CandidateGenerator, PromptContext};
pub use loader::Loader;
pub use prompt::PromptWriter;
pub use retry::attempt_with_retry;

pub use sciforge_error::{Error, ErrorKind, Result};
