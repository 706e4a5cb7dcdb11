//! # Sciforge VM
//!
//! A small virtual machine for LLM-proposed symbolic models.
//!
//! ## Core Concepts
//! - **Source**: candidate model code in the `model`/`fit` language
//! - **Scope**: symbol table produced by executing source text
//! - **SymbolicModel**: an instantiated model with free parameters,
//!   `fit(x, y)` and `predict(row)`
//! - **Optimizer**: deterministic multi-start Nelder-Mead for the inner
//!   parameter fit
//! - **Provider**: trait-based LLM communication (OpenAI-compatible HTTP)
//!
//! The agent crate drives the outer loop: ask the LLM for source, execute it
//! here, instantiate the expected constructor, fit, and score.

pub mod ast;
pub mod lexer;
pub mod model;
pub mod optim;
pub mod parser;
pub mod provider;
pub mod scope;

pub use ast::{BinOp, Expr, Func};
pub use model::SymbolicModel;
pub use optim::NelderMead;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, OpenAIProvider,
    ProviderConfig, ProviderError, Role, Usage,
};
pub use scope::{FitSpec, ModelDef, ParamDef, Scope};

pub use sciforge_error::{Error, ErrorKind, ErrorStatus, Result};
