//! Candidate scoring.

use crate::loader::Loader;
use sciforge_error::{Error, Result};
use sciforge_vm::SymbolicModel;

/// Scores a fitted candidate: mean squared error on the validation split,
/// falling back to the train split when no validation data was provided.
///
/// Non-finite predictions score as +inf rather than erroring, so a wildly
/// wrong candidate loses the top-k race instead of killing the run.
#[derive(Debug, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        iteration: usize,
        loader: &Loader,
        model: &SymbolicModel,
    ) -> Result<f64> {
        let (x, y) = if loader.valid_x().is_empty() {
            (loader.train_x(), loader.train_y())
        } else {
            (loader.valid_x(), loader.valid_y())
        };
        if x.is_empty() {
            return Err(Error::data_invalid("no data to evaluate against")
                .with_operation("evaluator::evaluate")
                .with_context("iteration", iteration.to_string()));
        }

        let loss = model.mse(x, y);
        log::info!("iteration {}: loss = {:e}", iteration, loss);
        Ok(loss)
    }
}
