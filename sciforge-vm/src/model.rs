//! Runnable symbolic model: parameter fitting and prediction.

use crate::optim::NelderMead;
use crate::scope::{FitSpec, ModelDef};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sciforge_error::{Error, Result};

/// An instantiated model with free parameters.
///
/// Created by [`Scope::instantiate`](crate::scope::Scope::instantiate).
/// `fit` optimizes the declared parameters against training data by
/// minimizing mean squared error; `predict` evaluates the fitted expression.
#[derive(Debug, Clone)]
pub struct SymbolicModel {
    def: ModelDef,
    spec: FitSpec,
    values: Vec<f64>,
    fitted: bool,
}

impl SymbolicModel {
    pub(crate) fn new(def: ModelDef, spec: FitSpec) -> Self {
        let values = def.params.iter().map(|p| p.init).collect();
        Self { def, spec, values, fitted: false }
    }

    /// The constructor symbol this model was instantiated from
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Optimizer settings in effect for this model
    pub fn fit_spec(&self) -> FitSpec {
        self.spec
    }

    /// Number of feature columns the model requires
    pub fn arity(&self) -> usize {
        self.def.arity
    }

    /// Whether `fit` has completed
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Parameter names with their current values
    pub fn params(&self) -> impl Iterator<Item = (&str, f64)> {
        self.def
            .params
            .iter()
            .zip(&self.values)
            .map(|(p, v)| (p.name.as_str(), *v))
    }

    /// Fit the free parameters against training data.
    ///
    /// Deterministic multi-start Nelder-Mead over the MSE objective: the
    /// first start is the declared initial values, later starts are seeded
    /// perturbations of them. A model with no parameters is trivially
    /// fitted.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            return Err(Error::fit_failed("training data is empty")
                .with_operation("model::fit")
                .with_context("model", self.def.name.clone()));
        }
        if x.len() != y.len() {
            return Err(Error::fit_failed(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            ))
            .with_operation("model::fit")
            .with_context("model", self.def.name.clone()));
        }
        if let Some(row) = x.iter().find(|row| row.len() < self.def.arity) {
            return Err(Error::fit_failed(format!(
                "model reads {} feature column(s) but a row has only {}",
                self.def.arity,
                row.len()
            ))
            .with_operation("model::fit")
            .with_context("model", self.def.name.clone()));
        }

        if self.values.is_empty() {
            self.fitted = true;
            return Ok(());
        }

        let inits: Vec<f64> = self.def.params.iter().map(|p| p.init).collect();
        let objective = |params: &[f64]| mse_with(&self.def, params, x, y);
        let optimizer = NelderMead::new(self.spec.max_iters);

        let mut best: Option<(Vec<f64>, f64)> = None;
        for restart in 0..self.spec.restarts.max(1) {
            let start = if restart == 0 {
                inits.clone()
            } else {
                perturb(&inits, restart as u64)
            };
            let (point, value) = optimizer.minimize(&objective, &start);
            let better = match &best {
                Some((_, current)) => value.total_cmp(current).is_lt(),
                None => true,
            };
            if better {
                best = Some((point, value));
            }
        }

        // best is always set: restarts >= 1
        let (point, value) = best.unwrap_or((inits, f64::INFINITY));
        if !value.is_finite() {
            return Err(Error::fit_failed("objective non-finite at every restart")
                .with_operation("model::fit")
                .with_context("model", self.def.name.clone())
                .with_context("restarts", self.spec.restarts.to_string()));
        }

        log::debug!(
            "fitted '{}': mse {:.6e} over {} restart(s)",
            self.def.name,
            value,
            self.spec.restarts.max(1)
        );
        self.values = point;
        self.fitted = true;
        Ok(())
    }

    /// Evaluate the model on one feature row
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.def.predict.eval(&self.values, row)
    }

    /// Evaluate the model on every row
    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict(row)).collect()
    }

    /// Mean squared error with the current parameter values.
    ///
    /// Non-finite predictions yield +inf rather than NaN so losses stay
    /// comparable.
    pub fn mse(&self, x: &[Vec<f64>], y: &[f64]) -> f64 {
        mse_with(&self.def, &self.values, x, y)
    }
}

fn mse_with(def: &ModelDef, params: &[f64], x: &[Vec<f64>], y: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for (row, target) in x.iter().zip(y) {
        let pred = def.predict.eval(params, row);
        let err = pred - target;
        if !err.is_finite() {
            return f64::INFINITY;
        }
        sum += err * err;
    }
    sum / x.len() as f64
}

/// Seeded perturbation of the declared initial values for restart `seed`
fn perturb(inits: &[f64], seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    inits
        .iter()
        .map(|&v| {
            let scale = if v != 0.0 { v.abs() } else { 1.0 };
            v + scale * rng.gen_range(-1.0..1.0)
        })
        .collect()
}
