//! Execution scope - the symbol table produced by running model source.
//!
//! `Scope::execute` is the "load an executable unit from a string" seam:
//! candidate source (plus the fit harness appended by the caller) is parsed
//! into named definitions, and `instantiate` pulls one out as a runnable
//! [`SymbolicModel`](crate::model::SymbolicModel). Each execution uses a
//! fresh scope; nothing leaks between candidates.

use crate::ast::Expr;
use crate::model::SymbolicModel;
use crate::parser::{parse_source, Item};
use sciforge_error::{Error, Result};
use std::collections::HashMap;

/// A free parameter declaration with its initial value
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub init: f64,
}

/// A parsed model definition
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    pub name: String,
    pub params: Vec<ParamDef>,
    pub predict: Expr,
    /// Number of feature columns the predict expression requires
    pub arity: usize,
}

/// Optimizer settings from a `fit` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitSpec {
    /// Deterministic multi-start count (the first start is the declared inits)
    pub restarts: usize,
    /// Nelder-Mead iteration budget per restart
    pub max_iters: usize,
}

impl Default for FitSpec {
    fn default() -> Self {
        Self { restarts: 4, max_iters: 200 }
    }
}

/// Symbol table of executed source
#[derive(Debug, Clone, Default)]
pub struct Scope {
    models: HashMap<String, ModelDef>,
    fits: HashMap<String, FitSpec>,
}

impl Scope {
    /// Execute source text into a fresh scope.
    ///
    /// A parse failure here is the generated code "raising on load". A `fit`
    /// block may name a model the source never defines; that only matters at
    /// instantiation time.
    pub fn execute(source: &str) -> Result<Scope> {
        let items = parse_source(source)
            .map_err(|e| e.with_operation("scope::execute"))?;

        let mut scope = Scope::default();
        for item in items {
            match item {
                Item::Model(def) => {
                    if scope.models.contains_key(&def.name) {
                        return Err(Error::execution_failed(format!(
                            "model '{}' defined twice",
                            def.name
                        ))
                        .with_operation("scope::execute"));
                    }
                    scope.models.insert(def.name.clone(), def);
                }
                Item::Fit(name, spec) => {
                    // last fit block for a name wins
                    scope.fits.insert(name, spec);
                }
            }
        }
        Ok(scope)
    }

    /// Instantiate the named constructor as a runnable model
    pub fn instantiate(&self, name: &str) -> Result<SymbolicModel> {
        let def = self
            .models
            .get(name)
            .ok_or_else(|| Error::symbol_missing(name).with_operation("scope::instantiate"))?;
        let spec = self.fits.get(name).copied().unwrap_or_default();
        Ok(SymbolicModel::new(def.clone(), spec))
    }

    /// Whether the scope defines the named model
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Names of all defined models, in no particular order
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciforge_error::ErrorKind;

    const SOURCE: &str = r#"
model Physics {
    param g = 9.0;
    predict(x) = g * x0 ^ 2 / 2;
}
fit Physics {
    restarts = 2;
    max_iters = 80;
}
"#;

    #[test]
    fn test_execute_and_instantiate() {
        let scope = Scope::execute(SOURCE).unwrap();
        assert!(scope.contains("Physics"));

        let model = scope.instantiate("Physics").unwrap();
        assert_eq!(model.name(), "Physics");
        assert_eq!(model.fit_spec().restarts, 2);
        assert_eq!(model.fit_spec().max_iters, 80);
    }

    #[test]
    fn test_missing_symbol() {
        let scope = Scope::execute(SOURCE).unwrap();
        let err = scope.instantiate("Chemistry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SymbolMissing);
    }

    #[test]
    fn test_fit_without_model_tolerated() {
        // the harness references the constructor; the candidate failed to
        // define it - execution succeeds, instantiation reports the miss
        let scope = Scope::execute("fit Physics { restarts = 1; }").unwrap();
        let err = scope.instantiate("Physics").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SymbolMissing);
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let src = "model M { predict(x) = x0; } model M { predict(x) = x0; }";
        let err = Scope::execute(src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionFailed);
        assert!(err.message().contains("defined twice"));
    }

    #[test]
    fn test_default_fit_spec() {
        let scope = Scope::execute("model M { predict(x) = x0; }").unwrap();
        let model = scope.instantiate("M").unwrap();
        assert_eq!(model.fit_spec(), FitSpec::default());
    }
}
