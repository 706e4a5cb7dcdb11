//! A generated candidate model.

use sciforge_vm::SymbolicModel;

/// One generated candidate: the fitted executable model, the exact source
/// block that produced it, and the validation loss once scored.
///
/// The source is kept verbatim so the pairing can be replayed or exported
/// deterministically; the archive owns a candidate once it is inserted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub model: SymbolicModel,
    pub source: String,
    pub loss: Option<f64>,
}

impl Candidate {
    /// A freshly generated, fitted, not-yet-scored candidate
    pub fn new(model: SymbolicModel, source: impl Into<String>) -> Self {
        Self { model, source: source.into(), loss: None }
    }

    /// Loss for ordering: unscored candidates sort last
    pub fn sort_loss(&self) -> f64 {
        self.loss.unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciforge_vm::Scope;

    #[test]
    fn test_new_candidate_is_unscored() {
        let model = Scope::execute("model Physics { predict(x) = x0; }")
            .unwrap()
            .instantiate("Physics")
            .unwrap();
        let c = Candidate::new(model, "model Physics { predict(x) = x0; }");
        assert!(c.loss.is_none());
        assert_eq!(c.sort_loss(), f64::INFINITY);
    }
}
