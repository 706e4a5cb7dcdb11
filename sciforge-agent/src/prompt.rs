//! Prompt construction.
//!
//! Three strings, built once per run: the system prompt, the base user
//! prompt (task description, data preview, language reference), and the fit
//! harness appended to every candidate before execution.

use crate::loader::Loader;

const LANGUAGE_REFERENCE: &str = r#"Model language reference:
- `model Physics { ... }` defines the model. The name must be `Physics`.
- `param <name> = <initial>;` declares a free parameter to be fitted.
- `predict(x) = <expression>;` is required. Features are `x0`, `x1`, ...
- Operators: + - * / ^ and parentheses. Constants: pi, e.
- Functions: sin cos tan asin acos atan sinh cosh tanh exp ln log10
  sqrt abs sign floor ceil pow(a,b) min(a,b) max(a,b).
"#;

/// Writes the three prompt strings
#[derive(Debug, Clone)]
pub struct PromptWriter {
    /// How many training rows to embed in the user prompt
    preview_rows: usize,
}

impl Default for PromptWriter {
    fn default() -> Self {
        Self { preview_rows: 10 }
    }
}

impl PromptWriter {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    pub fn write_system_prompt(&self) -> String {
        "You are a scientist proposing symbolic physics models that explain \
         observed data. You answer with exactly one fenced code block tagged \
         `model`, containing a single model definition, and nothing else of \
         consequence outside it."
            .to_string()
    }

    pub fn write_user_prompt(&self, loader: &Loader) -> String {
        let mut prompt = String::new();
        prompt.push_str(&format!(
            "### Task:\n\nPropose a symbolic model mapping {} input feature(s) \
             to the observed target. Free parameters will be fitted to the \
             training data; the model is scored by mean squared error on held-out \
             data, lower is better.\n\n",
            loader.feature_count().max(1)
        ));

        prompt.push_str("### Observed data (first rows):\n\n");
        for (row, target) in loader
            .train_x()
            .iter()
            .zip(loader.train_y())
            .take(self.preview_rows)
        {
            let features: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
            prompt.push_str(&format!("x = [{}], y = {:.6}\n", features.join(", "), target));
        }
        prompt.push('\n');

        prompt.push_str(&format!("### {}\n", LANGUAGE_REFERENCE));
        prompt.push_str(
            "\nRespond with one ```model fenced block defining `model Physics`. \
             If previous iterations are shown above, improve on the best of them.\n",
        );
        prompt
    }

    /// The fit harness appended to every candidate before execution
    pub fn write_fit_code(&self) -> String {
        "\nfit Physics {\n    restarts = 4;\n    max_iters = 200;\n}\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loaded_loader() -> Loader {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"train_x": [[0.0, 1.0], [1.0, 2.0]], "train_y": [1.0, 2.0]}"#,
        )
        .unwrap();
        let mut loader = Loader::new(file.path());
        loader.load().unwrap();
        loader
    }

    #[test]
    fn test_user_prompt_embeds_data_and_reference() {
        let loader = loaded_loader();
        let prompt = PromptWriter::default().write_user_prompt(&loader);
        assert!(prompt.contains("2 input feature(s)"));
        assert!(prompt.contains("x = [0.000000, 1.000000], y = 1.000000"));
        assert!(prompt.contains("model Physics"));
        assert!(prompt.contains("sqrt abs sign"));
    }

    #[test]
    fn test_preview_is_bounded() {
        let loader = loaded_loader();
        let prompt = PromptWriter::new(1).write_user_prompt(&loader);
        assert!(prompt.contains("y = 1.000000"));
        assert!(!prompt.contains("y = 2.000000"));
    }

    #[test]
    fn test_fit_code_parses_with_a_model() {
        let harness = PromptWriter::default().write_fit_code();
        let source = format!("model Physics {{ predict(x) = x0; }}{}", harness);
        let scope = sciforge_vm::Scope::execute(&source).unwrap();
        let model = scope.instantiate("Physics").unwrap();
        assert_eq!(model.fit_spec().restarts, 4);
        assert_eq!(model.fit_spec().max_iters, 200);
    }
}
