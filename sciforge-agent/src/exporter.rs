//! Final artifact export.

use crate::loader::Loader;
use sciforge_error::{Error, ErrorKind, Result};
use sciforge_vm::SymbolicModel;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct Artifact<'a> {
    source: &'a str,
    params: Vec<ParamValue<'a>>,
    validation_loss: f64,
    predictions: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct ParamValue<'a> {
    name: &'a str,
    value: f64,
}

/// Writes the winning candidate to disk as a JSON artifact: its source,
/// fitted parameter values, validation loss, and validation predictions.
#[derive(Debug)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self { output_dir: output_dir.as_ref().to_path_buf() }
    }

    /// Create the output directory; called once before the loop
    pub fn set_up(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::from(e).with_operation("exporter::set_up"))
    }

    /// Write the artifact, returning its path. Called exactly once at the
    /// end of a successful run.
    pub fn export(
        &self,
        loader: &Loader,
        model: &SymbolicModel,
        source: &str,
    ) -> Result<PathBuf> {
        let (x, y) = if loader.valid_x().is_empty() {
            (loader.train_x(), loader.train_y())
        } else {
            (loader.valid_x(), loader.valid_y())
        };

        let artifact = Artifact {
            source,
            params: model
                .params()
                .map(|(name, value)| ParamValue { name, value })
                .collect(),
            validation_loss: model.mse(x, y),
            predictions: model.predict_batch(x),
        };

        let path = self.output_dir.join("best_model.json");
        let text = serde_json::to_string_pretty(&artifact).map_err(|e| {
            Error::new(ErrorKind::SerializationFailed, "failed to serialize artifact")
                .with_operation("exporter::export")
                .set_source(e)
        })?;
        std::fs::write(&path, text)
            .map_err(|e| Error::from(e).with_operation("exporter::export"))?;

        log::info!("exported best model to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciforge_vm::Scope;
    use std::io::Write;

    #[test]
    fn test_export_writes_artifact() {
        let mut data = tempfile::NamedTempFile::new().unwrap();
        data.write_all(
            br#"{
                "train_x": [[1.0], [2.0]], "train_y": [2.0, 4.0],
                "valid_x": [[3.0]], "valid_y": [6.0]
            }"#,
        )
        .unwrap();
        let mut loader = Loader::new(data.path());
        loader.load().unwrap();

        let source = "model Physics { param a = 2.0; predict(x) = a * x0; }";
        let model = Scope::execute(source).unwrap().instantiate("Physics").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("out"));
        exporter.set_up().unwrap();
        let path = exporter.export(&loader, &model, source).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["source"], source);
        assert_eq!(parsed["params"][0]["name"], "a");
        assert_eq!(parsed["params"][0]["value"], 2.0);
        assert_eq!(parsed["predictions"][0], 6.0);
        assert_eq!(parsed["validation_loss"], 0.0);
    }

    #[test]
    fn test_set_up_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("out"));
        exporter.set_up().unwrap();
        exporter.set_up().unwrap();
    }
}
