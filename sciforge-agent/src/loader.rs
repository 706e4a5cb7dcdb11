//! Dataset loading.
//!
//! The dataset is a JSON file with train and (optionally) validation splits:
//!
//! ```json
//! {
//!     "train_x": [[0.0], [0.5], [1.0]],
//!     "train_y": [1.0, 2.0, 3.0],
//!     "valid_x": [[1.5]],
//!     "valid_y": [4.0]
//! }
//! ```

use sciforge_error::{Error, ErrorKind, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct Dataset {
    train_x: Vec<Vec<f64>>,
    train_y: Vec<f64>,
    #[serde(default)]
    valid_x: Vec<Vec<f64>>,
    #[serde(default)]
    valid_y: Vec<f64>,
}

/// Loads and validates the dataset; accessors serve the loaded splits.
///
/// `load()` is called once at setup. Before it, every accessor returns an
/// empty slice, which downstream fitting rejects with a clear error.
#[derive(Debug, Default)]
pub struct Loader {
    path: PathBuf,
    data: Dataset,
    loaded: bool,
}

impl Loader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), ..Default::default() }
    }

    /// Read and validate the dataset file
    pub fn load(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::from(e).with_operation("loader::load"))?;
        let data: Dataset = serde_json::from_str(&text).map_err(|e| {
            Error::new(ErrorKind::SerializationFailed, "dataset file is not valid JSON")
                .with_operation("loader::load")
                .with_context("path", self.path.display().to_string())
                .set_source(e)
        })?;

        validate(&data).map_err(|e| e.with_context("path", self.path.display().to_string()))?;

        log::info!(
            "loaded dataset: {} train rows, {} validation rows, {} feature(s)",
            data.train_x.len(),
            data.valid_x.len(),
            data.train_x[0].len()
        );
        self.data = data;
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of feature columns per row
    pub fn feature_count(&self) -> usize {
        self.data.train_x.first().map(Vec::len).unwrap_or(0)
    }

    pub fn train_x(&self) -> &[Vec<f64>] {
        &self.data.train_x
    }

    pub fn train_y(&self) -> &[f64] {
        &self.data.train_y
    }

    pub fn valid_x(&self) -> &[Vec<f64>] {
        &self.data.valid_x
    }

    pub fn valid_y(&self) -> &[f64] {
        &self.data.valid_y
    }
}

fn validate(data: &Dataset) -> Result<()> {
    if data.train_x.is_empty() {
        return Err(Error::data_invalid("train split is empty").with_operation("loader::load"));
    }
    if data.train_x.len() != data.train_y.len() {
        return Err(Error::data_invalid(format!(
            "train_x has {} rows but train_y has {} targets",
            data.train_x.len(),
            data.train_y.len()
        ))
        .with_operation("loader::load"));
    }
    if data.valid_x.len() != data.valid_y.len() {
        return Err(Error::data_invalid(format!(
            "valid_x has {} rows but valid_y has {} targets",
            data.valid_x.len(),
            data.valid_y.len()
        ))
        .with_operation("loader::load"));
    }

    let width = data.train_x[0].len();
    if width == 0 {
        return Err(Error::data_invalid("train rows have no feature columns")
            .with_operation("loader::load"));
    }
    for row in data.train_x.iter().chain(&data.valid_x) {
        if row.len() != width {
            return Err(Error::data_invalid(format!(
                "inconsistent row width: expected {} feature(s), found {}",
                width,
                row.len()
            ))
            .with_operation("loader::load"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dataset(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_dataset() {
        let file = write_dataset(
            r#"{
                "train_x": [[0.0], [1.0], [2.0]],
                "train_y": [1.0, 3.0, 5.0],
                "valid_x": [[3.0]],
                "valid_y": [7.0]
            }"#,
        );
        let mut loader = Loader::new(file.path());
        loader.load().unwrap();

        assert!(loader.is_loaded());
        assert_eq!(loader.train_x().len(), 3);
        assert_eq!(loader.valid_y(), &[7.0]);
        assert_eq!(loader.feature_count(), 1);
    }

    #[test]
    fn test_validation_split_optional() {
        let file = write_dataset(r#"{"train_x": [[0.0]], "train_y": [1.0]}"#);
        let mut loader = Loader::new(file.path());
        loader.load().unwrap();
        assert!(loader.valid_x().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let mut loader = Loader::new("/nonexistent/dataset.json");
        let err = loader.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_malformed_json() {
        let file = write_dataset("not json");
        let mut loader = Loader::new(file.path());
        let err = loader.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerializationFailed);
    }

    #[test]
    fn test_length_mismatch() {
        let file = write_dataset(r#"{"train_x": [[0.0], [1.0]], "train_y": [1.0]}"#);
        let mut loader = Loader::new(file.path());
        let err = loader.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataInvalid);
    }

    #[test]
    fn test_inconsistent_width() {
        let file = write_dataset(
            r#"{"train_x": [[0.0, 1.0], [1.0]], "train_y": [1.0, 2.0]}"#,
        );
        let mut loader = Loader::new(file.path());
        let err = loader.load().unwrap_err();
        assert!(err.message().contains("inconsistent row width"));
    }

    #[test]
    fn test_unloaded_accessors_empty() {
        let loader = Loader::new("whatever.json");
        assert!(!loader.is_loaded());
        assert!(loader.train_x().is_empty());
        assert_eq!(loader.feature_count(), 0);
    }
}
