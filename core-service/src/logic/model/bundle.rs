//! Model Bundle - fitted transform + classifier loaded once at startup
//!
//! Manifest format (JSON):
//!
//! ```json
//! {
//!   "name": "logistic_model",
//!   "feature_layout_hash": 1234567890,
//!   "preprocessor": { "transformers": [ { "kind": "one_hot", ... } ] },
//!   "classifier": { "kind": "logistic", "coefficients": [..], "intercept": 0.1 }
//! }
//! ```
//!
//! `classifier` may instead be `{ "kind": "onnx", "path": "model.onnx" }`,
//! with the path resolved relative to the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BundleError;
use crate::logic::features::layout::layout_hash;
use super::classifier::{Classifier, LogisticClassifier};
use super::onnx::{OnnxClassifier, DEFAULT_LABEL_OUTPUT, DEFAULT_PROBABILITY_OUTPUT};
use super::transform::{ColumnTransformer, FeatureTransform, TransformStep};

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    /// Layout hash the model was trained against, if pinned
    #[serde(default)]
    pub feature_layout_hash: Option<u32>,
    pub preprocessor: PreprocessorSpec,
    pub classifier: ClassifierSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorSpec {
    pub transformers: Vec<TransformStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Onnx {
        path: PathBuf,
        #[serde(default = "default_label_output")]
        label_output: String,
        #[serde(default = "default_probability_output")]
        probability_output: Option<String>,
    },
}

fn default_label_output() -> String {
    DEFAULT_LABEL_OUTPUT.to_string()
}

fn default_probability_output() -> Option<String> {
    Some(DEFAULT_PROBABILITY_OUTPUT.to_string())
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Immutable pair of fitted artifacts
pub struct ModelBundle {
    pub name: String,
    pub transform: Box<dyn FeatureTransform>,
    pub classifier: Box<dyn Classifier>,
    pub loaded_at: DateTime<Utc>,
}

impl ModelBundle {
    pub fn new(
        name: impl Into<String>,
        transform: Box<dyn FeatureTransform>,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            name: name.into(),
            transform,
            classifier,
            loaded_at: Utc::now(),
        }
    }

    /// Load and validate a bundle manifest from disk
    pub fn load(manifest_path: &Path) -> Result<Self, BundleError> {
        log::info!("Loading model bundle from: {}", manifest_path.display());

        let data = fs::read(manifest_path)?;
        let manifest: BundleManifest = serde_json::from_slice(&data)?;
        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

        Self::from_manifest(manifest, base_dir)
    }

    /// Build a bundle from a parsed manifest; relative paths resolve
    /// against `base_dir`
    pub fn from_manifest(manifest: BundleManifest, base_dir: &Path) -> Result<Self, BundleError> {
        if let Some(expected) = manifest.feature_layout_hash {
            let actual = layout_hash();
            if expected != actual {
                return Err(BundleError::LayoutMismatch { expected, actual });
            }
        }

        let transform = ColumnTransformer::new(manifest.preprocessor.transformers)
            .map_err(|e| BundleError::Invalid(format!("preprocessor: {}", e)))?;

        let classifier: Box<dyn Classifier> = match manifest.classifier {
            ClassifierSpec::Logistic { coefficients, intercept } => {
                Box::new(LogisticClassifier::new(coefficients, intercept))
            }
            ClassifierSpec::Onnx { path, label_output, probability_output } => {
                let path = if path.is_absolute() { path } else { base_dir.join(path) };
                Box::new(OnnxClassifier::load(&path, &label_output, probability_output.as_deref())?)
            }
        };

        if let Some(expected) = classifier.n_features() {
            if expected != transform.width() {
                return Err(BundleError::Invalid(format!(
                    "preprocessor emits {} columns, classifier expects {}",
                    transform.width(),
                    expected
                )));
            }
        }

        log::info!(
            "Model bundle '{}' ready ({} classifier, {} input columns)",
            manifest.name,
            classifier.kind(),
            transform.width()
        );

        Ok(Self::new(manifest.name, Box::new(transform), classifier))
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("name", &self.name)
            .field("classifier", &self.classifier.kind())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manifest_json(layout_hash: Option<u32>, coefficients: &str) -> String {
        let pin = layout_hash.map(|h| format!("\"feature_layout_hash\": {},", h)).unwrap_or_default();
        format!(
            r#"{{
                "name": "logistic_model",
                {pin}
                "preprocessor": {{ "transformers": [
                    {{ "kind": "standard_scaler", "columns": ["年齡"], "mean": [40.0], "scale": [12.0] }},
                    {{ "kind": "one_hot", "column": "金融卡收取方式", "categories": ["親取", "郵寄"], "handle_unknown": "ignore" }}
                ] }},
                "classifier": {{ "kind": "logistic", "coefficients": {coefficients}, "intercept": -0.2 }}
            }}"#
        )
    }

    #[test]
    fn test_load_logistic_bundle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model_bundle.json");
        fs::write(&path, manifest_json(Some(layout_hash()), "[0.5, -0.1, 0.9]")).unwrap();

        let bundle = ModelBundle::load(&path).unwrap();

        assert_eq!(bundle.name, "logistic_model");
        assert_eq!(bundle.classifier.kind(), "logistic");
        assert_eq!(bundle.transform.output_width(), Some(3));
    }

    #[test]
    fn test_layout_hash_mismatch_refuses_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model_bundle.json");
        fs::write(&path, manifest_json(Some(!layout_hash()), "[0.5, -0.1, 0.9]")).unwrap();

        assert!(matches!(ModelBundle::load(&path), Err(BundleError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_width_mismatch_refuses_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model_bundle.json");
        fs::write(&path, manifest_json(None, "[0.5]")).unwrap();

        assert!(matches!(ModelBundle::load(&path), Err(BundleError::Invalid(_))));
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let dir = tempdir().unwrap();
        let err = ModelBundle::load(&dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(err, BundleError::Io(_)));
    }

    #[test]
    fn test_onnx_spec_defaults() {
        let spec: ClassifierSpec =
            serde_json::from_str(r#"{ "kind": "onnx", "path": "clf.onnx" }"#).unwrap();

        match spec {
            ClassifierSpec::Onnx { label_output, probability_output, .. } => {
                assert_eq!(label_output, "label");
                assert_eq!(probability_output.as_deref(), Some("probabilities"));
            }
            _ => panic!("Expected Onnx spec"),
        }
    }

    #[test]
    fn test_shipped_demo_bundle_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../model/model_bundle.json");

        let bundle = ModelBundle::load(&path).unwrap();

        assert_eq!(bundle.classifier.kind(), "logistic");
        assert_eq!(bundle.transform.output_width(), bundle.classifier.n_features());
    }
}
