//! ONNX Classifier - ONNX Runtime Integration
//!
//! Runs a classifier exported to ONNX (e.g. skl2onnx with zipmap disabled):
//! float input [n, width] → int64 label output + optional float probability
//! output [n, 2].

use std::path::Path;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::{BundleError, InferenceError};
use super::classifier::Classifier;

pub const DEFAULT_LABEL_OUTPUT: &str = "label";
pub const DEFAULT_PROBABILITY_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    model_path: String,
    label_output: String,
    probability_output: Option<String>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_path", &self.model_path)
            .field("label_output", &self.label_output)
            .field("probability_output", &self.probability_output)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(
        model_path: &Path,
        label_output: &str,
        probability_output: Option<&str>,
    ) -> Result<Self, BundleError> {
        log::info!("Loading ONNX classifier from: {}", model_path.display());

        if !model_path.exists() {
            return Err(BundleError::Onnx(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| BundleError::Onnx(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| BundleError::Onnx(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| BundleError::Onnx(format!("Failed to load model: {}", e)))?;

        let has_output = |name: &str| session.outputs.iter().any(|o| o.name == name);
        if !has_output(label_output) {
            return Err(BundleError::Onnx(format!("Model has no '{}' output", label_output)));
        }
        let probability_output = match probability_output {
            Some(name) if has_output(name) => Some(name.to_string()),
            Some(name) => {
                log::warn!("Model has no '{}' output, confidence will be omitted", name);
                None
            }
            None => None,
        };

        log::info!("ONNX classifier loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.display().to_string(),
            label_output: label_output.to_string(),
            probability_output,
        })
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Single session run returning labels and, if exported, probabilities
    fn run(&self, x: &Array2<f32>) -> Result<(Vec<i64>, Option<Array2<f64>>), InferenceError> {
        let rows = x.nrows();

        let input_tensor = Value::from_array(x.clone())
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let labels = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| InferenceError::Runtime(format!("No '{}' output", self.label_output)))?
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?
            .1
            .to_vec();

        let proba = self.probability_output.as_deref().and_then(|name| {
            let data: Vec<f64> = outputs
                .get(name)?
                .try_extract_tensor::<f32>()
                .ok()?
                .1
                .iter()
                .map(|p| *p as f64)
                .collect();
            if rows == 0 || data.len() % rows != 0 {
                log::debug!("Unexpected probability output size {} for {} rows", data.len(), rows);
                return None;
            }
            Array2::from_shape_vec((rows, data.len() / rows), data).ok()
        });

        Ok((labels, proba))
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i64>, InferenceError> {
        self.run(x).map(|(labels, _)| labels)
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>, InferenceError> {
        self.run(x)?.1.ok_or(InferenceError::ProbabilityUnsupported)
    }

    fn predict_with_proba(
        &self,
        x: &Array2<f32>,
    ) -> Result<(Vec<i64>, Option<Array2<f64>>), InferenceError> {
        self.run(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file_is_rejected() {
        let err = OnnxClassifier::load(
            Path::new("/nonexistent/classifier.onnx"),
            DEFAULT_LABEL_OUTPUT,
            Some(DEFAULT_PROBABILITY_OUTPUT),
        )
        .unwrap_err();

        assert!(matches!(err, BundleError::Onnx(ref msg) if msg.contains("Model not found")));
    }
}
