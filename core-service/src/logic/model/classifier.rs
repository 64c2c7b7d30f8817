//! Classifier Trait + Logistic Regression
//!
//! Label prediction is mandatory. Probability estimates are best-effort:
//! classifiers that cannot produce calibrated probabilities keep the default
//! `predict_proba`, which reports them as unsupported.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

// ============================================================================
// TRAIT
// ============================================================================

/// Trait for fitted classifiers (exported coefficients, ONNX, etc.)
pub trait Classifier: Send + Sync {
    /// Short identifier for status reporting
    fn kind(&self) -> &'static str;

    /// Expected input width, when the artifact declares it
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// One class label per input row
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i64>, InferenceError>;

    /// Class probability matrix, columns ordered by class (0, 1)
    fn predict_proba(&self, _x: &Array2<f32>) -> Result<Array2<f64>, InferenceError> {
        Err(InferenceError::ProbabilityUnsupported)
    }

    /// Labels plus probabilities when available. A probability failure is
    /// never fatal.
    fn predict_with_proba(
        &self,
        x: &Array2<f32>,
    ) -> Result<(Vec<i64>, Option<Array2<f64>>), InferenceError> {
        let labels = self.predict(x)?;
        let proba = match self.predict_proba(x) {
            Ok(p) => Some(p),
            Err(e) => {
                log::debug!("No probability estimate ({}), confidence omitted", e);
                None
            }
        };
        Ok((labels, proba))
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Binary logistic regression with exported coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept }
    }

    /// Signed distance to the decision boundary, one per row
    pub fn decision_function(&self, x: &Array2<f32>) -> Result<Vec<f64>, InferenceError> {
        if x.ncols() != self.coefficients.len() {
            return Err(InferenceError::InputWidth {
                expected: self.coefficients.len(),
                actual: x.ncols(),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(&self.coefficients)
                    .map(|(xi, wi)| *xi as f64 * wi)
                    .sum::<f64>()
                    + self.intercept
            })
            .collect())
    }
}

impl Classifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i64>, InferenceError> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|d| if d > 0.0 { 1 } else { 0 })
            .collect())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>, InferenceError> {
        let scores = self.decision_function(x)?;
        let mut proba = Array2::<f64>::zeros((scores.len(), 2));

        for (i, d) in scores.iter().enumerate() {
            let p = sigmoid(*d);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ============================================================================
// TESTS
// ============================================================================
