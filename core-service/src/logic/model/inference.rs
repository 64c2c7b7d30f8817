//! Inference Adapter
//!
//! FeatureRecord → transform → classifier → Verdict. Single shot, no
//! retries. A transform rejection is the one legitimate hard failure; a
//! missing probability only drops the confidence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::constants::{HIGH_RISK_MESSAGE, NORMAL_MESSAGE};
use crate::error::{EncodingError, InferenceError, PipelineError};
use crate::logic::features::{layout_hash, FeatureRecord, FEATURE_VERSION};
use super::bundle::ModelBundle;

// ============================================================================
// VERDICT
// ============================================================================

/// Binary risk class plus the positive-class probability, when known
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// 1 = high risk, flagged for enhanced review; 0 = normal
    pub class_label: u8,
    /// In [0, 1] when present
    pub confidence: Option<f64>,
}

impl Verdict {
    /// Validate a raw classifier output
    pub fn new(label: i64, confidence: Option<f64>) -> Result<Self, InferenceError> {
        let class_label = match label {
            0 => 0,
            1 => 1,
            other => return Err(InferenceError::NonBinaryLabel(other)),
        };

        let confidence = confidence.filter(|p| {
            let valid = (0.0..=1.0).contains(p);
            if !valid {
                log::warn!("Discarding out-of-range probability {}", p);
            }
            valid
        });

        Ok(Self { class_label, confidence })
    }

    pub fn is_high_risk(&self) -> bool {
        self.class_label == 1
    }

    /// Reviewer-facing text, persisted verbatim in the audit log
    pub fn message(&self) -> &'static str {
        if self.is_high_risk() {
            HIGH_RISK_MESSAGE
        } else {
            NORMAL_MESSAGE
        }
    }
}

// ============================================================================
// STATUS
// ============================================================================

/// Engine status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_name: String,
    pub classifier: String,
    pub input_width: Option<usize>,
    pub feature_version: u8,
    pub feature_layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// RISK MODEL
// ============================================================================

/// Read-only model service, shared across requests behind an `Arc`
pub struct RiskModel {
    bundle: ModelBundle,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl RiskModel {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            bundle,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.bundle.name
    }

    /// Run the fitted transform and classifier on one record
    pub fn predict(&self, features: &FeatureRecord) -> Result<Verdict, PipelineError> {
        let start_time = Instant::now();

        let x = self.bundle.transform.transform(features)?;
        self.check_width(&x)?;

        let (labels, proba) = self.bundle.classifier.predict_with_proba(&x)?;
        let label = *labels.first().ok_or(InferenceError::EmptyPrediction)?;
        let confidence = proba.as_ref().and_then(positive_class_probability);

        let verdict = Verdict::new(label, confidence)?;

        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Model '{}' verdict: label={} confidence={:?}",
            self.bundle.name, verdict.class_label, verdict.confidence
        );

        Ok(verdict)
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        ModelStatus {
            model_name: self.bundle.name.clone(),
            classifier: self.bundle.classifier.kind().to_string(),
            input_width: self.bundle.transform.output_width(),
            feature_version: FEATURE_VERSION,
            feature_layout_hash: layout_hash(),
            loaded_at: self.bundle.loaded_at,
            inference_count: count,
            avg_latency_ms: avg,
        }
    }

    fn check_width(&self, x: &Array2<f32>) -> Result<(), EncodingError> {
        match self.bundle.classifier.n_features() {
            Some(expected) if expected != x.ncols() => Err(EncodingError::WidthMismatch {
                expected,
                actual: x.ncols(),
            }),
            _ => Ok(()),
        }
    }
}

/// Column 1 of a two-class matrix; a single column is taken as the
/// positive class already
fn positive_class_probability(proba: &Array2<f64>) -> Option<f64> {
    let column = if proba.ncols() >= 2 { 1 } else { 0 };
    proba.get((0, column)).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::AgeBand;
    use crate::logic::model::classifier::{Classifier, LogisticClassifier};
    use crate::logic::model::transform::{ColumnTransformer, FeatureTransform, TransformStep};

    /// Classifier double returning fixed outputs
    struct FixedClassifier {
        label: i64,
        proba: Option<Vec<f64>>,
    }

    impl Classifier for FixedClassifier {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn predict(&self, x: &Array2<f32>) -> Result<Vec<i64>, InferenceError> {
            Ok(vec![self.label; x.nrows()])
        }

        fn predict_proba(&self, _x: &Array2<f32>) -> Result<Array2<f64>, InferenceError> {
            let row = self.proba.clone().ok_or(InferenceError::ProbabilityUnsupported)?;
            Ok(Array2::from_shape_vec((1, row.len()), row).unwrap())
        }
    }

    fn age_transform() -> Box<dyn FeatureTransform> {
        Box::new(
            ColumnTransformer::new(vec![TransformStep::Passthrough {
                columns: vec!["年齡".to_string()],
            }])
            .unwrap(),
        )
    }

    fn model(label: i64, proba: Option<Vec<f64>>) -> RiskModel {
        RiskModel::new(ModelBundle::new(
            "test",
            age_transform(),
            Box::new(FixedClassifier { label, proba }),
        ))
    }

    #[test]
    fn test_label_and_probability() {
        let verdict = model(1, Some(vec![0.2, 0.8])).predict(&FeatureRecord::default()).unwrap();

        assert_eq!(verdict.class_label, 1);
        assert_eq!(verdict.confidence, Some(0.8));
        assert_eq!(verdict.message(), HIGH_RISK_MESSAGE);
    }

    #[test]
    fn test_no_probability_means_no_confidence() {
        let verdict = model(0, None).predict(&FeatureRecord::default()).unwrap();

        assert_eq!(verdict.class_label, 0);
        assert_eq!(verdict.confidence, None);
        assert_eq!(verdict.message(), NORMAL_MESSAGE);
    }

    #[test]
    fn test_out_of_range_probability_is_dropped() {
        let verdict = model(1, Some(vec![-0.5, 1.5])).predict(&FeatureRecord::default()).unwrap();
        assert_eq!(verdict.confidence, None);
    }

    #[test]
    fn test_non_binary_label_is_rejected() {
        let err = model(2, None).predict(&FeatureRecord::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Inference(InferenceError::NonBinaryLabel(2))));
    }

    #[test]
    fn test_transform_rejection_propagates() {
        let strict = ColumnTransformer::new(vec![TransformStep::OneHot {
            column: "金融卡收取方式".to_string(),
            categories: vec!["郵寄".to_string()],
            handle_unknown: Default::default(),
        }])
        .unwrap();
        let risk_model = RiskModel::new(ModelBundle::new(
            "strict",
            Box::new(strict),
            Box::new(FixedClassifier { label: 0, proba: None }),
        ));

        let err = risk_model.predict(&FeatureRecord::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(EncodingError::UnknownCategory { .. })));
    }

    #[test]
    fn test_width_mismatch_is_encoding_error() {
        let risk_model = RiskModel::new(ModelBundle::new(
            "narrow",
            age_transform(),
            Box::new(LogisticClassifier::new(vec![1.0, 1.0], 0.0)),
        ));

        let err = risk_model.predict(&FeatureRecord::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding(EncodingError::WidthMismatch { .. })));
    }

    #[test]
    fn test_verdict_properties_over_inputs() {
        let risk_model = RiskModel::new(ModelBundle::new(
            "logistic",
            age_transform(),
            Box::new(LogisticClassifier::new(vec![0.08], -3.0)),
        ));

        for age in [-10, 0, 18, 37, 55, 90, 1_000] {
            let features = FeatureRecord {
                age_years: age,
                age_band: Some(AgeBand::Over50),
                ..FeatureRecord::default()
            };
            let verdict = risk_model.predict(&features).unwrap();

            assert!(verdict.class_label <= 1);
            let p = verdict.confidence.unwrap();
            assert!((0.0..=1.0).contains(&p), "age {} gave {}", age, p);
        }
        assert_eq!(risk_model.status().inference_count, 7);
    }

    #[test]
    fn test_status_reports_bundle() {
        let status = model(0, None).status();

        assert_eq!(status.model_name, "test");
        assert_eq!(status.classifier, "fixed");
        assert_eq!(status.input_width, Some(1));
        assert_eq!(status.inference_count, 0);
    }
}
