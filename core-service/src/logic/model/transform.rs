//! Fitted Feature Transform
//!
//! Maps a FeatureRecord onto the numeric row the classifier was trained on.
//! Features are addressed by training column name, never by position.
//! Parameters are fixed at training time and exported alongside the model.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::logic::features::{FeatureRecord, FeatureValue};
use crate::logic::features::layout::feature_index;

// ============================================================================
// TRAIT
// ============================================================================

/// Deterministic, side-effect-free FeatureRecord → matrix map
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, features: &FeatureRecord) -> Result<Array2<f32>, EncodingError>;

    /// Number of output columns, when known up front
    fn output_width(&self) -> Option<usize> {
        None
    }
}

// ============================================================================
// COLUMN TRANSFORMER
// ============================================================================

/// What a one-hot step does with a category it never saw during training
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Emit an all-zero block
    Ignore,
}

/// One fitted step; outputs are concatenated in step order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformStep {
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        column: String,
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        columns: Vec<String>,
    },
}

impl TransformStep {
    fn width(&self) -> usize {
        match self {
            TransformStep::StandardScaler { columns, .. } => columns.len(),
            TransformStep::OneHot { categories, .. } => categories.len(),
            TransformStep::Passthrough { columns } => columns.len(),
        }
    }

    fn columns(&self) -> Vec<&str> {
        match self {
            TransformStep::StandardScaler { columns, .. } | TransformStep::Passthrough { columns } => {
                columns.iter().map(String::as_str).collect()
            }
            TransformStep::OneHot { column, .. } => vec![column.as_str()],
        }
    }
}

/// Ordered list of fitted steps; columns not named by any step are dropped
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    transformers: Vec<TransformStep>,
}

impl ColumnTransformer {
    /// Validate fitted parameters against the feature layout
    pub fn new(transformers: Vec<TransformStep>) -> Result<Self, EncodingError> {
        if transformers.is_empty() {
            return Err(EncodingError::InvalidParameters("no transform steps".to_string()));
        }

        for step in &transformers {
            for column in step.columns() {
                if feature_index(column).is_none() {
                    return Err(EncodingError::UnknownColumn(column.to_string()));
                }
            }

            match step {
                TransformStep::StandardScaler { columns, mean, scale } => {
                    if mean.len() != columns.len() || scale.len() != columns.len() {
                        return Err(EncodingError::InvalidParameters(format!(
                            "scaler has {} columns but {} means and {} scales",
                            columns.len(), mean.len(), scale.len()
                        )));
                    }
                    if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
                        return Err(EncodingError::InvalidParameters(
                            "scaler parameters must be finite".to_string(),
                        ));
                    }
                }
                TransformStep::OneHot { column, categories, .. } => {
                    if categories.is_empty() {
                        return Err(EncodingError::InvalidParameters(format!(
                            "one-hot step for '{}' has no categories", column
                        )));
                    }
                }
                TransformStep::Passthrough { .. } => {}
            }
        }

        Ok(Self { transformers })
    }

    pub fn width(&self) -> usize {
        self.transformers.iter().map(TransformStep::width).sum()
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.transformers
    }

    fn push_step(
        step: &TransformStep,
        features: &FeatureRecord,
        row: &mut Vec<f32>,
    ) -> Result<(), EncodingError> {
        match step {
            TransformStep::StandardScaler { columns, mean, scale } => {
                for ((column, mu), sigma) in columns.iter().zip(mean).zip(scale) {
                    let x = numeric(features, column)?;
                    // Zero variance at fit time: sklearn keeps the unit scale
                    let sigma = if *sigma == 0.0 { 1.0 } else { *sigma };
                    row.push(((x - mu) / sigma) as f32);
                }
            }
            TransformStep::OneHot { column, categories, handle_unknown } => {
                let value = match lookup(features, column)? {
                    FeatureValue::Text(text) => text.to_string(),
                    FeatureValue::Int(n) => n.to_string(),
                };
                let hit = categories.iter().position(|c| *c == value);

                if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(EncodingError::UnknownCategory {
                        column: column.clone(),
                        value,
                    });
                }
                row.extend((0..categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
            }
            TransformStep::Passthrough { columns } => {
                for column in columns {
                    row.push(numeric(features, column)? as f32);
                }
            }
        }
        Ok(())
    }
}

impl FeatureTransform for ColumnTransformer {
    fn transform(&self, features: &FeatureRecord) -> Result<Array2<f32>, EncodingError> {
        let width = self.width();
        let mut row = Vec::with_capacity(width);

        for step in &self.transformers {
            Self::push_step(step, features, &mut row)?;
        }

        Array2::from_shape_vec((1, width), row)
            .map_err(|e| EncodingError::InvalidParameters(format!("Array error: {}", e)))
    }

    fn output_width(&self) -> Option<usize> {
        Some(self.width())
    }
}

fn lookup<'a>(features: &'a FeatureRecord, column: &str) -> Result<FeatureValue<'a>, EncodingError> {
    features
        .value(column)
        .ok_or_else(|| EncodingError::UnknownColumn(column.to_string()))
}

fn numeric(features: &FeatureRecord, column: &str) -> Result<f64, EncodingError> {
    match lookup(features, column)? {
        FeatureValue::Int(n) => Ok(n as f64),
        FeatureValue::Text(_) => Err(EncodingError::NotNumeric { column: column.to_string() }),
    }
}

// ============================================================================
// TESTS
// ============================================================================
