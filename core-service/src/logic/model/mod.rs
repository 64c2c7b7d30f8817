//! Model Module - Inference Adapter
//!
//! Wraps a pre-fitted transform + classifier pair. The pair is loaded once
//! at startup (`ModelBundle`) and served read-only through `RiskModel`.

pub mod transform;
pub mod classifier;
pub mod onnx;
pub mod bundle;
pub mod inference;

// Re-export common types
pub use transform::{ColumnTransformer, FeatureTransform, HandleUnknown, TransformStep};
pub use classifier::{Classifier, LogisticClassifier};
pub use onnx::OnnxClassifier;
pub use bundle::{BundleManifest, ClassifierSpec, ModelBundle};
pub use inference::{ModelStatus, RiskModel, Verdict};
