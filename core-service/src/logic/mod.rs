//! Logic Module - Review Pipeline
//!
//! - `features/` - RawSubmission → FeatureRecord (layout, coercion, encoder)
//! - `model/` - fitted transform + classifier → Verdict
//! - `audit/` - append-only CSV audit log
//! - `pipeline/` - wires the three stages for one request

pub mod features;
pub mod model;
pub mod audit;
pub mod pipeline;
