//! Features Module - Feature Encoding
//!
//! Maps a raw form submission onto the exact feature record the trained
//! model expects. The layout file is the schema authority.

pub mod layout;
pub mod record;
pub mod coerce;
pub mod encoder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo, layout_hash};
pub use record::{AgeBand, FeatureRecord, FeatureValue, IdentityFields, RawSubmission};
pub use coerce::parse_with_default;
pub use encoder::{encode, identity_fields};
