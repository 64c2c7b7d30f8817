//! KYC Risk Review Core
//!
//! Feature encoding → inference → audit logging for the account-review
//! form. The web shell lives in `risk-review-server`; this crate holds the
//! pipeline and everything with invariants.
//!
//! ```text
//! RawSubmission ──► encode ──► FeatureRecord ──► RiskModel::predict ──► Verdict
//!                                   │                                     │
//!                                   └──────────► AuditLog::append ◄───────┘
//! ```

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{BundleError, EncodingError, InferenceError, PersistenceError, PipelineError};
pub use logic::audit::{AuditLog, AuditRecord, AuditStats};
pub use logic::features::{encode, FeatureRecord, IdentityFields, RawSubmission};
pub use logic::model::{ModelBundle, RiskModel, Verdict};
pub use logic::pipeline::{ReviewOutcome, ReviewPipeline};
