//! Review Pipeline - encode → predict → audit for one submission
//!
//! The only entry point the web layer calls. A verdict is released only
//! after its audit row is durable; if the append fails the whole review
//! fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{AUDIT_TIMESTAMP_FORMAT, DISPLAY_CONFIDENCE_DECIMALS};
use crate::error::PipelineError;
use crate::logic::audit::{AuditLog, AuditRecord};
use crate::logic::features::{encode, identity_fields, FeatureRecord, IdentityFields, RawSubmission};
use crate::logic::model::{RiskModel, Verdict};


/// Everything the caller may render for one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub verdict: Verdict,
    pub message: String,
    /// Confidence rounded for display, absent when the model gave none
    pub confidence_display: Option<String>,
    /// Echo of the accepted inputs
    pub identity: IdentityFields,
    pub features: FeatureRecord,
    pub recorded_at: String,
}

/// Stateless per request; shares the model and the audit log
#[derive(Clone)]
pub struct ReviewPipeline {
    model: Arc<RiskModel>,
    audit: Arc<AuditLog>,
}

impl ReviewPipeline {
    pub fn new(model: Arc<RiskModel>, audit: Arc<AuditLog>) -> Self {
        Self { model, audit }
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn review(&self, raw: &RawSubmission) -> Result<ReviewOutcome, PipelineError> {
        let features = encode(raw);
        let identity = identity_fields(raw);

        let verdict = self.model.predict(&features)?;

        let record = AuditRecord::new(identity, features, verdict);
        if let Err(e) = self.audit.append(&record) {
            log::error!("Audit append failed, verdict withheld: {}", e);
            return Err(e.into());
        }

        log::info!(
            "Review recorded: label={} confidence={:?}",
            verdict.class_label, verdict.confidence
        );

        Ok(ReviewOutcome {
            verdict,
            message: verdict.message().to_string(),
            confidence_display: verdict
                .confidence
                .map(|p| format!("{:.*}", DISPLAY_CONFIDENCE_DECIMALS, p)),
            recorded_at: record.timestamp.format(AUDIT_TIMESTAMP_FORMAT).to_string(),
            identity: record.identity,
            features: record.features,
        })
    }
}
