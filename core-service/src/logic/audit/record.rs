//! Audit record and the fixed log schema.
//!
//! The column list below is frozen once a log file exists: every row of
//! every past and future deployment is aligned to it.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::{AUDIT_CONFIDENCE_DECIMALS, AUDIT_TIMESTAMP_FORMAT};
use crate::logic::features::layout::{
    COL_ADDR_MISMATCH_CARD, COL_ADDR_MISMATCH_MAILING, COL_AGE_20_29, COL_AGE_30_39,
    COL_AGE_40_49, COL_AGE_50_PLUS, COL_AGE_60_PLUS, COL_AGE_UNDER_20, COL_AGE_YEARS,
    COL_CARD_DELIVERY_METHOD, COL_GENDER, COL_ISP_NATIONALITY, FEATURE_COUNT,
};
use crate::logic::features::{FeatureRecord, IdentityFields};
use crate::logic::model::Verdict;

// ============================================================================
// SCHEMA
// ============================================================================

pub const COL_TIMESTAMP: &str = "時間";
pub const COL_NAME: &str = "姓名";
pub const COL_REGISTERED_ADDRESS: &str = "戶籍地址";
pub const COL_MAILING_ADDRESS: &str = "通訊地址";
pub const COL_CARD_DELIVERY_ADDRESS: &str = "金融卡收取地址";
pub const COL_PREDICTION: &str = "預測結果";
pub const COL_CONFIDENCE: &str = "預測機率";

/// Header row, in persisted column order
pub const AUDIT_HEADER: [&str; AUDIT_COLUMN_COUNT] = [
    COL_TIMESTAMP,
    COL_NAME,
    COL_REGISTERED_ADDRESS,
    COL_MAILING_ADDRESS,
    COL_CARD_DELIVERY_ADDRESS,
    COL_GENDER,
    COL_CARD_DELIVERY_METHOD,
    COL_AGE_UNDER_20,
    COL_AGE_20_29,
    COL_AGE_30_39,
    COL_AGE_40_49,
    COL_AGE_50_PLUS,
    COL_AGE_60_PLUS,
    COL_ADDR_MISMATCH_MAILING,
    COL_ADDR_MISMATCH_CARD,
    COL_ISP_NATIONALITY,
    COL_AGE_YEARS,
    COL_PREDICTION,
    COL_CONFIDENCE,
];

/// timestamp + 4 identity columns + features + label text + confidence
pub const AUDIT_COLUMN_COUNT: usize = 5 + FEATURE_COUNT + 2;

/// Position of the prediction text column
pub const PREDICTION_COLUMN: usize = AUDIT_COLUMN_COUNT - 2;

// ============================================================================
// RECORD
// ============================================================================

/// One immutable row per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: NaiveDateTime,
    pub identity: IdentityFields,
    pub features: FeatureRecord,
    pub verdict: Verdict,
}

impl AuditRecord {
    /// Stamp a record with the current local time
    pub fn new(identity: IdentityFields, features: FeatureRecord, verdict: Verdict) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            identity,
            features,
            verdict,
        }
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Cells in `AUDIT_HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(AUDIT_COLUMN_COUNT);
        row.push(self.timestamp.format(AUDIT_TIMESTAMP_FORMAT).to_string());
        row.push(self.identity.name.clone());
        row.push(self.identity.registered_address.clone());
        row.push(self.identity.mailing_address.clone());
        row.push(self.identity.card_delivery_address.clone());
        row.extend(self.features.to_cells());
        row.push(self.verdict.message().to_string());
        row.push(format_confidence(self.verdict.confidence));
        row
    }
}

/// Fixed 4-decimal text, or empty when absent
pub fn format_confidence(confidence: Option<f64>) -> String {
    confidence
        .map(|p| format!("{:.*}", AUDIT_CONFIDENCE_DECIMALS, p))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::FEATURE_LAYOUT;

    #[test]
    fn test_header_embeds_feature_layout() {
        assert_eq!(AUDIT_HEADER.len(), AUDIT_COLUMN_COUNT);
        assert_eq!(&AUDIT_HEADER[5..5 + FEATURE_COUNT], FEATURE_LAYOUT);
        assert_eq!(AUDIT_HEADER[PREDICTION_COLUMN], COL_PREDICTION);
    }

    #[test]
    fn test_confidence_formatting() {
        assert_eq!(format_confidence(Some(0.123456)), "0.1235");
        assert_eq!(format_confidence(Some(0.8)), "0.8000");
        assert_eq!(format_confidence(Some(1.0)), "1.0000");
        assert_eq!(format_confidence(None), "");
    }

    #[test]
    fn test_row_matches_header_width() {
        let record = AuditRecord::new(
            IdentityFields::default(),
            FeatureRecord::default(),
            Verdict::new(0, None).unwrap(),
        );
        assert_eq!(record.to_row().len(), AUDIT_COLUMN_COUNT);
    }
}
