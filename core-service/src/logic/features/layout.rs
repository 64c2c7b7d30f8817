//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The names below are the column labels the model was trained on. The
//! fitted transform looks features up by these names, and the audit log
//! uses them as its feature column headers.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Rename a column → increment FEATURE_VERSION
//!
//! A model bundle may pin the layout hash; a mismatch refuses to load.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

pub const COL_GENDER: &str = "性別(1:男；2:女）";
pub const COL_CARD_DELIVERY_METHOD: &str = "金融卡收取方式";
pub const COL_AGE_UNDER_20: &str = "20歲以下";
pub const COL_AGE_20_29: &str = "20-29歲";
pub const COL_AGE_30_39: &str = "30-39歲";
pub const COL_AGE_40_49: &str = "40-49歲";
pub const COL_AGE_50_PLUS: &str = "50歲以上";
pub const COL_AGE_60_PLUS: &str = "60歲以上";
pub const COL_ADDR_MISMATCH_MAILING: &str = "戶籍通訊地址不同";
pub const COL_ADDR_MISMATCH_CARD: &str = "戶籍金融卡收取地址不同";
pub const COL_ISP_NATIONALITY: &str = "ISP 國籍(1:本國;2:境外)";
pub const COL_AGE_YEARS: &str = "年齡";

/// Feature names in exact order they appear in the record
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    COL_GENDER,                // 0: gender code (1 male, 2 female)
    COL_CARD_DELIVERY_METHOD,  // 1: card delivery channel (categorical)
    COL_AGE_UNDER_20,          // 2-7: age band indicators
    COL_AGE_20_29,
    COL_AGE_30_39,
    COL_AGE_40_49,
    COL_AGE_50_PLUS,
    COL_AGE_60_PLUS,
    COL_ADDR_MISMATCH_MAILING, // 8: registered vs mailing address differ
    COL_ADDR_MISMATCH_CARD,    // 9: registered vs card delivery address differ
    COL_ISP_NATIONALITY,       // 10: ISP nationality (1 domestic, 2 foreign)
    COL_AGE_YEARS,             // 11: age in years
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 12;

/// The six age-band columns, in fixed band order
pub const AGE_BAND_COLUMNS: [&str; 6] = [
    COL_AGE_UNDER_20,
    COL_AGE_20_29,
    COL_AGE_30_39,
    COL_AGE_40_49,
    COL_AGE_50_PLUS,
    COL_AGE_60_PLUS,
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches against a model bundle
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
