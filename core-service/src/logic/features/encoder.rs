//! Feature Encoder
//!
//! RawSubmission → FeatureRecord. Never fails: every field has a default and
//! bad numbers degrade to it. Pure function of its input.

use super::coerce::{check_domain, parse_with_default};
use super::layout::{
    COL_ADDR_MISMATCH_CARD, COL_ADDR_MISMATCH_MAILING, COL_AGE_YEARS, COL_CARD_DELIVERY_METHOD,
    COL_GENDER, COL_ISP_NATIONALITY,
};
use super::record::{AgeBand, FeatureRecord, IdentityFields, RawSubmission};

// ============================================================================
// FORM FIELD NAMES
// ============================================================================

/// Gender accepts the training column label or the short label
pub const FIELD_GENDER: &[&str] = &[COL_GENDER, "性別"];
pub const FIELD_CARD_DELIVERY_METHOD: &[&str] = &[COL_CARD_DELIVERY_METHOD];
/// Single selector carrying one age-band label
pub const FIELD_AGE_BAND: &str = "年齡區間";
pub const FIELD_ADDR_MISMATCH_MAILING: &[&str] = &[COL_ADDR_MISMATCH_MAILING];
pub const FIELD_ADDR_MISMATCH_CARD: &[&str] = &[COL_ADDR_MISMATCH_CARD];
pub const FIELD_ISP_NATIONALITY: &[&str] = &[COL_ISP_NATIONALITY, "ISP 國籍"];
pub const FIELD_AGE_YEARS: &[&str] = &[COL_AGE_YEARS];

pub const FIELD_NAME: &str = "姓名";
pub const FIELD_REGISTERED_ADDRESS: &str = "戶籍地址";
pub const FIELD_MAILING_ADDRESS: &str = "通訊地址";
pub const FIELD_CARD_DELIVERY_ADDRESS: &str = "金融卡收取地址";

const BINARY_DOMAIN: &[i64] = &[0, 1];
const CODE_DOMAIN: &[i64] = &[1, 2];

// ============================================================================
// ENCODING
// ============================================================================

/// Map a raw submission onto the model's feature record.
pub fn encode(raw: &RawSubmission) -> FeatureRecord {
    let defaults = FeatureRecord::default();

    let gender_code = int_field(raw, FIELD_GENDER, defaults.gender_code, CODE_DOMAIN);
    let addr_mismatch_registered_vs_mailing = int_field(
        raw,
        FIELD_ADDR_MISMATCH_MAILING,
        defaults.addr_mismatch_registered_vs_mailing,
        BINARY_DOMAIN,
    );
    let addr_mismatch_registered_vs_card = int_field(
        raw,
        FIELD_ADDR_MISMATCH_CARD,
        defaults.addr_mismatch_registered_vs_card,
        BINARY_DOMAIN,
    );
    let isp_nationality_code =
        int_field(raw, FIELD_ISP_NATIONALITY, defaults.isp_nationality_code, CODE_DOMAIN);
    let age_years = parse_with_default(
        FIELD_AGE_YEARS[0],
        raw.first_of(FIELD_AGE_YEARS),
        defaults.age_years,
    );

    FeatureRecord {
        gender_code,
        card_delivery_method: text_field(raw.first_of(FIELD_CARD_DELIVERY_METHOD)),
        age_band: encode_age_band(raw.get(FIELD_AGE_BAND).unwrap_or("")),
        addr_mismatch_registered_vs_mailing,
        addr_mismatch_registered_vs_card,
        isp_nationality_code,
        age_years,
    }
}

/// Pick the identity fields stored alongside the features in the audit log.
pub fn identity_fields(raw: &RawSubmission) -> IdentityFields {
    IdentityFields {
        name: text_field(raw.get(FIELD_NAME)),
        registered_address: text_field(raw.get(FIELD_REGISTERED_ADDRESS)),
        mailing_address: text_field(raw.get(FIELD_MAILING_ADDRESS)),
        card_delivery_address: text_field(raw.get(FIELD_CARD_DELIVERY_ADDRESS)),
    }
}

/// Exact label match. Unknown or empty labels leave every indicator at 0.
pub fn encode_age_band(label: &str) -> Option<AgeBand> {
    let band = AgeBand::from_label(label);
    if band.is_none() && !label.is_empty() {
        log::debug!("Unrecognised age band label {:?}, no band set", label);
    }
    band
}

fn int_field(raw: &RawSubmission, keys: &[&str], default: i64, domain: &[i64]) -> i64 {
    let value = parse_with_default(keys[0], raw.first_of(keys), default);
    check_domain(keys[0], value, domain);
    value
}

fn text_field(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
