//! Encoder tests: defaults, band one-hot, idempotence.

use super::encoder::{encode, identity_fields};
use super::layout::{AGE_BAND_COLUMNS, COL_AGE_30_39, FEATURE_COUNT, FEATURE_LAYOUT};
use super::record::{AgeBand, FeatureRecord, FeatureValue, RawSubmission};

fn submission(fields: &[(&str, &str)]) -> RawSubmission {
    fields.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn test_empty_submission_uses_declared_defaults() {
    let record = encode(&RawSubmission::new());

    assert_eq!(record, FeatureRecord::default());
    assert_eq!(record.gender_code, 1);
    assert_eq!(record.card_delivery_method, "");
    assert_eq!(record.age_band_indicators(), [0; 6]);
    assert_eq!(record.addr_mismatch_registered_vs_mailing, 0);
    assert_eq!(record.addr_mismatch_registered_vs_card, 0);
    assert_eq!(record.isp_nationality_code, 1);
    assert_eq!(record.age_years, 0);
}

#[test]
fn test_short_form_scenario() {
    let raw = submission(&[("性別", "2"), ("年齡區間", "30-39歲"), ("年齡", "35")]);
    let record = encode(&raw);

    assert_eq!(record.gender_code, 2);
    assert_eq!(record.age_band, Some(AgeBand::From30To39));
    assert_eq!(record.age_band_indicators(), [0, 0, 1, 0, 0, 0]);
    assert_eq!(record.age_years, 35);
    assert_eq!(record.card_delivery_method, "");
    assert_eq!(record.addr_mismatch_registered_vs_mailing, 0);
    assert_eq!(record.addr_mismatch_registered_vs_card, 0);
    assert_eq!(record.isp_nationality_code, 1);
}

#[test]
fn test_full_form_keys() {
    let raw = submission(&[
        ("性別(1:男；2:女）", "2"),
        ("金融卡收取方式", "  郵寄 "),
        ("年齡區間", "60歲以上"),
        ("戶籍通訊地址不同", "1"),
        ("戶籍金融卡收取地址不同", "1"),
        ("ISP 國籍(1:本國;2:境外)", "2"),
        ("年齡", "67"),
        ("unrelated", "ignored"),
    ]);
    let record = encode(&raw);

    assert_eq!(record.gender_code, 2);
    assert_eq!(record.card_delivery_method, "郵寄");
    assert_eq!(record.age_band_indicators(), [0, 0, 0, 0, 0, 1]);
    assert_eq!(record.addr_mismatch_registered_vs_mailing, 1);
    assert_eq!(record.addr_mismatch_registered_vs_card, 1);
    assert_eq!(record.isp_nationality_code, 2);
    assert_eq!(record.age_years, 67);
}

#[test]
fn test_primary_key_wins_over_alias() {
    let raw = submission(&[("性別(1:男；2:女）", "1"), ("性別", "2")]);
    assert_eq!(encode(&raw).gender_code, 1);
}

#[test]
fn test_each_band_sets_exactly_one_indicator() {
    for (i, label) in AGE_BAND_COLUMNS.iter().enumerate() {
        let record = encode(&submission(&[("年齡區間", *label)]));
        let indicators = record.age_band_indicators();

        assert_eq!(indicators.iter().sum::<i64>(), 1, "band {}", label);
        assert_eq!(indicators[i], 1, "band {}", label);
    }
}

#[test]
fn test_unknown_band_sets_none() {
    for label in ["", "30-39", "30－39歲", " 30-39歲", "unknown"] {
        let record = encode(&submission(&[("年齡區間", label)]));
        assert_eq!(record.age_band_indicators(), [0; 6], "label {:?}", label);
    }
}

#[test]
fn test_malformed_numbers_fall_back() {
    let raw = submission(&[
        ("性別", "female"),
        ("戶籍通訊地址不同", "yes"),
        ("戶籍金融卡收取地址不同", ""),
        ("ISP 國籍", "1.5"),
        ("年齡", "thirty"),
    ]);
    let record = encode(&raw);

    assert_eq!(record.gender_code, 1);
    assert_eq!(record.addr_mismatch_registered_vs_mailing, 0);
    assert_eq!(record.addr_mismatch_registered_vs_card, 0);
    assert_eq!(record.isp_nationality_code, 1);
    assert_eq!(record.age_years, 0);
}

#[test]
fn test_full_width_numbers_are_accepted() {
    let record = encode(&submission(&[("年齡", "３５"), ("性別", "２"), ("ISP 國籍", "２")]));

    assert_eq!(record.age_years, 35);
    assert_eq!(record.gender_code, 2);
    assert_eq!(record.isp_nationality_code, 2);
}

#[test]
fn test_out_of_domain_values_are_kept() {
    let record = encode(&submission(&[("性別", "3")]));
    assert_eq!(record.gender_code, 3);
}

#[test]
fn test_encoding_is_idempotent() {
    let raw = submission(&[
        ("性別", "2"),
        ("金融卡收取方式", "親取"),
        ("年齡區間", "20-29歲"),
        ("年齡", "bad"),
    ]);
    assert_eq!(encode(&raw), encode(&raw));
}

#[test]
fn test_value_lookup_by_column_name() {
    let record = encode(&submission(&[("年齡區間", "30-39歲"), ("金融卡收取方式", "郵寄")]));

    assert_eq!(record.value(COL_AGE_30_39), Some(FeatureValue::Int(1)));
    assert_eq!(record.value("金融卡收取方式"), Some(FeatureValue::Text("郵寄")));
    assert_eq!(record.value("no such column"), None);
    for column in FEATURE_LAYOUT {
        assert!(record.value(column).is_some(), "column {}", column);
    }
}

#[test]
fn test_cells_follow_layout() {
    let record = encode(&submission(&[("年齡區間", "20歲以下"), ("年齡", "19")]));
    let cells = record.to_cells();

    assert_eq!(cells.len(), FEATURE_COUNT);
    assert_eq!(cells[2], "1");
    assert_eq!(cells[11], "19");
}

#[test]
fn test_identity_fields_are_trimmed() {
    let raw = submission(&[("姓名", " 王小明 "), ("戶籍地址", "台北市, 信義區")]);
    let identity = identity_fields(&raw);

    assert_eq!(identity.name, "王小明");
    assert_eq!(identity.registered_address, "台北市, 信義區");
    assert_eq!(identity.mailing_address, "");
}
