//! String → integer coercion with declared defaults.
//!
//! Contract of [`parse_with_default`]:
//! - missing field → `default`, silently
//! - present but not a base-10 integer (after trimming) → `default`, and a
//!   debug line records the fallback
//! - full-width digits and signs (common IME input) parse like ASCII
//! - otherwise the parsed value, even if it is outside the feature's domain

/// Parse `raw_value` as an integer or fall back to `default`.
///
/// `field` only names the field in the fallback log line.
pub fn parse_with_default(field: &str, raw_value: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw_value else {
        return default;
    };

    match to_ascii_digits(raw.trim()).parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            log::debug!(
                "CoercionFallback: field '{}' value {:?} is not an integer, using default {}",
                field, raw, default
            );
            default
        }
    }
}

/// Fold full-width digits (U+FF10..U+FF19) and signs onto ASCII
fn to_ascii_digits(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '＋' => '+',
            '－' => '-',
            other => other,
        })
        .collect()
}

/// Warn when a parsed value lies outside its declared domain.
///
/// The value is kept; the fitted transform is the authority on what it
/// accepts.
pub fn check_domain(field: &str, value: i64, domain: &[i64]) {
    if !domain.contains(&value) {
        log::warn!(
            "Field '{}' value {} is outside its domain {:?}",
            field, value, domain
        );
    }
}
