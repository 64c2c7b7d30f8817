use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::layout::{
    AGE_BAND_COLUMNS, COL_ADDR_MISMATCH_CARD, COL_ADDR_MISMATCH_MAILING, COL_AGE_YEARS,
    COL_CARD_DELIVERY_METHOD, COL_GENDER, COL_ISP_NATIONALITY,
};

// ============================================================================
// RAW SUBMISSION
// ============================================================================

/// One form post: field name → raw string value.
///
/// Unknown fields are carried but never read by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSubmission(HashMap<String, String>);

impl RawSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// First present value among `fields`, in order
    pub fn first_of(&self, fields: &[&str]) -> Option<&str> {
        fields.iter().find_map(|f| self.get(f))
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for RawSubmission {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawSubmission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// AGE BAND
// ============================================================================

/// The single age band picked in the form selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "20歲以下")]
    Under20,
    #[serde(rename = "20-29歲")]
    From20To29,
    #[serde(rename = "30-39歲")]
    From30To39,
    #[serde(rename = "40-49歲")]
    From40To49,
    #[serde(rename = "50歲以上")]
    Over50,
    #[serde(rename = "60歲以上")]
    Over60,
}

impl AgeBand {
    /// All bands in fixed indicator order
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Under20,
        AgeBand::From20To29,
        AgeBand::From30To39,
        AgeBand::From40To49,
        AgeBand::Over50,
        AgeBand::Over60,
    ];

    /// Position of this band's indicator
    pub fn index(self) -> usize {
        match self {
            AgeBand::Under20 => 0,
            AgeBand::From20To29 => 1,
            AgeBand::From30To39 => 2,
            AgeBand::From40To49 => 3,
            AgeBand::Over50 => 4,
            AgeBand::Over60 => 5,
        }
    }

    /// Selector label, identical to the band's feature column name
    pub fn label(self) -> &'static str {
        AGE_BAND_COLUMNS[self.index()]
    }

    /// Exact label match; anything else is no band
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.label() == label)
    }
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// A single feature cell as the transform sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureValue<'a> {
    Int(i64),
    Text(&'a str),
}

/// The fixed-schema input of the trained model.
///
/// The age band is held as one optional band, so at most one of the six
/// indicators can ever be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub gender_code: i64,
    pub card_delivery_method: String,
    pub age_band: Option<AgeBand>,
    pub addr_mismatch_registered_vs_mailing: i64,
    pub addr_mismatch_registered_vs_card: i64,
    pub isp_nationality_code: i64,
    pub age_years: i64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            gender_code: 1,
            card_delivery_method: String::new(),
            age_band: None,
            addr_mismatch_registered_vs_mailing: 0,
            addr_mismatch_registered_vs_card: 0,
            isp_nationality_code: 1,
            age_years: 0,
        }
    }
}

impl FeatureRecord {
    /// The six 0/1 band indicators in fixed band order
    pub fn age_band_indicators(&self) -> [i64; 6] {
        let mut indicators = [0; 6];
        if let Some(band) = self.age_band {
            indicators[band.index()] = 1;
        }
        indicators
    }

    /// Look a feature up by its training column name
    pub fn value(&self, column: &str) -> Option<FeatureValue<'_>> {
        if let Some(pos) = AGE_BAND_COLUMNS.iter().position(|&c| c == column) {
            return Some(FeatureValue::Int(self.age_band_indicators()[pos]));
        }

        let value = match column {
            COL_GENDER => FeatureValue::Int(self.gender_code),
            COL_CARD_DELIVERY_METHOD => FeatureValue::Text(&self.card_delivery_method),
            COL_ADDR_MISMATCH_MAILING => FeatureValue::Int(self.addr_mismatch_registered_vs_mailing),
            COL_ADDR_MISMATCH_CARD => FeatureValue::Int(self.addr_mismatch_registered_vs_card),
            COL_ISP_NATIONALITY => FeatureValue::Int(self.isp_nationality_code),
            COL_AGE_YEARS => FeatureValue::Int(self.age_years),
            _ => return None,
        };
        Some(value)
    }

    /// All features as text cells, in layout order
    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(super::layout::FEATURE_COUNT);
        cells.push(self.gender_code.to_string());
        cells.push(self.card_delivery_method.clone());
        cells.extend(self.age_band_indicators().iter().map(i64::to_string));
        cells.push(self.addr_mismatch_registered_vs_mailing.to_string());
        cells.push(self.addr_mismatch_registered_vs_card.to_string());
        cells.push(self.isp_nationality_code.to_string());
        cells.push(self.age_years.to_string());
        cells
    }
}

// ============================================================================
// IDENTITY FIELDS
// ============================================================================

/// Free-text fields kept for traceability only (never model input)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFields {
    pub name: String,
    pub registered_address: String,
    pub mailing_address: String,
    pub card_delivery_address: String,
}
