//! Form bodies posted by the browser.
//!
//! Every field defaults to an empty string so a missing field reaches the
//! flow's own validation instead of being rejected by the extractor.

use serde::Deserialize;

use crate::error::FlowError;
use crate::model::{FEATURE_COLUMNS, FEATURE_COUNT, FeatureVector};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    #[serde(rename = "N")]
    pub nitrogen: String,
    #[serde(rename = "P")]
    pub phosphorus: String,
    #[serde(rename = "K")]
    pub potassium: String,
    pub temperature: String,
    pub humidity: String,
    pub ph: String,
    pub rainfall: String,
}

impl PredictionForm {
    /// Raw field values in feature-column order.
    fn fields(&self) -> [&str; FEATURE_COUNT] {
        [
            self.nitrogen.as_str(),
            self.phosphorus.as_str(),
            self.potassium.as_str(),
            self.temperature.as_str(),
            self.humidity.as_str(),
            self.ph.as_str(),
            self.rainfall.as_str(),
        ]
    }

    /// Coerce every field to `f64`; the first failure names its field.
    pub fn parse(&self) -> Result<FeatureVector, FlowError> {
        let mut values = [0.0; FEATURE_COUNT];
        for ((slot, raw), field) in values.iter_mut().zip(self.fields()).zip(FEATURE_COLUMNS) {
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| FlowError::MalformedFeatureInput {
                    field,
                    value: raw.to_string(),
                })?;
        }
        Ok(FeatureVector::from_array(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(values: [&str; FEATURE_COUNT]) -> PredictionForm {
        let [n, p, k, temperature, humidity, ph, rainfall] = values.map(String::from);
        PredictionForm {
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    #[test]
    fn parses_trimmed_numbers() {
        let parsed = form(["90", " 42 ", "43", "20.87", "82.0", "6.5", "202.9"])
            .parse()
            .unwrap();
        assert_eq!(parsed.phosphorus, 42.0);
        assert_eq!(parsed.rainfall, 202.9);
    }

    #[test]
    fn reports_first_bad_field() {
        let err = form(["abc", "42", "43", "x", "82", "6.5", "202"])
            .parse()
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::MalformedFeatureInput { field: "N", ref value } if value == "abc"
        ));
    }

    #[test]
    fn empty_field_is_malformed() {
        let err = form(["1", "2", "3", "4", "5", "", "7"]).parse().unwrap_err();
        assert!(matches!(err, FlowError::MalformedFeatureInput { field: "ph", .. }));
    }
}
