//! Feature vector for a single prediction request.

/// Number of numeric inputs the classifier expects.
pub const FEATURE_COUNT: usize = 7;

/// Dataset column names, in the order the classifier consumes them.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Name of the target column in the training dataset.
pub const LABEL_COLUMN: &str = "label";

/// Soil and climate measurements for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}
