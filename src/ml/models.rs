use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Loosely typed value of a single request field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Missing,
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Missing,
            serde_json::Value::Bool(b) => FieldValue::Flag(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
            serde_json::Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Request record as received from a caller, before validation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, serde_json::Value>")]
pub struct RawRecord {
    fields: HashMap<String, FieldValue>,
}

impl From<HashMap<String, serde_json::Value>> for RawRecord {
    fn from(map: HashMap<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect(),
        }
    }
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object; any other JSON value is rejected
    pub fn from_json(source: &str) -> crate::error::Result<Self> {
        let map: HashMap<String, serde_json::Value> = serde_json::from_str(source)?;
        Ok(Self::from(map))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strictly typed feature value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
    Flag(u8),
}

/// Typed feature map consumed by the transformer.
///
/// Absent keys are missing values: numeric and categorical fields encode as
/// "no information", binary fields as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(mut self, name: &str, value: f64) -> Self {
        self.set(name, FeatureValue::Numeric(value));
        self
    }

    pub fn with_category(mut self, name: &str, value: &str) -> Self {
        self.set(name, FeatureValue::Category(value.to_string()));
        self
    }

    pub fn with_flag(mut self, name: &str, value: u8) -> Self {
        self.set(name, FeatureValue::Flag(value));
        self
    }

    pub fn set(&mut self, name: &str, value: FeatureValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FeatureValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FeatureValue::Category(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Binary value, defaulting to 0 when absent
    pub fn flag(&self, name: &str) -> u8 {
        match self.values.get(name) {
            Some(FeatureValue::Flag(v)) => *v,
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// A record that passed validation. Holds exactly the schema's required fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CleanRecord {
    features: FeatureRecord,
}

impl CleanRecord {
    /// Only the validator builds clean records
    pub(crate) fn new(features: FeatureRecord) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &FeatureRecord {
        &self.features
    }

    pub fn into_features(self) -> FeatureRecord {
        self.features
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.features.numeric(name)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.features.category(name)
    }

    pub fn flag(&self, name: &str) -> u8 {
        self.features.flag(name)
    }
}

/// Evaluation metrics of one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Coefficient of determination on the test partition
    pub r2: f64,

    /// Mean absolute error on the test partition
    pub mae: f64,

    /// Number of test rows
    pub n_test: usize,
}

/// Provenance of a fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training rows
    pub n_training_samples: usize,

    /// Width of the encoded feature vector
    pub n_features: usize,
}
