//! Request validation.
//!
//! Presence is an all-or-nothing gate: when any required field is absent only
//! the "Missing field" messages are reported. Range, vocabulary and binary
//! checks are then accumulated so a caller sees every problem at once.

use crate::ml::models::{CleanRecord, FeatureRecord, FieldValue, RawRecord};
use crate::ml::schema::{FeatureSchema, SALARY_SCHEMA};
use std::fmt;

/// Ordered list of human-readable validation messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    fn push(&mut self, message: String) {
        self.0.push(message);
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(messages: Vec<String>) -> Self {
        Self(messages)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Validate a request against the salary schema
pub fn validate(raw: &RawRecord) -> Result<CleanRecord, ValidationErrors> {
    validate_with_schema(&SALARY_SCHEMA, raw)
}

/// Validate a request against an arbitrary schema
pub fn validate_with_schema(
    schema: &FeatureSchema,
    raw: &RawRecord,
) -> Result<CleanRecord, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for field in schema.required_fields() {
        if !raw.contains_key(field) {
            errors.push(format!("Missing field: {}", field));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut cleaned = FeatureRecord::new();

    for feature in schema.numeric {
        match raw.get(feature.name).and_then(parse_number) {
            Some(value) if (feature.min..=feature.max).contains(&value) => {
                cleaned = cleaned.with_numeric(feature.name, value);
            }
            Some(_) => errors.push(format!(
                "{} must be between {} and {}",
                feature.name, feature.min, feature.max
            )),
            None => errors.push(format!("{} must be numeric", feature.name)),
        }
    }

    for feature in schema.categorical {
        match raw.get(feature.name) {
            Some(FieldValue::Text(value)) if feature.allows(value) => {
                cleaned = cleaned.with_category(feature.name, value);
            }
            _ => errors.push(format!(
                "{} must be one of {:?}",
                feature.name, feature.vocabulary
            )),
        }
    }

    for &name in schema.binary {
        match raw.get(name).and_then(parse_integer) {
            Some(value @ (0 | 1)) => {
                cleaned = cleaned.with_flag(name, value as u8);
            }
            Some(_) => errors.push(format!("{} must be 0 or 1", name)),
            None => errors.push(format!("{} must be integer 0/1", name)),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CleanRecord::new(cleaned))
}

fn parse_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        FieldValue::Missing => None,
    }
}

fn parse_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
        FieldValue::Number(_) => None,
        FieldValue::Flag(b) => Some(i64::from(*b)),
        FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
        FieldValue::Missing => None,
    }
}
