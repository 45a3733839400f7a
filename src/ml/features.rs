use crate::ml::models::FeatureRecord;
use crate::ml::schema::FeatureSchema;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Frozen standardisation statistics of one numeric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerStats {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

impl ScalerStats {
    /// Identity scaling, used before any data has been seen
    fn identity(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mean: 0.0,
            std: 1.0,
        }
    }

    /// Population mean/std over the non-missing values
    fn fit(name: &str, values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::identity(name);
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            name: name.to_string(),
            mean,
            // Constant column: encode as 0 instead of dividing by zero
            std: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        }
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Indicator columns of one categorical feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoding {
    pub name: String,

    /// Training-time-seen values, in vocabulary order
    pub categories: Vec<String>,
}

impl CategoryEncoding {
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == value)
    }
}

/// Feature transformer state.
///
/// Produces rows in schema order: scaled numerics, then one indicator block
/// per categorical feature, then binary pass-through columns. Unknown
/// categories and missing values encode as zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerState {
    numeric: Vec<ScalerStats>,
    categorical: Vec<CategoryEncoding>,
    binary: Vec<String>,
    is_fitted: bool,
}

impl TransformerState {
    /// Transformer that has seen no data: identity scaling, no indicator columns
    pub fn unfitted(schema: &FeatureSchema) -> Self {
        Self {
            numeric: schema
                .numeric
                .iter()
                .map(|f| ScalerStats::identity(f.name))
                .collect(),
            categorical: schema
                .categorical
                .iter()
                .map(|f| CategoryEncoding {
                    name: f.name.to_string(),
                    categories: Vec::new(),
                })
                .collect(),
            binary: schema.binary.iter().map(|s| s.to_string()).collect(),
            is_fitted: false,
        }
    }

    /// Learn scaling statistics and the seen vocabulary from training records
    pub fn fit(schema: &FeatureSchema, records: &[FeatureRecord]) -> Self {
        let numeric = schema
            .numeric
            .iter()
            .map(|f| {
                let values: Vec<f64> = records.iter().filter_map(|r| r.numeric(f.name)).collect();
                ScalerStats::fit(f.name, &values)
            })
            .collect();

        let categorical = schema
            .categorical
            .iter()
            .map(|f| {
                let categories = f
                    .vocabulary
                    .iter()
                    .filter(|v| records.iter().any(|r| r.category(f.name) == Some(**v)))
                    .map(|v| v.to_string())
                    .collect();

                CategoryEncoding {
                    name: f.name.to_string(),
                    categories,
                }
            })
            .collect();

        Self {
            numeric,
            categorical,
            binary: schema.binary.iter().map(|s| s.to_string()).collect(),
            is_fitted: true,
        }
    }

    /// Encode a batch of records, one row per record
    pub fn transform(&self, records: &[FeatureRecord]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), self.n_features()));

        for (record, mut row) in records.iter().zip(matrix.rows_mut()) {
            let mut offset = 0;

            for stats in &self.numeric {
                if let Some(value) = record.numeric(&stats.name) {
                    row[offset] = stats.scale(value);
                }
                offset += 1;
            }

            for encoding in &self.categorical {
                if let Some(idx) = record.category(&encoding.name).and_then(|v| encoding.index_of(v)) {
                    row[offset + idx] = 1.0;
                }
                offset += encoding.categories.len();
            }

            for name in &self.binary {
                row[offset] = f64::from(record.flag(name));
                offset += 1;
            }
        }

        matrix
    }

    /// Width of an encoded row
    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.n_indicator_columns() + self.binary.len()
    }

    pub fn n_indicator_columns(&self) -> usize {
        self.categorical.iter().map(|e| e.categories.len()).sum()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn numeric_stats(&self) -> &[ScalerStats] {
        &self.numeric
    }

    pub fn encodings(&self) -> &[CategoryEncoding] {
        &self.categorical
    }

    /// Human-readable column labels, e.g. `city=Pune`
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|s| s.name.clone()).collect();
        for encoding in &self.categorical {
            names.extend(
                encoding
                    .categories
                    .iter()
                    .map(|c| format!("{}={}", encoding.name, c)),
            );
        }
        names.extend(self.binary.iter().cloned());
        names
    }
}
