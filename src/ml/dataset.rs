use crate::error::{AppError, Result};
use crate::ml::models::{FeatureRecord, FeatureValue};
use crate::ml::schema::FeatureSchema;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::io::Read;
use std::path::PathBuf;

/// Feature rows with one target per row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    records: Vec<FeatureRecord>,
    targets: Vec<f64>,
}

impl LabeledDataset {
    pub fn new(records: Vec<FeatureRecord>, targets: Vec<f64>) -> Result<Self> {
        if records.len() != targets.len() {
            return Err(AppError::Dataset(format!(
                "{} records but {} targets",
                records.len(),
                targets.len()
            )));
        }
        Ok(Self { records, targets })
    }

    /// Parse a CSV table with a header row.
    ///
    /// Feature columns missing from the header are treated as missing in every
    /// row; empty cells are missing values.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        schema: &FeatureSchema,
        target_column: &str,
    ) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| AppError::Dataset(format!("Unreadable CSV header: {}", e)))?
            .clone();

        let column = |name: &str| headers.iter().position(|h| h == name);

        let target_idx = column(target_column).ok_or_else(|| {
            AppError::Dataset(format!("Missing target column: {}", target_column))
        })?;

        let numeric: Vec<_> = schema.numeric.iter().map(|f| (f.name, column(f.name))).collect();
        let categorical: Vec<_> = schema
            .categorical
            .iter()
            .map(|f| (f.name, column(f.name)))
            .collect();
        let binary: Vec<_> = schema.binary.iter().map(|&name| (name, column(name))).collect();

        let mut records = Vec::new();
        let mut targets = Vec::new();

        for (idx, row) in csv_reader.records().enumerate() {
            // Line 1 is the header
            let line = idx + 2;
            let row = row.map_err(|e| AppError::Dataset(format!("Malformed CSV at line {}: {}", line, e)))?;
            let cell = |col: Option<usize>| col.and_then(|c| row.get(c)).filter(|s| !s.is_empty());

            let target = cell(Some(target_idx))
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|t| t.is_finite())
                .ok_or_else(|| {
                    AppError::Dataset(format!("Invalid {} at line {}", target_column, line))
                })?;

            let mut record = FeatureRecord::new();

            for &(name, col) in &numeric {
                if let Some(text) = cell(col) {
                    let value = text
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| invalid_cell(name, line, text))?;
                    record.set(name, FeatureValue::Numeric(value));
                }
            }

            for &(name, col) in &categorical {
                if let Some(text) = cell(col) {
                    record.set(name, FeatureValue::Category(text.to_string()));
                }
            }

            for &(name, col) in &binary {
                if let Some(text) = cell(col) {
                    let flag = match text.parse::<f64>() {
                        Ok(v) if v == 0.0 => 0,
                        Ok(v) if v == 1.0 => 1,
                        _ => return Err(invalid_cell(name, line, text)),
                    };
                    record.set(name, FeatureValue::Flag(flag));
                }
            }

            records.push(record);
            targets.push(target);
        }

        if records.is_empty() {
            return Err(AppError::Dataset("Dataset has no rows".to_string()));
        }

        Ok(Self { records, targets })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}

fn invalid_cell(column: &str, line: usize, text: &str) -> AppError {
    AppError::Dataset(format!("Invalid {} at line {}: {:?}", column, line, text))
}

/// Where a retrain reads its labeled data from
#[derive(Debug, Clone)]
pub enum DatasetSource {
    CsvFile(PathBuf),
    CsvText(String),
    Records(LabeledDataset),
}

impl DatasetSource {
    pub fn load(&self, schema: &FeatureSchema, target_column: &str) -> Result<LabeledDataset> {
        match self {
            DatasetSource::CsvFile(path) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    AppError::Dataset(format!("Cannot open dataset {}: {}", path.display(), e))
                })?;
                LabeledDataset::from_csv_reader(file, schema, target_column)
            }
            DatasetSource::CsvText(text) => {
                LabeledDataset::from_csv_reader(text.as_bytes(), schema, target_column)
            }
            DatasetSource::Records(dataset) => {
                if dataset.is_empty() {
                    return Err(AppError::Dataset("Dataset has no rows".to_string()));
                }
                Ok(dataset.clone())
            }
        }
    }
}

/// Size of the test partition for `n` rows
pub fn test_partition_size(n: usize, test_size: f64) -> usize {
    // Tolerate representation error, e.g. 0.3 * 10 = 3.0000000000000004
    (test_size * n as f64 - 1e-9).ceil().max(0.0) as usize
}

/// Deterministic shuffled split into `(train, test)`
pub fn train_test_split(
    dataset: &LabeledDataset,
    test_size: f64,
    seed: u64,
) -> Result<(LabeledDataset, LabeledDataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(AppError::Dataset(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n = dataset.len();
    let n_test = test_partition_size(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(AppError::Dataset(format!(
            "Cannot split {} rows with test_size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((dataset.subset(train_idx), dataset.subset(test_idx)))
}
