//! Labeled training data loaded from CSV.
//!
//! Feature columns are located by name (case-insensitive), so column order in
//! the file does not matter. Columns that are neither a feature nor the label
//! are skipped with a warning.

use log::{info, warn};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::features::{FEATURE_COLUMNS, FEATURE_COUNT, LABEL_COLUMN};
use crate::error::ModelError;

/// Feature rows and their labels, index-aligned.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<[f64; FEATURE_COUNT]>,
    labels: Vec<String>,
}

impl Dataset {
    /// Load a dataset file. Any I/O or parse problem is reported as
    /// [`ModelError::StartupDataUnavailable`].
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|e| unavailable(path, e.to_string()))?;
        let dataset = Self::from_reader(file, path)?;
        info!(
            "Loaded dataset {}: {} rows, {} labels",
            path.display(),
            dataset.len(),
            dataset.class_names().len()
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader; `origin` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, ModelError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| unavailable(origin, e.to_string()))?
            .clone();

        let mut feature_idx = [0usize; FEATURE_COUNT];
        for (slot, name) in feature_idx.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| unavailable(origin, format!("missing column {name}")))?;
        }
        let label_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(LABEL_COLUMN))
            .ok_or_else(|| unavailable(origin, format!("missing column {LABEL_COLUMN}")))?;

        for (i, header) in headers.iter().enumerate() {
            if i != label_idx && !feature_idx.contains(&i) {
                warn!("Ignoring dataset column {header:?}");
            }
        }

        let mut dataset = Dataset::default();
        for (line, record) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based numbering
            let line = line + 2;
            let record = record.map_err(|e| unavailable(origin, e.to_string()))?;

            let mut row = [0.0; FEATURE_COUNT];
            for (k, &col) in feature_idx.iter().enumerate() {
                let raw = record.get(col).unwrap_or_default();
                row[k] = raw.parse().map_err(|_| {
                    unavailable(
                        origin,
                        format!("line {line}: {} is not a number: {raw:?}", FEATURE_COLUMNS[k]),
                    )
                })?;
            }

            let label = record.get(label_idx).unwrap_or_default();
            if label.is_empty() {
                return Err(unavailable(origin, format!("line {line}: empty label")));
            }

            dataset.push(row, label.to_string());
        }

        Ok(dataset)
    }

    pub fn push(&mut self, row: [f64; FEATURE_COUNT], label: String) {
        self.rows.push(row);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[[f64; FEATURE_COUNT]] {
        &self.rows
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Distinct labels in sorted order.
    pub fn class_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn unavailable(path: &Path, reason: String) -> ModelError {
    ModelError::StartupDataUnavailable {
        path: path.to_path_buf(),
        reason,
    }
}
