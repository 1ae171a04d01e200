//! Thin wrapper over the smartcore random forest.
//!
//! Labels are carried as dense `u32` class indices; the service owns the
//! mapping back to label strings.

use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::ModelError;

/// Fitted classifier type used throughout the crate.
pub type Forest = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// One point in the hyperparameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_estimators: u16,
    pub max_depth: u16,
}

fn to_matrix(rows: &[Vec<f64>]) -> DenseMatrix<f64> {
    DenseMatrix::from_2d_vec(&rows.to_vec())
}

/// Fit a forest on the given rows.
pub fn fit(
    rows: &[Vec<f64>],
    targets: &[u32],
    params: ForestParams,
    seed: u64,
) -> Result<Forest, ModelError> {
    if rows.is_empty() {
        return Err(ModelError::InsufficientData("no rows to fit".into()));
    }

    let parameters = RandomForestClassifierParameters::default()
        .with_n_trees(params.n_estimators)
        .with_max_depth(params.max_depth)
        .with_seed(seed);

    RandomForestClassifier::fit(&to_matrix(rows), &targets.to_vec(), parameters)
        .map_err(|e| ModelError::Training(e.to_string()))
}

/// Predict class indices for each row.
pub fn predict(forest: &Forest, rows: &[Vec<f64>]) -> Result<Vec<u32>, ModelError> {
    forest
        .predict(&to_matrix(rows))
        .map_err(|e| ModelError::Prediction(e.to_string()))
}
