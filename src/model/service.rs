//! Recommendation service: a random forest trained once at startup.

use log::{debug, info};

use super::dataset::Dataset;
use super::features::FeatureVector;
use super::forest::{self, Forest};
use super::search::{self, SearchGrid, SearchReport};
use crate::config::ModelConfig;
use crate::error::ModelError;

/// Read-only after construction; share it behind an `Arc`.
pub struct RecommendationService {
    forest: Forest,
    classes: Vec<String>,
    report: SearchReport,
}

impl RecommendationService {
    /// Load the configured dataset and train on it.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let dataset = Dataset::load(config.dataset_path())?;
        Self::train(&dataset, &SearchGrid::from_config(config))
    }

    /// Grid-search the forest parameters, then fit the winner on all rows.
    pub fn train(dataset: &Dataset, grid: &SearchGrid) -> Result<Self, ModelError> {
        if dataset.is_empty() {
            return Err(ModelError::InsufficientData("dataset has no rows".into()));
        }

        let classes = dataset.class_names();
        let targets = dataset
            .labels()
            .iter()
            .map(|label| class_index(&classes, label))
            .collect::<Result<Vec<u32>, _>>()?;
        let rows: Vec<Vec<f64>> = dataset.rows().iter().map(|r| r.to_vec()).collect();

        let report = search::grid_search(&rows, &targets, grid)?;
        let forest = forest::fit(&rows, &targets, report.best, grid.seed)?;

        info!(
            "Classifier ready: {} classes, {} trees, max depth {}",
            classes.len(),
            report.best.n_estimators,
            report.best.max_depth
        );

        Ok(Self {
            forest,
            classes,
            report,
        })
    }

    /// Recommend a crop label for one feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<String, ModelError> {
        let predicted = forest::predict(&self.forest, &[features.to_array().to_vec()])?;
        let index = predicted
            .first()
            .copied()
            .ok_or_else(|| ModelError::Prediction("classifier returned no output".into()))?;

        let label = self
            .classes
            .get(index as usize)
            .cloned()
            .ok_or_else(|| ModelError::Prediction(format!("unknown class index {index}")))?;

        debug!("Predicted {} for {:?}", label, features);
        Ok(label)
    }

    /// Every label the classifier can return, sorted.
    pub fn labels(&self) -> &[String] {
        &self.classes
    }

    pub fn search_report(&self) -> &SearchReport {
        &self.report
    }
}

fn class_index(classes: &[String], label: &str) -> Result<u32, ModelError> {
    classes
        .binary_search_by(|c| c.as_str().cmp(label))
        .map(|i| i as u32)
        .map_err(|_| ModelError::Training(format!("label {label:?} missing from class list")))
}
