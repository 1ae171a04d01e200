//! Hyperparameter grid search with stratified k-fold cross-validation.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use super::forest::{self, ForestParams};
use crate::config::ModelConfig;
use crate::error::ModelError;

/// Search space and cross-validation settings.
#[derive(Debug, Clone)]
pub struct SearchGrid {
    pub n_estimators: Vec<u16>,
    pub max_depth: Vec<u16>,
    pub cv_folds: usize,
    pub seed: u64,
}

/// Mean cross-validated accuracy of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub mean_accuracy: f64,
}

/// Outcome of a full grid search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best: ForestParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

impl SearchGrid {
    /// Grid values are range-checked by `ServerConfig::validate`; anything
    /// above `u16::MAX` is clamped here.
    pub fn from_config(config: &ModelConfig) -> Self {
        fn narrow(values: &[u32]) -> Vec<u16> {
            values
                .iter()
                .map(|v| u16::try_from(*v).unwrap_or(u16::MAX))
                .collect()
        }

        Self {
            n_estimators: narrow(&config.n_estimators),
            max_depth: narrow(&config.max_depth),
            cv_folds: config.cv_folds,
            seed: config.seed,
        }
    }

    /// Every (n_estimators, max_depth) pair, ensemble size varying slowest.
    pub fn candidates(&self) -> Vec<ForestParams> {
        self.n_estimators
            .iter()
            .flat_map(|&n_estimators| {
                self.max_depth.iter().map(move |&max_depth| ForestParams {
                    n_estimators,
                    max_depth,
                })
            })
            .collect()
    }
}

/// Split sample indices into `k` folds keeping class proportions roughly equal.
///
/// Indices are shuffled within each class, then dealt round-robin, so fold
/// sizes differ by at most one.
pub fn stratified_folds(targets: &[u32], k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut by_class: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, &class) in targets.iter().enumerate() {
        by_class.entry(class).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k];
    let mut next = 0;
    for indices in by_class.values_mut() {
        indices.shuffle(&mut rng);
        for &i in indices.iter() {
            folds[next % k].push(i);
            next += 1;
        }
    }
    folds
}

/// Score every candidate and pick the best; ties keep the earlier candidate.
pub fn grid_search(
    rows: &[Vec<f64>],
    targets: &[u32],
    grid: &SearchGrid,
) -> Result<SearchReport, ModelError> {
    if grid.cv_folds < 2 {
        return Err(ModelError::InsufficientData(format!(
            "cv_folds must be at least 2, got {}",
            grid.cv_folds
        )));
    }
    if rows.len() < grid.cv_folds {
        return Err(ModelError::InsufficientData(format!(
            "{} rows cannot fill {} folds",
            rows.len(),
            grid.cv_folds
        )));
    }

    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(ModelError::InsufficientData("empty search grid".into()));
    }

    let folds = stratified_folds(targets, grid.cv_folds, grid.seed);
    info!(
        "Grid search over {} candidates with {}-fold cross-validation",
        candidates.len(),
        grid.cv_folds
    );

    let mut scores = Vec::with_capacity(candidates.len());
    let mut best: Option<CandidateScore> = None;
    for params in candidates {
        let mean_accuracy = cross_validate(rows, targets, &folds, params, grid.seed)?;
        debug!(
            "n_estimators={} max_depth={} accuracy={:.4}",
            params.n_estimators, params.max_depth, mean_accuracy
        );

        let score = CandidateScore {
            params,
            mean_accuracy,
        };
        if best.is_none_or(|b| mean_accuracy > b.mean_accuracy) {
            best = Some(score);
        }
        scores.push(score);
    }

    let best = best.ok_or_else(|| ModelError::Training("no candidate was scored".into()))?;
    info!(
        "Best parameters: n_estimators={} max_depth={} (accuracy {:.4})",
        best.params.n_estimators, best.params.max_depth, best.mean_accuracy
    );

    Ok(SearchReport {
        best: best.params,
        best_score: best.mean_accuracy,
        candidates: scores,
    })
}

/// Mean held-out accuracy of one candidate across all folds.
fn cross_validate(
    rows: &[Vec<f64>],
    targets: &[u32],
    folds: &[Vec<usize>],
    params: ForestParams,
    seed: u64,
) -> Result<f64, ModelError> {
    let mut total = 0.0;
    for (f, held_out) in folds.iter().enumerate() {
        let (train_rows, train_targets): (Vec<Vec<f64>>, Vec<u32>) = folds
            .iter()
            .enumerate()
            .filter(|(g, _)| *g != f)
            .flat_map(|(_, fold)| fold.iter())
            .map(|&i| (rows[i].clone(), targets[i]))
            .unzip();

        let test_rows: Vec<Vec<f64>> = held_out.iter().map(|&i| rows[i].clone()).collect();

        let model = forest::fit(&train_rows, &train_targets, params, seed)?;
        let predicted = forest::predict(&model, &test_rows)?;

        let correct = predicted
            .iter()
            .zip(held_out)
            .filter(|(p, i)| **p == targets[**i])
            .count();
        total += correct as f64 / held_out.len() as f64;
    }

    Ok(total / folds.len() as f64)
}
