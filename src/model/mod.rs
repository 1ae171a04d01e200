//! Crop recommendation model
//!
//! Loads the labeled dataset, searches random-forest hyperparameters with
//! cross-validation, and serves predictions from the final fitted forest.

pub mod dataset;
pub mod features;
pub mod forest;
pub mod search;
pub mod service;

pub use dataset::Dataset;
pub use features::{FEATURE_COLUMNS, FEATURE_COUNT, FeatureVector};
pub use search::{SearchGrid, SearchReport};
pub use service::RecommendationService;
