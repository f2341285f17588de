//! Gaussian-process regression over service performance measurements,
//! scored by k-fold cross-validation.

pub mod config;
pub mod cv;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod gp;
pub mod load_csv;
pub mod loader;
pub mod metrics;
pub mod scaler;
pub mod schema;
pub mod time;
pub mod util;

pub use config::ExperimentConfig;
pub use cv::{CrossValidation, CvReport, FoldMetrics};
pub use error::{Error, Result};
pub use evaluate::{eval_bayesian_rbf, Evaluation};
pub use gp::{BayesianRbfRegression, Kernel, ModelConfig, Prediction};
pub use loader::{load_dataset, LoadOptions, LoadedDataset};
pub use scaler::MinMaxScaler;
pub use schema::{DatasetSchema, Target};
