//! Gaussian-process regression with MAP-estimated kernel hyperparameters.

mod kernel;
mod linalg;
mod model;
mod optimize;
mod prior;

pub use kernel::Kernel;
pub use model::{BayesianRbfRegression, Hyperparameters, ModelConfig, Prediction};
pub use optimize::{Bfgs, Minimum};
pub use prior::{Prior, Priors};
