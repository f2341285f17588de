use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unknown dataset: {path}")]
    UnknownDataset { path: String },

    #[error("unknown schema: {name}")]
    UnknownSchema { name: String },

    #[error("column {column} not found")]
    MissingColumn { column: String },

    #[error("column {column} is not numeric")]
    NonNumericColumn { column: String },

    #[error("dataset has no rows left after filtering")]
    EmptyDataset,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("train the model first")]
    NotTrained,

    #[error("covariance matrix is not positive definite (jitter {jitter:e})")]
    NotPositiveDefinite { jitter: f64 },

    #[error("invalid prior: {0}")]
    InvalidPrior(String),

    #[error("objective is not finite at the starting point")]
    NonFiniteObjective,

    #[error("cannot split {rows} rows into {folds} folds")]
    InvalidFolds { rows: usize, folds: usize },
}
