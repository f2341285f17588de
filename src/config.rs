//! Experiment configuration (TOML)

use crate::cv::{CrossValidation, DEFAULT_FOLDS};
use crate::error::Result;
use crate::gp::ModelConfig;
use crate::loader::{LoadOptions, ERROR_THRESHOLD};
use crate::schema::{DatasetSchema, Target};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub dataset: PathBuf,
    /// Schema name; resolved from the dataset file name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub target: Target,
    pub folds: usize,
    /// Overrides the schema's shuffle seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub error_threshold: f64,
    pub model: ModelConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            dataset: PathBuf::from("Datasets/Ballerina_Dataset.csv"),
            schema: None,
            target: Target::Latency,
            folds: DEFAULT_FOLDS,
            seed: None,
            error_threshold: ERROR_THRESHOLD,
            model: ModelConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ExperimentConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn resolve_schema(&self) -> Result<&'static DatasetSchema> {
        match &self.schema {
            Some(name) => DatasetSchema::by_name(name),
            None => DatasetSchema::for_path(&self.dataset),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            target: self.target,
            error_threshold: self.error_threshold,
        }
    }

    pub fn cross_validation(&self) -> CrossValidation {
        CrossValidation {
            folds: self.folds,
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gp::Kernel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_fixed_experiment() {
        let config = ExperimentConfig::default();
        assert_eq!(config.folds, 10);
        assert_eq!(config.error_threshold, 5.0);
        assert_eq!(config.model.samples, 2000);
        assert_eq!(config.model.uncertainty_scale, 0.001);
        assert_eq!(config.resolve_schema().unwrap().seed, 65);
    }

    #[test]
    fn load_partial_toml() {
        let toml_content = r#"
dataset = "Datasets/Springboot_Dataset.csv"
target = "throughput"
folds = 5

[model]
kernel = "exp_quad"
samples = 500
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert_eq!(config.target, Target::Throughput);
        assert_eq!(config.folds, 5);
        assert_eq!(config.model.kernel, Kernel::ExpQuad);
        assert_eq!(config.model.samples, 500);
        assert_eq!(config.model.uncertainty_scale, 0.001);
        assert_eq!(config.resolve_schema().unwrap().name, "springboot");
        assert_eq!(config.load_options().target, Target::Throughput);
    }

    #[test]
    fn explicit_schema_wins_over_file_name() {
        let config = ExperimentConfig {
            dataset: PathBuf::from("data/renamed.csv"),
            schema: Some("apim".into()),
            ..ExperimentConfig::default()
        };
        assert_eq!(config.resolve_schema().unwrap().name, "apim");

        let config = ExperimentConfig {
            schema: None,
            ..config
        };
        assert!(matches!(
            config.resolve_schema(),
            Err(Error::UnknownDataset { .. })
        ));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"folds = \"ten\"").unwrap();
        assert!(matches!(
            ExperimentConfig::load(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ExperimentConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: ExperimentConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
