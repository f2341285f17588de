//! Column layouts of the known performance datasets.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which measurement is regressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Latency,
    Throughput,
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "latency" => Ok(Target::Latency),
            "throughput" => Ok(Target::Throughput),
            _ => Err(format!("unknown target {:?}", s)),
        }
    }
}

/// Where the features, label and error rate live in one dataset's CSV.
/// Column positions are 0-based and refer to the file's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSchema {
    pub name: &'static str,
    pub file_name: &'static str,
    /// Rows whose value here is not below the error threshold are dropped.
    pub filter_column: &'static str,
    /// Replaced by integer category codes before column selection.
    pub categorical: &'static [&'static str],
    /// Numbers carrying a lowercase unit suffix, e.g. `2g`.
    pub unit_suffixed: &'static [&'static str],
    pub features: &'static [usize],
    pub latency_label: usize,
    pub throughput_label: usize,
    /// Shuffle seed for cross-validation.
    pub seed: u64,
}

pub const APIM: DatasetSchema = DatasetSchema {
    name: "apim",
    file_name: "APIM_Dataset.csv",
    filter_column: "Error %",
    categorical: &["Name"],
    unit_suffixed: &[],
    features: &[0, 1, 2, 3],
    latency_label: 23,
    throughput_label: 29,
    seed: 42,
};

pub const BALLERINA: DatasetSchema = DatasetSchema {
    name: "ballerina",
    file_name: "Ballerina_Dataset.csv",
    filter_column: "Error %",
    categorical: &["Name"],
    unit_suffixed: &[],
    features: &[1, 3, 4, 5],
    latency_label: 9,
    throughput_label: 15,
    seed: 65,
};

pub const SPRINGBOOT: DatasetSchema = DatasetSchema {
    name: "springboot",
    file_name: "Springboot_Dataset.csv",
    filter_column: "error_rate",
    categorical: &["use case", "collector"],
    unit_suffixed: &["heap"],
    features: &[0, 1, 2, 3, 4],
    latency_label: 5,
    throughput_label: 11,
    seed: 42,
};

pub static SCHEMAS: &[DatasetSchema] = &[APIM, BALLERINA, SPRINGBOOT];

impl DatasetSchema {
    pub fn label(&self, target: Target) -> usize {
        match target {
            Target::Latency => self.latency_label,
            Target::Throughput => self.throughput_label,
        }
    }

    pub fn by_name(name: &str) -> Result<&'static DatasetSchema> {
        SCHEMAS
            .iter()
            .find(|schema| schema.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownSchema {
                name: name.to_string(),
            })
    }

    /// Picks the schema whose file name matches the last component of `path`.
    pub fn for_path(path: &Path) -> Result<&'static DatasetSchema> {
        let file_name = path.file_name().and_then(|name| name.to_str());
        SCHEMAS
            .iter()
            .find(|schema| Some(schema.file_name) == file_name)
            .ok_or_else(|| Error::UnknownDataset {
                path: path.display().to_string(),
            })
    }
}
