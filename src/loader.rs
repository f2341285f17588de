use crate::dataset::{Column, Table};
use crate::error::{Error, Result};
use crate::load_csv::parse_f64;
use crate::scaler::MinMaxScaler;
use crate::schema::{DatasetSchema, Target};
use crate::time::timed;
use crate::util::compare_f64;
use ndarray::{Array1, Array2};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

pub const ERROR_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub target: Target,
    pub error_threshold: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            target: Target::Latency,
            error_threshold: ERROR_THRESHOLD,
        }
    }
}

/// Scaled features and labels of one dataset, ready for cross-validation.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
    pub seed: u64,
    /// The scaler `features` went through; pass it to later loads.
    pub scaler: MinMaxScaler,
}

pub fn load_dataset(
    path: &Path,
    schema: &DatasetSchema,
    options: &LoadOptions,
    scaler: Option<&MinMaxScaler>,
) -> Result<LoadedDataset> {
    let table = timed(format!("read {}", path.display()), || Table::from_path(path))?;
    prepare(table, schema, options, scaler)
}

/// Filters, encodes, selects and scales an already parsed table.
pub fn prepare(
    mut table: Table,
    schema: &DatasetSchema,
    options: &LoadOptions,
    scaler: Option<&MinMaxScaler>,
) -> Result<LoadedDataset> {
    let total = table.num_rows();
    let error_rates = filter_values(&table.columns[table.position(schema.filter_column)?]);
    table.retain_rows(|i| error_rates[i] < options.error_threshold);
    debug!(
        schema = schema.name,
        total,
        kept = table.num_rows(),
        "filtered rows by {}",
        schema.filter_column
    );
    if table.num_rows() == 0 {
        return Err(Error::EmptyDataset);
    }

    for name in schema.categorical {
        let index = table.position(name)?;
        let codes = category_codes(&table.columns[index]);
        table.columns[index] = Column::Float(codes);
    }
    for name in schema.unit_suffixed {
        let index = table.position(name)?;
        if let Column::Text(values) = &table.columns[index] {
            let numbers = values.iter().map(|v| strip_unit(v)).collect();
            table.columns[index] = Column::Float(numbers);
        }
    }

    let feature_columns = schema
        .features
        .iter()
        .map(|&index| table.floats(index))
        .collect::<Result<Vec<_>>>()?;
    let x = Array2::from_shape_fn((table.num_rows(), feature_columns.len()), |(r, c)| {
        feature_columns[c][r]
    });
    let labels = Array1::from(table.floats(schema.label(options.target))?.to_vec());

    let scaler = match scaler {
        Some(scaler) => scaler.clone(),
        None => MinMaxScaler::fit(x.view())?,
    };
    let features = scaler.transform(x.view())?;

    Ok(LoadedDataset {
        features,
        labels,
        seed: schema.seed,
        scaler,
    })
}

/// Error rates as numbers; empty and non-numeric cells become NaN and never
/// pass the threshold.
fn filter_values(column: &Column) -> Vec<f64> {
    match column {
        Column::Float(values) => values.clone(),
        Column::Text(values) => values
            .iter()
            .map(|v| parse_f64(v).unwrap_or(f64::NAN))
            .collect(),
    }
}

/// Replaces each value with its rank among the column's distinct values.
/// Missing values get code -1.
pub fn category_codes(column: &Column) -> Vec<f64> {
    match column {
        Column::Float(values) => numeric_codes(values),
        Column::Text(values) => {
            let categories: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            values
                .iter()
                .map(|v| match categories.binary_search(&v.as_str()) {
                    Ok(code) => code as f64,
                    Err(_) => -1.0,
                })
                .collect()
        }
    }
}

fn numeric_codes(values: &[f64]) -> Vec<f64> {
    let mut categories: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    categories.sort_by(|a, b| compare_f64(*a, *b));
    categories.dedup();
    values
        .iter()
        .map(|v| {
            if v.is_nan() {
                return -1.0;
            }
            match categories.binary_search_by(|c| compare_f64(*c, *v)) {
                Ok(code) => code as f64,
                Err(_) => -1.0,
            }
        })
        .collect()
}

/// `"2g"` -> 2.0; NaN when what is left is not a number.
pub fn strip_unit(value: &str) -> f64 {
    let digits: String = value.chars().filter(|c| !c.is_ascii_lowercase()).collect();
    parse_f64(&digits).unwrap_or(f64::NAN)
}
