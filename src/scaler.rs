use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Per-column min/max scaling into `[0, 1]`.
///
/// The scaler is fit once and never mutated afterwards; reuse it by passing
/// it to later loads so every split is scaled with the same bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: Array1<f64>,
    data_max: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    /// Missing values (NaN) are ignored when computing the bounds.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(Error::EmptyDataset);
        }
        let data_min = x.map_axis(Axis(0), |col| {
            nan_bound(col.iter().copied().fold(f64::INFINITY, f64::min))
        });
        let data_max = x.map_axis(Axis(0), |col| {
            nan_bound(col.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        });
        // Constant columns map to 0 instead of dividing by zero.
        let range = (&data_max - &data_min).mapv(|r| if r == 0.0 { 1.0 } else { r });
        Ok(MinMaxScaler {
            data_min,
            data_max,
            range,
        })
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.data_min.len() {
            return Err(Error::ShapeMismatch {
                expected: self.data_min.len(),
                actual: x.ncols(),
            });
        }
        Ok((&x - &self.data_min) / &self.range)
    }

    pub fn data_min(&self) -> &Array1<f64> {
        &self.data_min
    }

    pub fn data_max(&self) -> &Array1<f64> {
        &self.data_max
    }
}

// A column with no finite value folds to an infinity.
fn nan_bound(bound: f64) -> f64 {
    if bound.is_infinite() {
        f64::NAN
    } else {
        bound
    }
}
