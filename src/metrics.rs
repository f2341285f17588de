//! Regression error metrics. Empty inputs score 0.

use crate::error::{Error, Result};
use ndarray::{ArrayView1, Zip};

fn check_len(y_true: &ArrayView1<f64>, y_pred: &ArrayView1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::ShapeMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    Ok(())
}

fn mean_of<F>(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>, f: F) -> Result<f64>
where
    F: Fn(f64, f64) -> f64,
{
    check_len(&y_true, &y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let sum = Zip::from(&y_true)
        .and(&y_pred)
        .fold(0.0, |acc, &t, &p| acc + f(t, p));
    Ok(sum / y_true.len() as f64)
}

/// Root mean squared error: sqrt(mean((true - pred)²))
pub fn rmse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    mean_of(y_true, y_pred, |t, p| (t - p) * (t - p)).map(f64::sqrt)
}

/// Mean absolute error: mean(|true - pred|)
pub fn mae(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    mean_of(y_true, y_pred, |t, p| (t - p).abs())
}

/// Mean absolute percentage error, in percent.
///
/// A zero in `y_true` makes the result non-finite.
pub fn mape(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    mean_of(y_true, y_pred, |t, p| ((t - p) / t).abs()).map(|m| m * 100.0)
}
