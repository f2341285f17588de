use crate::error::Result;
use crate::gp::{BayesianRbfRegression, ModelConfig};
use crate::metrics::{mape, rmse};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Outcome of fitting on one split and predicting the other.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub prediction: Array1<f64>,
    pub uncertainty: Array1<f64>,
    pub rmse: f64,
    pub mape: f64,
}

/// Fits a fresh default model on `(x, y)` and scores it on `(eval_x, eval_y)`.
pub fn eval_bayesian_rbf(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    eval_x: ArrayView2<f64>,
    eval_y: ArrayView1<f64>,
) -> Result<Evaluation> {
    eval_bayesian_rbf_with(&ModelConfig::default(), x, y, eval_x, eval_y)
}

pub fn eval_bayesian_rbf_with(
    config: &ModelConfig,
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    eval_x: ArrayView2<f64>,
    eval_y: ArrayView1<f64>,
) -> Result<Evaluation> {
    let mut model = BayesianRbfRegression::with_config(config.clone());
    model.fit(x, y)?;
    let prediction = model.predict(eval_x, true)?;
    let uncertainty = prediction
        .uncertainty
        .unwrap_or_else(|| Array1::zeros(prediction.mean.len()));

    Ok(Evaluation {
        rmse: rmse(eval_y, prediction.mean.view())?,
        mape: mape(eval_y, prediction.mean.view())?,
        prediction: prediction.mean,
        uncertainty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ndarray::array;

    #[test]
    fn scores_held_out_points() {
        let x = array![[0.0], [0.2], [0.4], [0.6], [0.8], [1.0]];
        let y = array![10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        let eval_x = array![[0.3], [0.7]];
        let eval_y = array![13.0, 17.0];

        let evaluation = eval_bayesian_rbf(x.view(), y.view(), eval_x.view(), eval_y.view()).unwrap();
        assert_eq!(evaluation.prediction.len(), 2);
        assert_eq!(evaluation.uncertainty.len(), 2);
        assert!(evaluation.uncertainty.iter().all(|u| *u >= 0.0));
        assert!(evaluation.rmse < 2.0, "rmse {}", evaluation.rmse);
        assert!(evaluation.mape < 15.0, "mape {}", evaluation.mape);
    }

    #[test]
    fn label_length_mismatch_propagates() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 2.0];
        let result = eval_bayesian_rbf(x.view(), y.view(), x.view(), array![1.0].view());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
