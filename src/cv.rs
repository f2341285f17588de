//! Seeded shuffle and k-fold cross-validation.

use crate::error::{Error, Result};
use crate::evaluate::eval_bayesian_rbf_with;
use crate::gp::ModelConfig;
use crate::metrics::mae;
use crate::time::timed;
use crate::util::VecExt;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use statrs::statistics::Statistics;
use std::fmt;
use std::ops::Range;
use tracing::info;

pub const DEFAULT_FOLDS: usize = 10;

/// Permutes the rows of `x` and `y` together. The same seed always gives the
/// same permutation.
pub fn shuffle(x: ArrayView2<f64>, y: ArrayView1<f64>, seed: u64) -> Result<(Array2<f64>, Array1<f64>)> {
    if x.nrows() != y.len() {
        return Err(Error::ShapeMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    let mut order: Vec<usize> = (0..y.len()).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    order.shuffle(&mut rng);
    Ok((x.select(Axis(0), &order), y.select(Axis(0), &order)))
}

/// Contiguous fold ranges over `n` rows. The first `n % k` folds hold one
/// extra row.
pub fn kfold(n: usize, k: usize) -> Result<Vec<Range<usize>>> {
    if k < 2 || k > n {
        return Err(Error::InvalidFolds { rows: n, folds: k });
    }
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    Ok((0..k)
        .map(|fold| {
            let len = base + usize::from(fold < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldMetrics {
    pub fold: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CvReport {
    pub folds: Vec<FoldMetrics>,
}

impl CvReport {
    pub fn mean_rmse(&self) -> f64 {
        self.folds.iter().map(|f| f.rmse).mean()
    }

    pub fn mean_mae(&self) -> f64 {
        self.folds.iter().map(|f| f.mae).mean()
    }

    pub fn mean_mape(&self) -> f64 {
        self.folds.iter().map(|f| f.mape).mean()
    }
}

impl fmt::Display for CvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bayesian RMSE : {:.6} and MAPE :{:.6} and MAE :{:.6}",
            self.mean_rmse(),
            self.mean_mape(),
            self.mean_mae()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub folds: usize,
    pub model: ModelConfig,
}

impl Default for CrossValidation {
    fn default() -> Self {
        CrossValidation {
            folds: DEFAULT_FOLDS,
            model: ModelConfig::default(),
        }
    }
}

impl CrossValidation {
    /// Shuffles with `seed`, then trains on all folds but one and scores the
    /// held-out fold, once per fold.
    pub fn run(&self, x: ArrayView2<f64>, y: ArrayView1<f64>, seed: u64) -> Result<CvReport> {
        let (x, y) = shuffle(x, y, seed)?;
        let ranges = kfold(y.len(), self.folds)?;
        let rows: Vec<usize> = (0..y.len()).collect();

        let mut report = CvReport::default();
        for (fold, range) in ranges.into_iter().enumerate() {
            let (test, train) = rows.partition_by_index(|i| range.contains(&i));
            let train_x = x.select(Axis(0), &train);
            let train_y = y.select(Axis(0), &train);
            let test_x = x.select(Axis(0), &test);
            let test_y = y.select(Axis(0), &test);

            let evaluation = timed(format!("fold {}", fold), || {
                eval_bayesian_rbf_with(
                    &self.model,
                    train_x.view(),
                    train_y.view(),
                    test_x.view(),
                    test_y.view(),
                )
            })?;
            let metrics = FoldMetrics {
                fold,
                train_rows: train.len(),
                test_rows: test.len(),
                rmse: evaluation.rmse,
                mae: mae(test_y.view(), evaluation.prediction.view())?,
                mape: evaluation.mape,
            };
            info!(
                fold,
                rmse = metrics.rmse,
                mae = metrics.mae,
                mape = metrics.mape,
                "fold done"
            );
            report.folds.push(metrics);
        }

        info!(
            rmse_std = report.folds.iter().map(|f| f.rmse).population_std_dev(),
            mape_std = report.folds.iter().map(|f| f.mape).population_std_dev(),
            "spread across folds"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn folds_cover_rows_once() {
        let ranges = kfold(23, 10).unwrap();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[0], 0..3);
        assert_eq!(ranges[2], 6..9);
        assert_eq!(ranges[3], 9..11);
        assert_eq!(ranges[9], 21..23);
        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, 23);
    }

    #[test]
    fn rejects_bad_fold_counts() {
        assert!(matches!(kfold(5, 10), Err(Error::InvalidFolds { rows: 5, folds: 10 })));
        assert!(matches!(kfold(5, 1), Err(Error::InvalidFolds { .. })));
    }

    #[test]
    fn shuffle_is_deterministic() {
        let x = Array2::from_shape_fn((30, 2), |(r, c)| (r * 2 + c) as f64);
        let y = Array1::from_shape_fn(30, |r| r as f64);
        let (x1, y1) = shuffle(x.view(), y.view(), 42).unwrap();
        let (x2, y2) = shuffle(x.view(), y.view(), 42).unwrap();
        assert_eq!(x1, x2);
        assert_eq!(y1, y2);
        assert_ne!(y1, y);

        let (_, y3) = shuffle(x.view(), y.view(), 65).unwrap();
        assert_ne!(y1, y3);
    }

    #[test]
    fn shuffle_keeps_rows_paired() {
        let x = Array2::from_shape_fn((12, 1), |(r, _)| r as f64 * 10.0);
        let y = Array1::from_shape_fn(12, |r| r as f64);
        let (xs, ys) = shuffle(x.view(), y.view(), 7).unwrap();
        for (row, label) in xs.outer_iter().zip(ys.iter()) {
            assert_eq!(row[0], label * 10.0);
        }
        let mut sorted = ys.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, y.to_vec());
    }

    #[test]
    fn report_line_format() {
        let report = CvReport {
            folds: vec![
                FoldMetrics {
                    fold: 0,
                    train_rows: 9,
                    test_rows: 1,
                    rmse: 1.0,
                    mae: 0.5,
                    mape: 10.0,
                },
                FoldMetrics {
                    fold: 1,
                    train_rows: 9,
                    test_rows: 1,
                    rmse: 3.0,
                    mae: 1.5,
                    mape: 20.0,
                },
            ],
        };
        assert_abs_diff_eq!(report.mean_rmse(), 2.0);
        assert_eq!(
            report.to_string(),
            "Bayesian RMSE : 2.000000 and MAPE :15.000000 and MAE :1.000000"
        );
    }

    #[test]
    fn runs_every_fold() {
        let x = Array2::from_shape_fn((20, 1), |(r, _)| r as f64 / 19.0);
        let y = x.column(0).mapv(|v| 50.0 + 20.0 * v);
        let cv = CrossValidation {
            folds: 4,
            model: ModelConfig {
                samples: 200,
                ..ModelConfig::default()
            },
        };
        let report = cv.run(x.view(), y.view(), 42).unwrap();
        assert_eq!(report.folds.len(), 4);
        for fold in &report.folds {
            assert_eq!(fold.test_rows, 5);
            assert_eq!(fold.train_rows, 15);
            assert!(fold.rmse.is_finite() && fold.mae.is_finite());
        }
        assert!(report.mean_mape() < 10.0, "{}", report);
    }

    #[test]
    fn too_few_rows_for_folds() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            CrossValidation::default().run(x.view(), y.view(), 1),
            Err(Error::InvalidFolds { .. })
        ));
    }
}
