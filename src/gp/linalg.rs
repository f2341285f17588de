//! Dense Cholesky routines for symmetric positive definite matrices.

use crate::error::{Error, Result};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Largest diagonal jitter tried before giving up on a factorization.
pub const MAX_JITTER: f64 = 1e-2;

/// Lower-triangular `L` with `L Lᵀ = a`, or `None` if `a` is not positive definite.
pub fn cholesky(a: ArrayView2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum = l.slice(s![i, ..j]).dot(&l.slice(s![j, ..j]));
            if i == j {
                let d = a[[i, i]] - sum;
                if !(d > 0.0 && d.is_finite()) {
                    return None;
                }
                l[[i, j]] = d.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Factorizes `a + jitter·I`, growing the jitter tenfold on failure.
/// Returns the factor and the jitter that was needed.
pub fn cholesky_jittered(a: &Array2<f64>, jitter: f64) -> Result<(Array2<f64>, f64)> {
    let mut jitter = jitter;
    loop {
        let factor = if jitter > 0.0 {
            let mut shifted = a.clone();
            shifted.diag_mut().mapv_inplace(|d| d + jitter);
            cholesky(shifted.view())
        } else {
            cholesky(a.view())
        };
        if let Some(l) = factor {
            return Ok((l, jitter));
        }
        jitter = if jitter > 0.0 { jitter * 10.0 } else { 1e-10 };
        if jitter > MAX_JITTER {
            return Err(Error::NotPositiveDefinite { jitter });
        }
    }
}

/// Solves `L X = B` for lower-triangular `L`.
pub fn solve_lower(l: &Array2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let mut x = b.to_owned();
    for i in 0..l.nrows() {
        let (done, mut rest) = x.view_mut().split_at(Axis(0), i);
        let mut row = rest.row_mut(0);
        for p in 0..i {
            row.scaled_add(-l[[i, p]], &done.row(p));
        }
        let d = l[[i, i]];
        row.mapv_inplace(|v| v / d);
    }
    x
}

/// Solves `Lᵀ X = B` for lower-triangular `L`.
pub fn solve_upper(l: &Array2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut x = b.to_owned();
    for i in (0..n).rev() {
        let (mut head, tail) = x.view_mut().split_at(Axis(0), i + 1);
        let mut row = head.row_mut(i);
        for p in i + 1..n {
            row.scaled_add(-l[[p, i]], &tail.row(p - i - 1));
        }
        let d = l[[i, i]];
        row.mapv_inplace(|v| v / d);
    }
    x
}

/// Solves `(L Lᵀ) x = b`.
pub fn cho_solve(l: &Array2<f64>, b: ArrayView1<f64>) -> Array1<f64> {
    let b = b.insert_axis(Axis(1));
    let x = solve_upper(l, solve_lower(l, b).view());
    x.column(0).to_owned()
}

/// `(L Lᵀ)⁻¹`
pub fn cho_inverse(l: &Array2<f64>) -> Array2<f64> {
    let l_inv = solve_lower(l, Array2::eye(l.nrows()).view());
    l_inv.t().dot(&l_inv)
}

/// `ln det(L Lᵀ)`
pub fn log_det(l: &Array2<f64>) -> f64 {
    2.0 * l.diag().iter().map(|d| d.ln()).sum::<f64>()
}

pub fn outer(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Array2<f64> {
    a.insert_axis(Axis(1)).dot(&b.insert_axis(Axis(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn spd() -> Array2<f64> {
        array![[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]]
    }

    #[test]
    fn factor_reconstructs_matrix() {
        let a = spd();
        let l = cholesky(a.view()).unwrap();
        assert_abs_diff_eq!(l.dot(&l.t()), a, epsilon = 1e-12);
        assert_eq!(l[[0, 1]], 0.0);
    }

    #[test]
    fn solves_and_inverts() {
        let a = spd();
        let l = cholesky(a.view()).unwrap();
        let b = array![1.0, -2.0, 0.5];
        let x = cho_solve(&l, b.view());
        assert_abs_diff_eq!(a.dot(&x), b, epsilon = 1e-12);
        assert_abs_diff_eq!(a.dot(&cho_inverse(&l)), Array2::<f64>::eye(3), epsilon = 1e-12);
    }

    #[test]
    fn log_det_matches_direct() {
        let a = array![[2.0, 0.0], [0.0, 3.0]];
        let l = cholesky(a.view()).unwrap();
        assert_abs_diff_eq!(log_det(&l), 6.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_needs_jitter() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(cholesky(a.view()).is_none());
        let (l, jitter) = cholesky_jittered(&a, 0.0).unwrap();
        assert!(jitter > 0.0);
        assert!(l.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn indefinite_matrix_fails() {
        let a = array![[1.0, 0.0], [0.0, -1.0]];
        assert!(matches!(
            cholesky_jittered(&a, 0.0),
            Err(Error::NotPositiveDefinite { .. })
        ));
    }
}
