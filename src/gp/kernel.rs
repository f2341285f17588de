use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

const SQRT_5: f64 = 2.236_067_977_499_79;

/// Stationary correlation functions of the scaled distance `r = |x - x'| / ℓ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `(1 + √5 r + 5/3 r²) exp(-√5 r)`
    #[default]
    Matern52,
    /// `exp(-r² / 2)`, the RBF kernel.
    ExpQuad,
}

impl std::str::FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matern52" => Ok(Kernel::Matern52),
            "exp_quad" | "rbf" => Ok(Kernel::ExpQuad),
            _ => Err(format!("unknown kernel {:?}", s)),
        }
    }
}

impl Kernel {
    pub fn correlation(self, r: f64) -> f64 {
        match self {
            Kernel::Matern52 => (1.0 + SQRT_5 * r + 5.0 / 3.0 * r * r) * (-SQRT_5 * r).exp(),
            Kernel::ExpQuad => (-0.5 * r * r).exp(),
        }
    }

    /// Derivative of [`Kernel::correlation`] with respect to `ln ℓ`.
    pub fn d_log_length_scale(self, r: f64) -> f64 {
        match self {
            Kernel::Matern52 => 5.0 / 3.0 * r * r * (1.0 + SQRT_5 * r) * (-SQRT_5 * r).exp(),
            Kernel::ExpQuad => r * r * (-0.5 * r * r).exp(),
        }
    }

    /// `η² k(a_i, b_j)` for every row pair.
    pub fn covariance(
        self,
        a: ArrayView2<f64>,
        b: ArrayView2<f64>,
        length_scale: f64,
        amplitude: f64,
    ) -> Array2<f64> {
        let eta2 = amplitude * amplitude;
        squared_distances(a, b).mapv(|d2| eta2 * self.correlation(d2.sqrt() / length_scale))
    }
}

/// Unscaled squared Euclidean distances between the rows of `a` and `b`.
pub fn squared_distances(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((a.nrows(), b.nrows()));
    for (i, row_a) in a.outer_iter().enumerate() {
        for (j, row_b) in b.outer_iter().enumerate() {
            out[[i, j]] = Zip::from(&row_a)
                .and(&row_b)
                .fold(0.0, |acc, &x, &y| acc + (x - y) * (x - y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn correlation_is_one_at_zero_distance() {
        for kernel in [Kernel::Matern52, Kernel::ExpQuad] {
            assert_abs_diff_eq!(kernel.correlation(0.0), 1.0);
            assert!(kernel.correlation(3.0) < kernel.correlation(1.0));
        }
    }

    #[test]
    fn length_scale_derivative_matches_finite_difference() {
        // k(d / ℓ) with ℓ = e^u, so dk/du = -r k'(r).
        let d = 1.3;
        let h = 1e-6;
        for kernel in [Kernel::Matern52, Kernel::ExpQuad] {
            let u: f64 = 0.4;
            let f = |u: f64| kernel.correlation(d / u.exp());
            let numeric = (f(u + h) - f(u - h)) / (2.0 * h);
            assert_abs_diff_eq!(kernel.d_log_length_scale(d / u.exp()), numeric, epsilon = 1e-7);
        }
    }

    #[test]
    fn covariance_scales_with_amplitude() {
        let a = array![[0.0, 0.0], [3.0, 4.0]];
        assert_eq!(squared_distances(a.view(), a.view()), array![[0.0, 25.0], [25.0, 0.0]]);
        let k = Kernel::ExpQuad.covariance(a.view(), a.view(), 5.0, 2.0);
        assert_abs_diff_eq!(k[[0, 0]], 4.0);
        assert_abs_diff_eq!(k[[0, 1]], 4.0 * (-0.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn parses_names() {
        assert_eq!("matern52".parse::<Kernel>(), Ok(Kernel::Matern52));
        assert_eq!("rbf".parse::<Kernel>(), Ok(Kernel::ExpQuad));
        assert!("linear".parse::<Kernel>().is_err());
    }
}
