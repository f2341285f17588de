use super::kernel::{squared_distances, Kernel};
use super::linalg::{
    cho_inverse, cho_solve, cholesky, cholesky_jittered, log_det, outer, solve_lower,
};
use super::optimize::Bfgs;
use super::prior::Priors;
use crate::error::{Error, Result};
use crate::time::timed;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info, warn};

/// Diagonal jitter added to the predictive covariance before sampling.
const PREDICTIVE_JITTER: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kernel: Kernel,
    /// Posterior predictive draws per `predict` call.
    pub samples: usize,
    /// Multiplier applied to the sample standard deviation.
    pub uncertainty_scale: f64,
    pub sample_seed: u64,
    pub max_iterations: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            kernel: Kernel::Matern52,
            samples: 2000,
            uncertainty_scale: 1.0 / 1000.0,
            sample_seed: 0,
            max_iterations: 200,
        }
    }
}

/// MAP values of the kernel hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub length_scale: f64,
    pub amplitude: f64,
    pub noise: f64,
}

impl Hyperparameters {
    fn from_log(u: ArrayView1<f64>) -> Self {
        Hyperparameters {
            length_scale: u[0].exp(),
            amplitude: u[1].exp(),
            noise: u[2].exp(),
        }
    }

    fn to_log(self) -> Array1<f64> {
        Array1::from(vec![
            self.length_scale.ln(),
            self.amplitude.ln(),
            self.noise.ln(),
        ])
    }
}

/// Point predictions, plus the scaled spread when it was asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub mean: Array1<f64>,
    pub uncertainty: Option<Array1<f64>>,
}

#[derive(Debug, Clone)]
struct Trained {
    x: Array2<f64>,
    /// Cholesky factor of `η²K + σ²I` at the MAP point.
    chol: Array2<f64>,
    /// `(η²K + σ²I)⁻¹ y`
    alpha: Array1<f64>,
    hyperparameters: Hyperparameters,
}

/// Zero-mean Gaussian-process regression with MAP-estimated kernel
/// hyperparameters.
///
/// The covariance is `η² k(x, x'; ℓ) + σ² δ(x, x')`, with priors
/// ℓ ~ Gamma(2, 1), η ~ HalfCauchy(5) and σ ~ HalfCauchy(0.1).
#[derive(Debug, Clone, Default)]
pub struct BayesianRbfRegression {
    config: ModelConfig,
    trained: Option<Trained>,
}

impl BayesianRbfRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ModelConfig) -> Self {
        BayesianRbfRegression {
            config,
            trained: None,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    pub fn hyperparameters(&self) -> Option<Hyperparameters> {
        self.trained.as_ref().map(|t| t.hyperparameters)
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(Error::ShapeMismatch {
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        if y.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let priors = Priors::standard()?;
        let sq_dist = squared_distances(x, x);
        let kernel = self.config.kernel;
        let start = Hyperparameters {
            length_scale: priors.length_scale.initial_value(),
            amplitude: priors.amplitude.initial_value(),
            noise: priors.noise.initial_value(),
        };
        let bfgs = Bfgs {
            max_iterations: self.config.max_iterations,
            ..Bfgs::default()
        };

        let minimum = timed("find MAP", || {
            bfgs.minimize(
                |u| neg_log_posterior(kernel, &priors, &sq_dist, y, u),
                start.to_log(),
            )
        })?;
        let hyperparameters = Hyperparameters::from_log(minimum.x.view());
        if minimum.converged {
            debug!(iterations = minimum.iterations, "MAP search converged");
        } else {
            warn!(
                iterations = minimum.iterations,
                "MAP search did not converge, using best point found"
            );
        }
        info!(
            length_scale = hyperparameters.length_scale,
            amplitude = hyperparameters.amplitude,
            noise = hyperparameters.noise,
            log_posterior = -minimum.value,
            "fitted hyperparameters"
        );

        let cov = noisy_covariance(kernel, &sq_dist, &hyperparameters);
        let (chol, jitter) = cholesky_jittered(&cov, 0.0)?;
        if jitter > 0.0 {
            warn!(jitter, "training covariance needed jitter");
        }
        let alpha = cho_solve(&chol, y);

        self.trained = Some(Trained {
            x: x.to_owned(),
            chol,
            alpha,
            hyperparameters,
        });
        Ok(())
    }

    /// Exact mean and standard deviation of the noiseless latent function
    /// at `x`.
    pub fn posterior(&self, x: ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        let (mean, cov) = self.predictive(x)?;
        let std = cov.diag().mapv(|v| v.max(0.0).sqrt());
        Ok((mean, std))
    }

    /// Draws posterior predictive samples of the latent function at `x` and
    /// returns their per-point mean. With `with_error`, also returns the
    /// per-point sample standard deviation times the configured
    /// uncertainty scale.
    pub fn predict(&self, x: ArrayView2<f64>, with_error: bool) -> Result<Prediction> {
        let (mean, cov) = self.predictive(x)?;
        let samples = timed("sample posterior predictive", || self.sample(&mean, &cov))?;

        let sample_mean = samples.mean_axis(Axis(0)).unwrap_or(mean);
        let uncertainty = if with_error {
            let std = samples.std_axis(Axis(0), 0.0);
            Some(std * self.config.uncertainty_scale)
        } else {
            None
        };
        Ok(Prediction {
            mean: sample_mean,
            uncertainty,
        })
    }

    fn predictive(&self, x: ArrayView2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
        let trained = self.trained.as_ref().ok_or(Error::NotTrained)?;
        if x.ncols() != trained.x.ncols() {
            return Err(Error::ShapeMismatch {
                expected: trained.x.ncols(),
                actual: x.ncols(),
            });
        }
        let h = trained.hyperparameters;
        let kernel = self.config.kernel;

        let k_cross = kernel.covariance(trained.x.view(), x, h.length_scale, h.amplitude);
        let mean = k_cross.t().dot(&trained.alpha);
        let v = solve_lower(&trained.chol, k_cross.view());
        let cov = kernel.covariance(x, x, h.length_scale, h.amplitude) - v.t().dot(&v);
        let cov = (&cov + &cov.t()) * 0.5;
        Ok((mean, cov))
    }

    /// One joint draw per row.
    fn sample(&self, mean: &Array1<f64>, cov: &Array2<f64>) -> Result<Array2<f64>> {
        let m = mean.len();
        let draws = self.config.samples.max(1);
        if m == 0 {
            return Ok(Array2::zeros((draws, 0)));
        }
        let (chol, jitter) = cholesky_jittered(cov, PREDICTIVE_JITTER)?;
        if jitter > PREDICTIVE_JITTER {
            debug!(jitter, "predictive covariance needed extra jitter");
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.sample_seed);
        let z = Array2::from_shape_simple_fn((draws, m), || rng.sample::<f64, _>(StandardNormal));
        Ok(z.dot(&chol.t()) + mean)
    }
}

fn noisy_covariance(kernel: Kernel, sq_dist: &Array2<f64>, h: &Hyperparameters) -> Array2<f64> {
    let eta2 = h.amplitude * h.amplitude;
    let mut cov = sq_dist.mapv(|d2| eta2 * kernel.correlation(d2.sqrt() / h.length_scale));
    let noise2 = h.noise * h.noise;
    cov.diag_mut().mapv_inplace(|v| v + noise2);
    cov
}

/// Negative log posterior of `u = (ln ℓ, ln η, ln σ)` and its gradient.
///
/// Includes the Jacobian of the log transform. Points where the covariance
/// cannot be factorized without jitter evaluate to +∞, so value and gradient
/// always describe the same matrix.
pub(crate) fn neg_log_posterior(
    kernel: Kernel,
    priors: &Priors,
    sq_dist: &Array2<f64>,
    y: ArrayView1<f64>,
    u: &Array1<f64>,
) -> Result<(f64, Array1<f64>)> {
    let h = Hyperparameters::from_log(u.view());
    if !(h.length_scale > 0.0 && h.amplitude.is_finite() && h.noise.is_finite()) {
        return Ok((f64::INFINITY, Array1::zeros(3)));
    }
    let n = y.len() as f64;
    let eta2 = h.amplitude * h.amplitude;
    let noise2 = h.noise * h.noise;

    let r = sq_dist.mapv(|d2| d2.sqrt() / h.length_scale);
    let corr = r.mapv(|r| kernel.correlation(r));
    let mut cov = &corr * eta2;
    cov.diag_mut().mapv_inplace(|v| v + noise2);

    let chol = match cholesky(cov.view()) {
        Some(chol) => chol,
        None => return Ok((f64::INFINITY, Array1::zeros(3))),
    };
    let alpha = cho_solve(&chol, y);
    let log_likelihood = -0.5 * y.dot(&alpha) - 0.5 * log_det(&chol) - 0.5 * n * (2.0 * PI).ln();

    // d log p(y) / dθ = ½ tr((ααᵀ - K⁻¹) dK/dθ)
    let w = outer(alpha.view(), alpha.view()) - cho_inverse(&chol);
    let d_length_scale = 0.5 * eta2
        * Zip::from(&w)
            .and(&r)
            .fold(0.0, |acc, &w, &r| acc + w * kernel.d_log_length_scale(r));
    let d_amplitude = eta2 * Zip::from(&w).and(&corr).fold(0.0, |acc, &w, &c| acc + w * c);
    let d_noise = noise2 * w.diag().sum();

    let mut value = log_likelihood;
    let mut grad = Array1::from(vec![d_length_scale, d_amplitude, d_noise]);
    for (i, prior) in priors.iter().enumerate() {
        let (lp, dlp) = prior.log_space(u[i]);
        value += lp;
        grad[i] += dlp;
    }
    Ok((-value, -grad))
}
