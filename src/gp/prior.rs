//! Hyperparameter priors, evaluated in log space.

use crate::error::{Error, Result};
use statrs::distribution::{Cauchy, Continuous, Gamma};
use std::f64::consts::LN_2;

#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    Gamma(Gamma),
    /// Cauchy(0, β) folded onto the positive half-line.
    HalfCauchy(Cauchy),
}

impl Prior {
    pub fn gamma(shape: f64, rate: f64) -> Result<Self> {
        Gamma::new(shape, rate)
            .map(Prior::Gamma)
            .map_err(|e| Error::InvalidPrior(e.to_string()))
    }

    pub fn half_cauchy(scale: f64) -> Result<Self> {
        Cauchy::new(0.0, scale)
            .map(Prior::HalfCauchy)
            .map_err(|e| Error::InvalidPrior(e.to_string()))
    }

    pub fn ln_pdf(&self, x: f64) -> f64 {
        match self {
            Prior::Gamma(d) => d.ln_pdf(x),
            Prior::HalfCauchy(d) => LN_2 + d.ln_pdf(x),
        }
    }

    /// Derivative of [`Prior::ln_pdf`] with respect to `x`.
    pub fn d_ln_pdf(&self, x: f64) -> f64 {
        match self {
            Prior::Gamma(d) => (d.shape() - 1.0) / x - d.rate(),
            Prior::HalfCauchy(d) => {
                let s2 = d.scale() * d.scale();
                -2.0 * x / (s2 + x * x)
            }
        }
    }

    /// Log density of `u = ln x`, Jacobian included, and its derivative in `u`.
    pub fn log_space(&self, u: f64) -> (f64, f64) {
        let x = u.exp();
        (self.ln_pdf(x) + u, x * self.d_ln_pdf(x) + 1.0)
    }

    /// Starting point for the optimizer: the mean for Gamma, the median for
    /// HalfCauchy.
    pub fn initial_value(&self) -> f64 {
        match self {
            Prior::Gamma(d) => d.shape() / d.rate(),
            Prior::HalfCauchy(d) => d.scale(),
        }
    }
}

/// Priors over the three kernel hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Priors {
    pub length_scale: Prior,
    pub amplitude: Prior,
    pub noise: Prior,
}

impl Priors {
    /// ℓ ~ Gamma(2, 1), η ~ HalfCauchy(5), σ ~ HalfCauchy(0.1)
    pub fn standard() -> Result<Self> {
        Ok(Priors {
            length_scale: Prior::gamma(2.0, 1.0)?,
            amplitude: Prior::half_cauchy(5.0)?,
            noise: Prior::half_cauchy(0.1)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prior> {
        [&self.length_scale, &self.amplitude, &self.noise].into_iter()
    }
}
