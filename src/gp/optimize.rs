//! Quasi-Newton minimization used for the MAP estimate.

use super::linalg::outer;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};
use tracing::debug;

const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// BFGS with a backtracking Armijo line search.
///
/// The objective returns its value and gradient. A non-finite value marks an
/// infeasible point; the line search steps back from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bfgs {
    pub max_iterations: usize,
    /// Stop once every gradient component is below this.
    pub gradient_tolerance: f64,
    /// Stop once the relative decrease of the objective is below this.
    pub value_tolerance: f64,
    /// Largest change of any coordinate in one step.
    pub max_step: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Bfgs {
            max_iterations: 200,
            gradient_tolerance: 1e-5,
            value_tolerance: 2.2e-9,
            max_step: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl Bfgs {
    pub fn minimize<F>(&self, mut objective: F, x0: Array1<f64>) -> Result<Minimum>
    where
        F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>)>,
    {
        let n = x0.len();
        let mut x = x0;
        let (mut value, mut grad) = objective(&x)?;
        if !value.is_finite() {
            return Err(Error::NonFiniteObjective);
        }
        let mut inv_hessian = Array2::<f64>::eye(n);

        for iteration in 0..self.max_iterations {
            if grad.iter().all(|g| g.abs() < self.gradient_tolerance) {
                return Ok(Minimum {
                    x,
                    value,
                    iterations: iteration,
                    converged: true,
                });
            }

            let mut direction = -inv_hessian.dot(&grad);
            if grad.dot(&direction) >= 0.0 {
                inv_hessian = Array2::eye(n);
                direction = -&grad;
            }
            let largest = direction.iter().fold(0.0f64, |m, d| m.max(d.abs()));
            if largest > self.max_step {
                direction *= self.max_step / largest;
            }
            let slope = grad.dot(&direction);

            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = &x + &(&direction * step);
                let (candidate_value, candidate_grad) = objective(&candidate)?;
                if candidate_value.is_finite() && candidate_value <= value + ARMIJO * step * slope {
                    accepted = Some((candidate, candidate_value, candidate_grad));
                    break;
                }
                step *= 0.5;
            }
            let (next, next_value, next_grad) = match accepted {
                Some(point) => point,
                None => {
                    debug!(iteration, value, "line search failed");
                    return Ok(Minimum {
                        x,
                        value,
                        iterations: iteration,
                        converged: false,
                    });
                }
            };

            let s = &next - &x;
            let y = &next_grad - &grad;
            let sy = s.dot(&y);
            if sy > 1e-12 {
                let rho = 1.0 / sy;
                let left = Array2::<f64>::eye(n) - outer(s.view(), y.view()) * rho;
                inv_hessian = left.dot(&inv_hessian).dot(&left.t()) + outer(s.view(), s.view()) * rho;
            }

            let decrease = value - next_value;
            let magnitude = value.abs().max(next_value.abs()).max(1.0);
            x = next;
            value = next_value;
            grad = next_grad;
            debug!(iteration, value, step, "bfgs step");

            if decrease <= self.value_tolerance * magnitude {
                return Ok(Minimum {
                    x,
                    value,
                    iterations: iteration + 1,
                    converged: true,
                });
            }
        }

        Ok(Minimum {
            x,
            value,
            iterations: self.max_iterations,
            converged: false,
        })
    }
}
