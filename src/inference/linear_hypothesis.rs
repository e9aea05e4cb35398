//! Inference on linear combinations of model coefficients.
//!
//! A conditional slope or intercept is a linear combination `m'β` of the
//! coefficient vector. Its variance is the quadratic form `m'Σm` over the
//! coefficient covariance matrix, restricted to the coefficients with a
//! non-zero multiplier.

use crate::core::{ConditionalEffect, ProbeError, ProbeResult};
use crate::distributions::ReferenceDistribution;
use faer::{Col, Mat};

/// Relative tolerance below which a negative variance is treated as rounding error.
const VARIANCE_TOLERANCE: f64 = 1e-10;

/// Evaluates linear hypotheses against one coefficient vector and covariance matrix.
#[derive(Debug, Clone, Copy)]
pub struct LinearHypothesis<'a> {
    names: &'a [String],
    coefficients: &'a Col<f64>,
    covariance: &'a Mat<f64>,
    distribution: ReferenceDistribution,
}

impl<'a> LinearHypothesis<'a> {
    /// Create an evaluator.
    ///
    /// Fails with [`ProbeError::DimensionMismatch`] unless there is one
    /// coefficient per name and the covariance matrix matches in both dimensions.
    pub fn new(
        names: &'a [String],
        coefficients: &'a Col<f64>,
        covariance: &'a Mat<f64>,
        distribution: ReferenceDistribution,
    ) -> ProbeResult<Self> {
        let p = names.len();
        for (what, got) in [
            ("coefficients", coefficients.nrows()),
            ("covariance rows", covariance.nrows()),
            ("covariance columns", covariance.ncols()),
        ] {
            if got != p {
                return Err(ProbeError::DimensionMismatch {
                    what,
                    expected: p,
                    got,
                });
            }
        }
        Ok(Self {
            names,
            coefficients,
            covariance,
            distribution,
        })
    }

    /// Reference distribution of the test statistics.
    pub fn distribution(&self) -> ReferenceDistribution {
        self.distribution
    }

    /// Number of coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Build a multiplier vector from `(coefficient name, multiplier)` pairs.
    ///
    /// Repeated names accumulate.
    pub fn multipliers(&self, combination: &[(&str, f64)]) -> ProbeResult<Col<f64>> {
        let mut m = Col::zeros(self.n_coefficients());
        for &(name, weight) in combination {
            let idx = self
                .names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| ProbeError::MissingTerm {
                    term: name.to_string(),
                })?;
            m[idx] += weight;
        }
        Ok(m)
    }

    /// Point estimate `m'β`.
    pub fn estimate(&self, m: &Col<f64>) -> ProbeResult<f64> {
        self.check(m)?;
        let mut sum = 0.0;
        for i in 0..m.nrows() {
            if m[i] != 0.0 {
                sum += m[i] * self.coefficients[i];
            }
        }
        Ok(sum)
    }

    /// Covariance `a'Σb` between two linear combinations.
    pub fn covariance_between(&self, a: &Col<f64>, b: &Col<f64>) -> ProbeResult<f64> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.quadratic_form(a, b).0)
    }

    /// Variance `m'Σm`, failing if it is negative beyond rounding error.
    pub fn variance(&self, m: &Col<f64>) -> ProbeResult<f64> {
        self.check(m)?;
        let (var, magnitude) = self.quadratic_form(m, m);
        if !var.is_finite() {
            return Err(ProbeError::NonFinite("variance of linear combination".to_string()));
        }
        if var < 0.0 {
            if -var > VARIANCE_TOLERANCE * magnitude.max(f64::MIN_POSITIVE) {
                return Err(ProbeError::NotPositiveSemidefinite {
                    variance: var,
                    context: self.describe(m),
                });
            }
            return Ok(0.0);
        }
        Ok(var)
    }

    /// Full inference for `m'β`: estimate, standard error, statistic, p-value and CI.
    pub fn evaluate(&self, m: &Col<f64>, confidence_level: f64) -> ProbeResult<ConditionalEffect> {
        let crit = self.distribution.interval_critical_value(confidence_level)?;
        self.evaluate_with_critical(m, crit, confidence_level)
    }

    /// As [`evaluate`](Self::evaluate), with a precomputed critical value.
    pub(crate) fn evaluate_with_critical(
        &self,
        m: &Col<f64>,
        crit: f64,
        confidence_level: f64,
    ) -> ProbeResult<ConditionalEffect> {
        let estimate = self.estimate(m)?;
        let std_error = self.variance(m)?.sqrt();
        let statistic = if std_error > 0.0 {
            estimate / std_error
        } else {
            f64::NAN
        };
        let p_value = self.distribution.two_tailed_p_value(statistic)?;

        Ok(ConditionalEffect {
            estimate,
            std_error,
            statistic,
            p_value,
            conf_low: estimate - crit * std_error,
            conf_high: estimate + crit * std_error,
            confidence_level,
        })
    }

    /// Evaluate a combination given by coefficient names.
    pub fn evaluate_named(
        &self,
        combination: &[(&str, f64)],
        confidence_level: f64,
    ) -> ProbeResult<ConditionalEffect> {
        let m = self.multipliers(combination)?;
        self.evaluate(&m, confidence_level)
    }

    fn check(&self, m: &Col<f64>) -> ProbeResult<()> {
        if m.nrows() != self.names.len() {
            return Err(ProbeError::DimensionMismatch {
                what: "multipliers",
                expected: self.names.len(),
                got: m.nrows(),
            });
        }
        Ok(())
    }

    /// Returns `(a'Σb, Σ|a_i Σ_ij b_j|)`, skipping zero multipliers.
    fn quadratic_form(&self, a: &Col<f64>, b: &Col<f64>) -> (f64, f64) {
        let mut sum = 0.0;
        let mut magnitude = 0.0;
        for i in 0..a.nrows() {
            if a[i] == 0.0 {
                continue;
            }
            for j in 0..b.nrows() {
                if b[j] == 0.0 {
                    continue;
                }
                let term = a[i] * self.covariance[(i, j)] * b[j];
                sum += term;
                magnitude += term.abs();
            }
        }
        (sum, magnitude)
    }

    fn describe(&self, m: &Col<f64>) -> String {
        let parts: Vec<String> = (0..m.nrows())
            .filter(|&i| m[i] != 0.0)
            .map(|i| format!("{}*{}", m[i], self.names[i]))
            .collect();
        parts.join(" + ")
    }
}
