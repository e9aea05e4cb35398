//! Reference distributions for test statistics.
//!
//! Every p-value and critical value in the crate goes through
//! [`ReferenceDistribution`], a small tagged variant over the two
//! distributions a fitted model can imply.

use crate::core::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Distribution of a test statistic under the null hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceDistribution {
    /// Student's t with the given degrees of freedom.
    StudentT(f64),
    /// Standard normal.
    Normal,
}

impl ReferenceDistribution {
    /// Cumulative distribution function at `x`.
    pub fn cdf(&self, x: f64) -> ProbeResult<f64> {
        match *self {
            Self::StudentT(df) => Ok(students_t(df)?.cdf(x)),
            Self::Normal => Ok(standard_normal()?.cdf(x)),
        }
    }

    /// Quantile function at probability `p`.
    pub fn inverse_cdf(&self, p: f64) -> ProbeResult<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(ProbeError::InvalidOptions(format!(
                "probability must be in (0, 1), got {}",
                p
            )));
        }
        match *self {
            Self::StudentT(df) => Ok(students_t(df)?.inverse_cdf(p)),
            Self::Normal => Ok(standard_normal()?.inverse_cdf(p)),
        }
    }

    /// Two-tailed p-value for a test statistic.
    ///
    /// Returns NaN when the statistic is NaN.
    pub fn two_tailed_p_value(&self, statistic: f64) -> ProbeResult<f64> {
        if statistic.is_nan() {
            return Ok(f64::NAN);
        }
        let upper = 1.0 - self.cdf(statistic.abs())?;
        Ok((2.0 * upper).clamp(0.0, 1.0))
    }

    /// Critical value of a two-tailed test at significance level `alpha`.
    pub fn critical_value(&self, alpha: f64) -> ProbeResult<f64> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ProbeError::InvalidOptions(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        self.inverse_cdf(1.0 - alpha / 2.0)
    }

    /// Critical value for a two-sided confidence interval at `confidence_level`.
    pub fn interval_critical_value(&self, confidence_level: f64) -> ProbeResult<f64> {
        self.critical_value(1.0 - confidence_level)
    }
}

fn students_t(df: f64) -> ProbeResult<StudentsT> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| {
        ProbeError::InvalidOptions(format!("invalid t distribution with df = {}: {}", df, e))
    })
}

fn standard_normal() -> ProbeResult<Normal> {
    Normal::new(0.0, 1.0)
        .map_err(|e| ProbeError::NonFinite(format!("standard normal construction: {}", e)))
}
