//! The fitted-model capability consumed by the probing engine.
//!
//! The engine never fits models. Anything that can expose named coefficient
//! estimates, their covariance matrix, residual degrees of freedom and a
//! distribution family can be probed, whether it came from OLS, a GLM or a
//! survey-weighted fit.

use crate::core::error::{ProbeError, ProbeResult};
use crate::core::family::{DegreesOfFreedom, DistributionFamily};
use crate::distributions::ReferenceDistribution;
use faer::{Col, Mat};
use std::collections::HashSet;

/// Name R-style model summaries use for the intercept coefficient.
pub const DEFAULT_INTERCEPT_NAME: &str = "(Intercept)";

/// Read-only view of a fitted regression model.
pub trait ModelSummary {
    /// Coefficient names, in the order of [`coefficients`](Self::coefficients).
    fn coefficient_names(&self) -> &[String];

    /// Coefficient estimates.
    fn coefficients(&self) -> &Col<f64>;

    /// Model-based covariance matrix of the coefficient estimates.
    fn covariance(&self) -> &Mat<f64>;

    /// Robust covariance matrix, if the fitting procedure provided one.
    fn robust_covariance(&self) -> Option<&Mat<f64>> {
        None
    }

    /// Residual degrees of freedom.
    fn degrees_of_freedom(&self) -> DegreesOfFreedom;

    /// Distribution family of the test statistics.
    fn family(&self) -> DistributionFamily;

    /// Name of the intercept coefficient, if the model has one.
    fn intercept_name(&self) -> Option<&str> {
        Some(DEFAULT_INTERCEPT_NAME)
    }

    /// Reference distribution for this model's test statistics.
    fn reference_distribution(&self) -> ReferenceDistribution {
        self.family().reference(self.degrees_of_freedom())
    }

    /// Position of a coefficient by name.
    fn coefficient_index(&self, name: &str) -> Option<usize> {
        self.coefficient_names().iter().position(|n| n == name)
    }
}

/// Owned snapshot of a fitted model's linear-algebra artifacts.
///
/// # Example
///
/// ```rust,ignore
/// use anofox_interactions::core::{DegreesOfFreedom, FittedModelSummary};
///
/// let summary = FittedModelSummary::builder()
///     .coefficients(names, estimates)
///     .covariance(vcov)
///     .degrees_of_freedom(DegreesOfFreedom::Finite(46))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct FittedModelSummary {
    names: Vec<String>,
    estimates: Col<f64>,
    covariance: Mat<f64>,
    robust_covariance: Option<Mat<f64>>,
    df: DegreesOfFreedom,
    family: DistributionFamily,
    intercept_name: Option<String>,
}

impl FittedModelSummary {
    /// Create a builder.
    pub fn builder() -> FittedModelSummaryBuilder {
        FittedModelSummaryBuilder::default()
    }

    /// Estimate of a named coefficient.
    pub fn estimate(&self, name: &str) -> Option<f64> {
        self.coefficient_index(name).map(|i| self.estimates[i])
    }

    /// Covariance between two named coefficients.
    pub fn covariance_of(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.coefficient_index(a)?;
        let j = self.coefficient_index(b)?;
        Some(self.covariance[(i, j)])
    }
}

impl ModelSummary for FittedModelSummary {
    fn coefficient_names(&self) -> &[String] {
        &self.names
    }

    fn coefficients(&self) -> &Col<f64> {
        &self.estimates
    }

    fn covariance(&self) -> &Mat<f64> {
        &self.covariance
    }

    fn robust_covariance(&self) -> Option<&Mat<f64>> {
        self.robust_covariance.as_ref()
    }

    fn degrees_of_freedom(&self) -> DegreesOfFreedom {
        self.df
    }

    fn family(&self) -> DistributionFamily {
        self.family
    }

    fn intercept_name(&self) -> Option<&str> {
        self.intercept_name.as_deref()
    }
}

/// Builder for [`FittedModelSummary`].
#[derive(Debug, Clone)]
pub struct FittedModelSummaryBuilder {
    names: Vec<String>,
    estimates: Vec<f64>,
    covariance: Option<Mat<f64>>,
    robust_covariance: Option<Mat<f64>>,
    df: DegreesOfFreedom,
    family: DistributionFamily,
    intercept_name: Option<String>,
}

impl Default for FittedModelSummaryBuilder {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            estimates: Vec::new(),
            covariance: None,
            robust_covariance: None,
            df: DegreesOfFreedom::Infinite,
            family: DistributionFamily::GaussianT,
            intercept_name: Some(DEFAULT_INTERCEPT_NAME.to_string()),
        }
    }
}

impl FittedModelSummaryBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coefficient names and estimates.
    pub fn coefficients<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
        estimates: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self.estimates = estimates.into_iter().collect();
        self
    }

    /// Set the model-based covariance matrix.
    pub fn covariance(mut self, vcov: Mat<f64>) -> Self {
        self.covariance = Some(vcov);
        self
    }

    /// Set a robust covariance matrix.
    pub fn robust_covariance(mut self, vcov: Mat<f64>) -> Self {
        self.robust_covariance = Some(vcov);
        self
    }

    /// Set the residual degrees of freedom.
    ///
    /// Default is [`DegreesOfFreedom::Infinite`].
    pub fn degrees_of_freedom(mut self, df: DegreesOfFreedom) -> Self {
        self.df = df;
        self
    }

    /// Set the distribution family.
    ///
    /// Default is [`DistributionFamily::GaussianT`].
    pub fn family(mut self, family: DistributionFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the intercept coefficient name, or `None` for a model without intercept.
    ///
    /// Default is `"(Intercept)"`.
    pub fn intercept_name(mut self, name: Option<&str>) -> Self {
        self.intercept_name = name.map(str::to_string);
        self
    }

    /// Validate and build the summary.
    pub fn build(self) -> ProbeResult<FittedModelSummary> {
        let p = self.names.len();
        if p == 0 {
            return Err(ProbeError::InvalidOptions(
                "model summary has no coefficients".to_string(),
            ));
        }
        if self.estimates.len() != p {
            return Err(ProbeError::DimensionMismatch {
                what: "coefficient estimates",
                expected: p,
                got: self.estimates.len(),
            });
        }

        let mut seen = HashSet::with_capacity(p);
        for name in &self.names {
            if name.is_empty() {
                return Err(ProbeError::InvalidOptions(
                    "coefficient names must be non-empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ProbeError::InvalidOptions(format!(
                    "duplicate coefficient name `{}`",
                    name
                )));
            }
        }
        if self.estimates.iter().any(|b| !b.is_finite()) {
            return Err(ProbeError::NonFinite("coefficient estimates".to_string()));
        }

        let covariance = self.covariance.ok_or_else(|| {
            ProbeError::InvalidOptions("model summary requires a covariance matrix".to_string())
        })?;
        validate_covariance(&covariance, p, "covariance matrix")?;
        if let Some(ref robust) = self.robust_covariance {
            validate_covariance(robust, p, "robust covariance matrix")?;
        }

        if let DegreesOfFreedom::Finite(0) = self.df {
            return Err(ProbeError::InvalidOptions(
                "finite degrees of freedom must be at least 1".to_string(),
            ));
        }

        Ok(FittedModelSummary {
            estimates: Col::from_fn(p, |i| self.estimates[i]),
            names: self.names,
            covariance,
            robust_covariance: self.robust_covariance,
            df: self.df,
            family: self.family,
            intercept_name: self.intercept_name,
        })
    }
}

fn validate_covariance(vcov: &Mat<f64>, p: usize, what: &'static str) -> ProbeResult<()> {
    if vcov.nrows() != p {
        return Err(ProbeError::DimensionMismatch {
            what,
            expected: p,
            got: vcov.nrows(),
        });
    }
    if vcov.ncols() != p {
        return Err(ProbeError::DimensionMismatch {
            what,
            expected: p,
            got: vcov.ncols(),
        });
    }
    for i in 0..p {
        for j in 0..p {
            if !vcov[(i, j)].is_finite() {
                return Err(ProbeError::NonFinite(what.to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vcov(p: usize) -> Mat<f64> {
        Mat::from_fn(p, p, |i, j| if i == j { 1.0 } else { 0.1 })
    }

    #[test]
    fn test_build_summary() {
        let summary = FittedModelSummary::builder()
            .coefficients(["(Intercept)", "x", "m", "x:m"], [1.0, 2.0, 3.0, 0.5])
            .covariance(vcov(4))
            .degrees_of_freedom(DegreesOfFreedom::Finite(20))
            .build()
            .unwrap();

        assert_eq!(summary.coefficient_index("x:m"), Some(3));
        assert_eq!(summary.estimate("m"), Some(3.0));
        assert_eq!(summary.covariance_of("x", "m"), Some(0.1));
        assert_eq!(
            summary.reference_distribution(),
            ReferenceDistribution::StudentT(20.0)
        );
        assert!(summary.robust_covariance().is_none());
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = FittedModelSummary::builder()
            .coefficients(["x", "m"], [1.0, 2.0])
            .covariance(vcov(3))
            .build();
        assert!(matches!(
            result,
            Err(ProbeError::DimensionMismatch { expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn test_duplicate_names() {
        let result = FittedModelSummary::builder()
            .coefficients(["x", "x"], [1.0, 2.0])
            .covariance(vcov(2))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_covariance() {
        let result = FittedModelSummary::builder()
            .coefficients(["x"], [1.0])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_df_rejected() {
        let result = FittedModelSummary::builder()
            .coefficients(["x"], [1.0])
            .covariance(vcov(1))
            .degrees_of_freedom(DegreesOfFreedom::Finite(0))
            .build();
        assert!(result.is_err());
    }
}
