//! Distribution family and degrees of freedom of a fitted model.

use crate::distributions::ReferenceDistribution;
use serde::{Deserialize, Serialize};

/// Sampling distribution family used for tests on coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistributionFamily {
    /// Gaussian errors: test statistics follow a t distribution.
    #[default]
    GaussianT,
    /// Asymptotic inference (GLMs with known dispersion, large-sample models):
    /// test statistics follow a standard normal distribution.
    AsymptoticNormal,
}

/// Residual degrees of freedom of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreesOfFreedom {
    /// Finite-sample residual degrees of freedom.
    Finite(usize),
    /// Infinite degrees of freedom (asymptotic inference).
    Infinite,
}

impl DegreesOfFreedom {
    /// Degrees of freedom as a float (`f64::INFINITY` for the asymptotic case).
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Finite(df) => *df as f64,
            Self::Infinite => f64::INFINITY,
        }
    }
}

impl DistributionFamily {
    /// Combine the family tag with the degrees of freedom into the distribution
    /// used for critical values and p-values.
    ///
    /// A t family with infinite degrees of freedom is the standard normal.
    pub fn reference(&self, df: DegreesOfFreedom) -> ReferenceDistribution {
        match (self, df) {
            (Self::GaussianT, DegreesOfFreedom::Finite(df)) => {
                ReferenceDistribution::StudentT(df as f64)
            }
            _ => ReferenceDistribution::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_distribution() {
        assert_eq!(
            DistributionFamily::GaussianT.reference(DegreesOfFreedom::Finite(46)),
            ReferenceDistribution::StudentT(46.0)
        );
        assert_eq!(
            DistributionFamily::GaussianT.reference(DegreesOfFreedom::Infinite),
            ReferenceDistribution::Normal
        );
        assert_eq!(
            DistributionFamily::AsymptoticNormal.reference(DegreesOfFreedom::Finite(10)),
            ReferenceDistribution::Normal
        );
    }
}
