//! Records produced by the probing engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inference on one linear combination of coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEffect {
    /// Point estimate.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// Test statistic (estimate / standard error).
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Lower confidence bound.
    pub conf_low: f64,
    /// Upper confidence bound.
    pub conf_high: f64,
    /// Confidence level of the bounds.
    pub confidence_level: f64,
}

impl ConditionalEffect {
    /// Whether the effect is significant at `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Multiply the effect by a positive unit conversion factor.
    ///
    /// The statistic and p-value are unchanged.
    pub(crate) fn rescaled(self, factor: f64) -> Self {
        Self {
            estimate: self.estimate * factor,
            std_error: self.std_error * factor,
            conf_low: self.conf_low * factor,
            conf_high: self.conf_high * factor,
            ..self
        }
    }
}

/// A value a moderator is held at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModeratorValue {
    /// Value of a continuous moderator, in reported units.
    Continuous(f64),
    /// Level of a factor moderator.
    Level(String),
}

impl fmt::Display for ModeratorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous(v) => write!(f, "{}", v),
            Self::Level(l) => write!(f, "{}", l),
        }
    }
}

/// A moderator value with a human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratorPoint {
    /// Moderator name.
    pub variable: String,
    /// Value in reported units (standardized units when standardizing).
    pub value: ModeratorValue,
    /// Label such as "Mean" or "+ 1 SD".
    pub label: String,
}

/// A Johnson-Neyman boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JnBoundary {
    /// Moderator value at which the slope's statistic equals the critical value.
    pub value: f64,
    /// Whether the boundary lies inside the observed moderator range.
    pub within_observed_range: bool,
}

/// Where the conditional slope is significant relative to the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceRegion {
    /// Between the two boundaries.
    Inside,
    /// Below the lower and above the upper boundary.
    Outside,
    /// Above the single boundary.
    Above,
    /// Below the single boundary.
    Below,
    /// Everywhere (no boundary).
    Always,
    /// Nowhere (no boundary).
    Never,
}

impl SignificanceRegion {
    /// Whether a moderator value falls in the significant region.
    pub fn contains(&self, bounds: &[JnBoundary], v: f64) -> bool {
        match (self, bounds) {
            (Self::Always, _) => true,
            (Self::Never, _) => false,
            (Self::Above, [b]) => v > b.value,
            (Self::Below, [b]) => v < b.value,
            (Self::Inside, [lo, hi]) => v > lo.value && v < hi.value,
            (Self::Outside, [lo, hi]) => v < lo.value || v > hi.value,
            _ => false,
        }
    }
}

/// Conditional slope at one point of a significance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeBand {
    /// Moderator value, in reported units.
    pub moderator: f64,
    /// Conditional slope estimate.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// Lower bound at the interval's critical value.
    pub lower: f64,
    /// Upper bound at the interval's critical value.
    pub upper: f64,
    /// Whether |statistic| exceeds the critical value.
    pub significant: bool,
}

/// Johnson-Neyman interval for one (fixed) value of the second moderator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JohnsonNeymanInterval {
    /// Moderator the interval is expressed over.
    pub moderator: String,
    /// Value the second moderator is held at, for three-way interactions.
    pub mod2: Option<ModeratorPoint>,
    /// Zero, one or two boundaries in increasing order.
    pub bounds: Vec<JnBoundary>,
    /// Side(s) of the boundaries where the slope is significant.
    pub region: SignificanceRegion,
    /// Observed (min, max) of the moderator.
    pub observed_range: (f64, f64),
    /// Significance level.
    pub alpha: f64,
    /// Critical value used to locate the boundaries.
    pub critical_value: f64,
    /// Whether `critical_value` was adjusted for the false discovery rate.
    pub fdr_adjusted: bool,
    /// Conditional slopes across the scanned moderator range.
    pub bands: Vec<SlopeBand>,
}

impl JohnsonNeymanInterval {
    /// Whether the slope is significant at moderator value `v`.
    pub fn is_significant_at(&self, v: f64) -> bool {
        self.region.contains(&self.bounds, v)
    }

    /// Boundary values without annotations.
    pub fn bound_values(&self) -> Vec<f64> {
        self.bounds.iter().map(|b| b.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(value: f64) -> JnBoundary {
        JnBoundary {
            value,
            within_observed_range: true,
        }
    }

    #[test]
    fn test_region_contains() {
        let two = [b(-1.0), b(1.0)];
        assert!(SignificanceRegion::Inside.contains(&two, 0.0));
        assert!(!SignificanceRegion::Inside.contains(&two, 2.0));
        assert!(SignificanceRegion::Outside.contains(&two, 2.0));
        assert!(SignificanceRegion::Outside.contains(&two, -2.0));
        assert!(!SignificanceRegion::Outside.contains(&two, 0.5));

        let one = [b(3.0)];
        assert!(SignificanceRegion::Above.contains(&one, 4.0));
        assert!(SignificanceRegion::Below.contains(&one, 2.0));

        assert!(SignificanceRegion::Always.contains(&[], 100.0));
        assert!(!SignificanceRegion::Never.contains(&[], 100.0));
    }

    #[test]
    fn test_rescaled_effect_keeps_statistic() {
        let effect = ConditionalEffect {
            estimate: 2.0,
            std_error: 0.5,
            statistic: 4.0,
            p_value: 0.001,
            conf_low: 1.0,
            conf_high: 3.0,
            confidence_level: 0.95,
        };
        let scaled = effect.rescaled(2.0);
        assert_eq!(scaled.estimate, 4.0);
        assert_eq!(scaled.std_error, 1.0);
        assert_eq!(scaled.statistic, 4.0);
        assert_eq!(scaled.conf_high, 6.0);
    }

    #[test]
    fn test_moderator_value_display() {
        assert_eq!(ModeratorValue::Continuous(1.5).to_string(), "1.5");
        assert_eq!(ModeratorValue::Level("South".into()).to_string(), "South");
    }
}
