//! Per-call configuration for simple slopes and Johnson-Neyman analyses.

use crate::core::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Which predictors are centered (held at their mean) when forming conditional effects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CenteringPolicy {
    /// Nothing is centered; covariates are held at zero.
    None,
    /// Every continuous predictor except the focal predictor.
    #[default]
    AllButFocal,
    /// Every continuous predictor, the focal predictor included.
    All,
    /// Only the named continuous predictors.
    Named(Vec<String>),
}

/// How moderator values are chosen for a continuous moderator.
///
/// Ignored for factor moderators, which always use every observed level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ModeratorValues {
    /// Mean and one standard deviation either side.
    #[default]
    MeanPlusMinus,
    /// One standard deviation either side of the mean.
    PlusMinus,
    /// Medians of the lower, middle and upper thirds of the observed values.
    Terciles,
    /// Caller-supplied values, used verbatim and in order.
    Explicit(Vec<f64>),
}

/// Options shared by every probe of an interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOptions {
    pub(crate) pred: String,
    pub(crate) modx: String,
    pub(crate) mod2: Option<String>,
    pub(crate) modx_values: ModeratorValues,
    pub(crate) mod2_values: ModeratorValues,
    pub(crate) centering: CenteringPolicy,
    pub(crate) standardize: bool,
    pub(crate) confidence_level: f64,
    pub(crate) conditional_intercepts: bool,
    pub(crate) robust: bool,
}

impl ProbeOptions {
    /// Create a builder for probing `pred` moderated by `modx`.
    pub fn builder(pred: impl Into<String>, modx: impl Into<String>) -> ProbeOptionsBuilder {
        ProbeOptionsBuilder::new(pred, modx)
    }

    /// Focal predictor.
    pub fn pred(&self) -> &str {
        &self.pred
    }

    /// Primary moderator.
    pub fn modx(&self) -> &str {
        &self.modx
    }

    /// Second moderator, for three-way interactions.
    pub fn mod2(&self) -> Option<&str> {
        self.mod2.as_deref()
    }

    /// Confidence level for conditional effect intervals.
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Centering policy.
    pub fn centering(&self) -> &CenteringPolicy {
        &self.centering
    }

    /// Whether centered variables are also scaled by their standard deviation.
    pub fn standardize(&self) -> bool {
        self.standardize
    }
}

/// Builder for [`ProbeOptions`].
#[derive(Debug, Clone)]
pub struct ProbeOptionsBuilder {
    pred: String,
    modx: String,
    mod2: Option<String>,
    modx_values: ModeratorValues,
    mod2_values: ModeratorValues,
    centering: CenteringPolicy,
    standardize: bool,
    confidence_level: f64,
    conditional_intercepts: bool,
    robust: bool,
}

impl ProbeOptionsBuilder {
    /// Create a builder with default options.
    pub fn new(pred: impl Into<String>, modx: impl Into<String>) -> Self {
        Self {
            pred: pred.into(),
            modx: modx.into(),
            mod2: None,
            modx_values: ModeratorValues::default(),
            mod2_values: ModeratorValues::default(),
            centering: CenteringPolicy::default(),
            standardize: false,
            confidence_level: 0.95,
            conditional_intercepts: false,
            robust: false,
        }
    }

    /// Set a second moderator for a three-way interaction.
    pub fn mod2(mut self, mod2: impl Into<String>) -> Self {
        self.mod2 = Some(mod2.into());
        self
    }

    /// Set how primary moderator values are chosen.
    ///
    /// Default is [`ModeratorValues::MeanPlusMinus`].
    pub fn modx_values(mut self, values: ModeratorValues) -> Self {
        self.modx_values = values;
        self
    }

    /// Set how second moderator values are chosen.
    ///
    /// Default is [`ModeratorValues::MeanPlusMinus`].
    pub fn mod2_values(mut self, values: ModeratorValues) -> Self {
        self.mod2_values = values;
        self
    }

    /// Set the centering policy.
    ///
    /// Default is [`CenteringPolicy::AllButFocal`].
    pub fn centering(mut self, centering: CenteringPolicy) -> Self {
        self.centering = centering;
        self
    }

    /// Scale centered variables by their standard deviation.
    ///
    /// Default is false.
    pub fn standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    /// Set the confidence level for conditional effect intervals.
    ///
    /// Default is 0.95.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Also report conditional intercepts.
    ///
    /// Default is false.
    pub fn conditional_intercepts(mut self, include: bool) -> Self {
        self.conditional_intercepts = include;
        self
    }

    /// Use the model's robust covariance matrix.
    ///
    /// Default is false.
    pub fn robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> ProbeResult<ProbeOptions> {
        if self.pred.is_empty() || self.modx.is_empty() {
            return Err(ProbeError::InvalidOptions(
                "predictor and moderator names must be non-empty".to_string(),
            ));
        }
        if self.pred == self.modx {
            return Err(ProbeError::InvalidOptions(format!(
                "`{}` cannot moderate its own effect",
                self.pred
            )));
        }
        if let Some(ref mod2) = self.mod2 {
            if mod2 == &self.pred || mod2 == &self.modx {
                return Err(ProbeError::InvalidOptions(format!(
                    "second moderator `{}` must differ from the predictor and first moderator",
                    mod2
                )));
            }
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ProbeError::InvalidOptions(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        for values in [&self.modx_values, &self.mod2_values] {
            if let ModeratorValues::Explicit(v) = values {
                if v.is_empty() {
                    return Err(ProbeError::InvalidOptions(
                        "explicit moderator values must not be empty".to_string(),
                    ));
                }
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(ProbeError::InvalidOptions(
                        "explicit moderator values must be finite".to_string(),
                    ));
                }
            }
        }

        Ok(ProbeOptions {
            pred: self.pred,
            modx: self.modx,
            mod2: self.mod2,
            modx_values: self.modx_values,
            mod2_values: self.mod2_values,
            centering: self.centering,
            standardize: self.standardize,
            confidence_level: self.confidence_level,
            conditional_intercepts: self.conditional_intercepts,
            robust: self.robust,
        })
    }
}

/// Options for Johnson-Neyman intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct JohnsonNeymanOptions {
    pub(crate) alpha: f64,
    pub(crate) control_fdr: bool,
    pub(crate) fdr_tolerant: bool,
    pub(crate) moderator_range: Option<(f64, f64)>,
    pub(crate) band_points: usize,
}

impl Default for JohnsonNeymanOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            control_fdr: false,
            fdr_tolerant: false,
            moderator_range: None,
            band_points: 100,
        }
    }
}

impl JohnsonNeymanOptions {
    /// Create a builder.
    pub fn builder() -> JohnsonNeymanOptionsBuilder {
        JohnsonNeymanOptionsBuilder::default()
    }

    /// Significance level of the interval.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the critical value is adjusted for the false discovery rate.
    pub fn control_fdr(&self) -> bool {
        self.control_fdr
    }
}

/// Builder for [`JohnsonNeymanOptions`].
#[derive(Debug, Clone, Default)]
pub struct JohnsonNeymanOptionsBuilder {
    options: JohnsonNeymanOptions,
}

impl JohnsonNeymanOptionsBuilder {
    /// Set the significance level.
    ///
    /// Default is 0.05.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.options.alpha = alpha;
        self
    }

    /// Adjust the critical value to control the false discovery rate.
    ///
    /// Default is false.
    pub fn control_fdr(mut self, control: bool) -> Self {
        self.options.control_fdr = control;
        self
    }

    /// Fall back to the nominal critical value if the FDR adjustment fails.
    ///
    /// Default is false (the failure is returned).
    pub fn fdr_tolerant(mut self, tolerant: bool) -> Self {
        self.options.fdr_tolerant = tolerant;
        self
    }

    /// Override the moderator range scanned for bands and FDR correction.
    ///
    /// Given in the units moderator values are reported in. Default is the observed range.
    pub fn moderator_range(mut self, low: f64, high: f64) -> Self {
        self.options.moderator_range = Some((low, high));
        self
    }

    /// Number of evenly spaced moderator values in the significance bands.
    ///
    /// Default is 100.
    pub fn band_points(mut self, points: usize) -> Self {
        self.options.band_points = points;
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> ProbeResult<JohnsonNeymanOptions> {
        let o = self.options;
        if !(o.alpha > 0.0 && o.alpha < 1.0) {
            return Err(ProbeError::InvalidOptions(format!(
                "alpha must be in (0, 1), got {}",
                o.alpha
            )));
        }
        if let Some((low, high)) = o.moderator_range {
            if !(low.is_finite() && high.is_finite() && low < high) {
                return Err(ProbeError::InvalidOptions(format!(
                    "moderator range [{}, {}] is not a finite increasing interval",
                    low, high
                )));
            }
        }
        if o.band_points < 2 {
            return Err(ProbeError::InvalidOptions(
                "band_points must be at least 2".to_string(),
            ));
        }
        Ok(o)
    }
}
