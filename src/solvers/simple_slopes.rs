//! Simple slopes analysis.
//!
//! Evaluates the conditional effect of the focal predictor at selected values
//! of one or two moderators. Each conditional slope is a linear combination of
//! the fitted coefficients, so its standard error follows from the covariance
//! matrix without refitting the model.
//!
//! # References
//!
//! - Aiken, L. S. & West, S. G. (1991). *Multiple Regression: Testing and
//!   Interpreting Interactions*. Sage.
//! - Preacher, K. J., Curran, P. J. & Bauer, D. J. (2006). "Computational Tools for
//!   Probing Interactions in Multiple Linear Regression, Multilevel Modeling, and
//!   Latent Curve Analysis." *Journal of Educational and Behavioral Statistics*, 31(4), 437–448.

use crate::core::{
    ConditionalEffect, JohnsonNeymanInterval, JohnsonNeymanOptions, ModelFrame, ModelSummary,
    ModeratorPoint, ProbeOptions, ProbeResult,
};
use crate::distributions::ReferenceDistribution;
use crate::moderation::{CenteringPlan, GridPoint, ModeratorValueSelector};
use crate::solvers::context::ProbeContext;
use crate::solvers::fdr::CriticalValueAdjuster;
use crate::solvers::johnson_neyman::JohnsonNeymanSolver;
use serde::{Deserialize, Serialize};

/// Conditional effect of the focal predictor at one moderator combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleSlope {
    /// Value of the primary moderator.
    pub modx: ModeratorPoint,
    /// Value of the second moderator, for three-way interactions.
    pub mod2: Option<ModeratorPoint>,
    /// Conditional slope of the focal predictor.
    pub slope: ConditionalEffect,
    /// Conditional intercept, when requested.
    pub intercept: Option<ConditionalEffect>,
}

/// Output of [`SimpleSlopesEngine::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleSlopesResult {
    /// Focal predictor.
    pub pred: String,
    /// Primary moderator.
    pub modx: String,
    /// Second moderator, if any.
    pub mod2: Option<String>,
    /// One row per moderator combination; the second moderator varies slowest.
    pub slopes: Vec<SimpleSlope>,
    /// Johnson-Neyman intervals, one per second-moderator value (empty unless requested).
    pub johnson_neyman: Vec<JohnsonNeymanInterval>,
    /// Centering and scaling applied to the predictors.
    pub centering: CenteringPlan,
    /// Distribution used for p-values and intervals.
    pub distribution: ReferenceDistribution,
    /// Confidence level of the reported intervals.
    pub confidence_level: f64,
}

impl SimpleSlopesResult {
    /// Rows evaluated at the given second-moderator label (all rows for two-way analyses).
    pub fn slopes_at_mod2(&self, label: &str) -> Vec<&SimpleSlope> {
        self.slopes
            .iter()
            .filter(|s| s.mod2.as_ref().map_or(true, |p| p.label == label))
            .collect()
    }
}

/// Probes an interaction at selected moderator values.
///
/// # Example
///
/// ```rust,ignore
/// use anofox_interactions::prelude::*;
///
/// let options = ProbeOptions::builder("Illiteracy", "Murder").build()?;
/// let result = SimpleSlopesEngine::new(options)
///     .with_johnson_neyman(JohnsonNeymanOptions::default())
///     .analyze(&summary, &frame)?;
///
/// for row in &result.slopes {
///     println!("{}: {:.3} (p = {:.4})", row.modx.label, row.slope.estimate, row.slope.p_value);
/// }
/// ```
#[derive(Debug)]
pub struct SimpleSlopesEngine {
    options: ProbeOptions,
    johnson_neyman: Option<JohnsonNeymanSolver>,
}

impl SimpleSlopesEngine {
    /// Create an engine for the given probe.
    pub fn new(options: ProbeOptions) -> Self {
        Self {
            options,
            johnson_neyman: None,
        }
    }

    /// Also compute Johnson-Neyman intervals.
    ///
    /// Intervals are skipped when the primary moderator is a factor.
    pub fn with_johnson_neyman(mut self, options: JohnsonNeymanOptions) -> Self {
        self.johnson_neyman = Some(JohnsonNeymanSolver::new(options));
        self
    }

    /// Also compute Johnson-Neyman intervals, adjusting critical values with `adjuster`
    /// when FDR control is enabled.
    pub fn with_johnson_neyman_adjuster(
        mut self,
        options: JohnsonNeymanOptions,
        adjuster: impl CriticalValueAdjuster + 'static,
    ) -> Self {
        self.johnson_neyman = Some(JohnsonNeymanSolver::new(options).with_adjuster(adjuster));
        self
    }

    /// Options in use.
    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// Run the analysis.
    pub fn analyze<M: ModelSummary + ?Sized>(
        &self,
        model: &M,
        frame: &ModelFrame,
    ) -> ProbeResult<SimpleSlopesResult> {
        let ctx = ProbeContext::new(model, frame, &self.options)?;
        let selector = ModeratorValueSelector::new(frame, &ctx.plan);

        let modx_grid = selector.select(self.options.modx(), &self.options.modx_values)?;
        let mod2_grid = match self.options.mod2() {
            Some(mod2) => Some(selector.select(mod2, &self.options.mod2_values)?),
            None => None,
        };

        let level = self.options.confidence_level();
        let crit = ctx.distribution.interval_critical_value(level)?;
        let scale = ctx.slope_scale();
        let lh = ctx.hypothesis()?;

        let mod2_points: Vec<Option<&GridPoint>> = match &mod2_grid {
            Some(grid) => grid.points().iter().map(Some).collect(),
            None => vec![None],
        };

        let mut slopes = Vec::with_capacity(modx_grid.len() * mod2_points.len());
        for &mod2_point in &mod2_points {
            for modx_point in modx_grid.points() {
                let assignment =
                    ctx.assignment(&modx_point.fixed, mod2_point.map(|p| &p.fixed));

                let m = ctx.index.slope_multipliers(&assignment)?;
                let slope = lh.evaluate_with_critical(&m, crit, level)?.rescaled(scale);

                let intercept = if self.options.conditional_intercepts {
                    let m = ctx.index.intercept_multipliers(&assignment)?;
                    Some(lh.evaluate_with_critical(&m, crit, level)?)
                } else {
                    None
                };

                slopes.push(SimpleSlope {
                    modx: modx_point.point.clone(),
                    mod2: mod2_point.map(|p| p.point.clone()),
                    slope,
                    intercept,
                });
            }
        }
        log::debug!("evaluated {} simple slopes", slopes.len());

        let johnson_neyman = match &self.johnson_neyman {
            Some(_) if frame.column(self.options.modx())?.is_factor() => {
                log::debug!(
                    "skipping Johnson-Neyman intervals: moderator `{}` is a factor",
                    self.options.modx()
                );
                Vec::new()
            }
            Some(solver) => solver.intervals(&ctx, frame, mod2_grid.as_ref())?,
            None => Vec::new(),
        };

        Ok(SimpleSlopesResult {
            pred: self.options.pred().to_string(),
            modx: self.options.modx().to_string(),
            mod2: self.options.mod2().map(str::to_string),
            slopes,
            johnson_neyman,
            centering: ctx.plan.clone(),
            distribution: ctx.distribution,
            confidence_level: level,
        })
    }
}
