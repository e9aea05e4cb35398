//! Johnson-Neyman intervals.
//!
//! With every other moderator held fixed, the conditional slope of the
//! focal predictor is affine in the moderator `v`:
//!
//! ```text
//! slope(v) = b1 + b2·v
//! var(v)   = V11 + 2v·V12 + v²·V22
//! ```
//!
//! The slope is significant where `slope(v)² > crit² · var(v)`, so the
//! boundaries are the real roots of
//!
//! ```text
//! (b2² − crit²·V22)·v² + 2(b1·b2 − crit²·V12)·v + (b1² − crit²·V11) = 0
//! ```
//!
//! # References
//!
//! - Johnson, P. O. & Neyman, J. (1936). "Tests of certain linear hypotheses and
//!   their application to some educational problems." *Statistical Research Memoirs*, 1, 57–93.
//! - Bauer, D. J. & Curran, P. J. (2005). "Probing Interactions in Fixed and Multilevel
//!   Regression." *Multivariate Behavioral Research*, 40(3), 373–400.

use crate::core::{
    Column, JnBoundary, JohnsonNeymanInterval, JohnsonNeymanOptions, ModelFrame, ModelSummary,
    ProbeError, ProbeOptions, ProbeResult, SignificanceRegion, SlopeBand,
};
use crate::distributions::ReferenceDistribution;
use crate::inference::FixedValue;
use crate::moderation::{GridPoint, ModeratorGrid, ModeratorValueSelector};
use crate::solvers::context::ProbeContext;
use crate::solvers::fdr::{CriticalValueAdjuster, FdrCorrector};
use crate::utils::{linspace, min_max, weighted_mean};
use faer::Col;
use serde::{Deserialize, Serialize};

/// Relative size below which a quadratic or linear coefficient is treated as zero.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Conditional slope as an affine function of the moderator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeLine {
    /// Slope at moderator value zero (`b1`).
    pub intercept: f64,
    /// Change in slope per unit of the moderator (`b2`).
    pub slope: f64,
    /// `Var(b1)`.
    pub var_intercept: f64,
    /// `Cov(b1, b2)`.
    pub covariance: f64,
    /// `Var(b2)`.
    pub var_slope: f64,
}

impl SlopeLine {
    /// Conditional slope at `v`.
    pub fn estimate(&self, v: f64) -> f64 {
        self.intercept + self.slope * v
    }

    /// Variance of the conditional slope at `v`.
    pub fn variance(&self, v: f64) -> f64 {
        self.var_intercept + 2.0 * v * self.covariance + v * v * self.var_slope
    }

    /// Standard error at `v`, failing on a negative variance.
    pub fn std_error(&self, v: f64) -> ProbeResult<f64> {
        let var = self.variance(v);
        let magnitude =
            self.var_intercept.abs() + 2.0 * (v * self.covariance).abs() + v * v * self.var_slope.abs();
        if !var.is_finite() {
            return Err(ProbeError::NonFinite(format!("slope variance at {}", v)));
        }
        if var < 0.0 {
            if -var > DEGENERATE_TOLERANCE * magnitude.max(f64::MIN_POSITIVE) {
                return Err(ProbeError::NotPositiveSemidefinite {
                    variance: var,
                    context: format!("conditional slope at moderator value {}", v),
                });
            }
            return Ok(0.0);
        }
        Ok(var.sqrt())
    }

    /// Test statistic at `v` (NaN where the variance is not positive).
    pub fn statistic(&self, v: f64) -> f64 {
        let var = self.variance(v);
        if var > 0.0 {
            self.estimate(v) / var.sqrt()
        } else {
            f64::NAN
        }
    }

    /// Whether `|slope(v)| / se(v)` exceeds `critical`.
    pub fn is_significant(&self, v: f64, critical: f64) -> bool {
        let est = self.estimate(v);
        est * est > critical * critical * self.variance(v)
    }
}

/// Boundaries of the significance region on the moderator's real line.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundaries {
    /// Zero, one or two boundaries in increasing order.
    pub values: Vec<f64>,
    /// Where the slope is significant.
    pub region: SignificanceRegion,
}

/// Solve for the moderator values where `|slope(v)| / se(v) = critical`.
///
/// `reference` (normally the moderator's mean) classifies the no-boundary case.
pub fn solve_boundaries(line: &SlopeLine, critical: f64, reference: f64) -> ProbeResult<Boundaries> {
    let c2 = critical * critical;
    let a = line.slope * line.slope - c2 * line.var_slope;
    let b = 2.0 * (line.intercept * line.slope - c2 * line.covariance);
    let c = line.intercept * line.intercept - c2 * line.var_intercept;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return Err(ProbeError::NonFinite(
            "Johnson-Neyman quadratic coefficients".to_string(),
        ));
    }

    let a_scale = (line.slope * line.slope).max(c2 * line.var_slope.abs());
    let b_scale = 2.0 * (line.intercept * line.slope).abs().max(c2 * line.covariance.abs());

    if a.abs() <= DEGENERATE_TOLERANCE * a_scale.max(f64::MIN_POSITIVE) {
        if b.abs() <= DEGENERATE_TOLERANCE * b_scale.max(f64::MIN_POSITIVE) {
            log::debug!("Johnson-Neyman: slope significance is constant in the moderator");
            return Ok(no_boundary(line, critical, reference));
        }
        let root = -c / b;
        if !root.is_finite() {
            return Err(ProbeError::NonFinite("Johnson-Neyman linear root".to_string()));
        }
        let step = root.abs().max(1.0);
        let region = if line.is_significant(root + step, critical) {
            SignificanceRegion::Above
        } else {
            SignificanceRegion::Below
        };
        log::debug!("Johnson-Neyman: single boundary at {}", root);
        return Ok(Boundaries {
            values: vec![root],
            region,
        });
    }

    let discriminant = b * b - 4.0 * a * c;
    if !discriminant.is_finite() {
        return Err(ProbeError::NonFinite(
            "Johnson-Neyman discriminant".to_string(),
        ));
    }
    if discriminant < 0.0 {
        log::debug!("Johnson-Neyman: negative discriminant, no boundary");
        return Ok(no_boundary(line, critical, reference));
    }

    let sqrt_disc = discriminant.sqrt();
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    let (r1, r2) = if q == 0.0 {
        let r = -b / (2.0 * a);
        (r, r)
    } else {
        (q / a, c / q)
    };
    if !(r1.is_finite() && r2.is_finite()) {
        return Err(ProbeError::NonFinite("Johnson-Neyman roots".to_string()));
    }
    let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };

    let inside = lo < hi && line.is_significant(0.5 * (lo + hi), critical);
    let outside = line.is_significant(hi + (hi - lo).max(1.0), critical);
    let region = match (inside, outside) {
        (true, false) => SignificanceRegion::Inside,
        (false, true) => SignificanceRegion::Outside,
        (true, true) => SignificanceRegion::Always,
        (false, false) => SignificanceRegion::Never,
    };
    log::debug!(
        "Johnson-Neyman: boundaries [{}, {}], significant {:?}",
        lo,
        hi,
        region
    );

    let values = match region {
        SignificanceRegion::Inside | SignificanceRegion::Outside => vec![lo, hi],
        _ => Vec::new(),
    };
    Ok(Boundaries { values, region })
}

fn no_boundary(line: &SlopeLine, critical: f64, reference: f64) -> Boundaries {
    let region = if line.is_significant(reference, critical) {
        SignificanceRegion::Always
    } else {
        SignificanceRegion::Never
    };
    Boundaries {
        values: Vec::new(),
        region,
    }
}

/// Finds Johnson-Neyman intervals for a continuous moderator.
///
/// # Example
///
/// ```rust,ignore
/// use anofox_interactions::prelude::*;
///
/// let probe = ProbeOptions::builder("Illiteracy", "Murder").build()?;
/// let intervals = JohnsonNeymanSolver::new(JohnsonNeymanOptions::default())
///     .solve(&summary, &frame, &probe)?;
/// println!("{:?}", intervals[0].bound_values());
/// ```
#[derive(Debug)]
pub struct JohnsonNeymanSolver {
    options: JohnsonNeymanOptions,
    adjuster: Box<dyn CriticalValueAdjuster>,
}

impl JohnsonNeymanSolver {
    /// Create a solver using the default FDR corrector.
    pub fn new(options: JohnsonNeymanOptions) -> Self {
        Self {
            options,
            adjuster: Box::new(FdrCorrector::default()),
        }
    }

    /// Replace the critical value adjuster used when FDR control is requested.
    pub fn with_adjuster(mut self, adjuster: impl CriticalValueAdjuster + 'static) -> Self {
        self.adjuster = Box::new(adjuster);
        self
    }

    /// Options in use.
    pub fn options(&self) -> &JohnsonNeymanOptions {
        &self.options
    }

    /// Compute one interval per value of the second moderator (or a single
    /// interval for a two-way interaction).
    pub fn solve<M: ModelSummary + ?Sized>(
        &self,
        model: &M,
        frame: &ModelFrame,
        probe: &ProbeOptions,
    ) -> ProbeResult<Vec<JohnsonNeymanInterval>> {
        let ctx = ProbeContext::new(model, frame, probe)?;
        let mod2_grid = match probe.mod2() {
            Some(mod2) => Some(
                ModeratorValueSelector::new(frame, &ctx.plan).select(mod2, &probe.mod2_values)?,
            ),
            None => None,
        };
        self.intervals(&ctx, frame, mod2_grid.as_ref())
    }

    pub(crate) fn intervals(
        &self,
        ctx: &ProbeContext<'_>,
        frame: &ModelFrame,
        mod2_grid: Option<&ModeratorGrid>,
    ) -> ProbeResult<Vec<JohnsonNeymanInterval>> {
        let modx = ctx.options.modx();
        let values = match frame.column(modx)? {
            Column::Continuous(v) => v,
            Column::Factor(_) => {
                return Err(ProbeError::InvalidOptions(format!(
                    "Johnson-Neyman intervals require a continuous moderator; `{}` is a factor",
                    modx
                )))
            }
        };

        let observed = min_max(values);
        if !(observed.0 < observed.1) {
            return Err(ProbeError::degenerate(modx, "fewer than 2 distinct values"));
        }
        let mean = weighted_mean(values, frame.weights());
        let scan = match self.options.moderator_range {
            Some((low, high)) => (ctx.plan.to_raw(modx, low), ctx.plan.to_raw(modx, high)),
            None => observed,
        };

        match mod2_grid {
            None => Ok(vec![self.interval(ctx, None, observed, scan, mean)?]),
            Some(grid) => grid
                .points()
                .iter()
                .map(|point| self.interval(ctx, Some(point), observed, scan, mean))
                .collect(),
        }
    }

    fn interval(
        &self,
        ctx: &ProbeContext<'_>,
        mod2: Option<&GridPoint>,
        observed: (f64, f64),
        scan: (f64, f64),
        mean: f64,
    ) -> ProbeResult<JohnsonNeymanInterval> {
        let modx = ctx.options.modx();
        let line = slope_line(ctx, mod2.map(|p| &p.fixed))?;
        let (critical, fdr_adjusted) = self.critical_value(&line, ctx.distribution, scan)?;
        let boundaries = solve_boundaries(&line, critical, mean)?;

        let bounds = boundaries
            .values
            .iter()
            .map(|&raw| {
                let within = raw >= observed.0 && raw <= observed.1;
                if !within {
                    log::warn!(
                        "Johnson-Neyman boundary {} lies outside the observed range of `{}` [{}, {}]",
                        raw,
                        modx,
                        observed.0,
                        observed.1
                    );
                }
                JnBoundary {
                    value: ctx.plan.to_reported(modx, raw),
                    within_observed_range: within,
                }
            })
            .collect();

        let scale = ctx.slope_scale();
        let mut bands = Vec::with_capacity(self.options.band_points);
        for raw in linspace(scan.0, scan.1, self.options.band_points) {
            let estimate = line.estimate(raw) * scale;
            let std_error = line.std_error(raw)? * scale;
            bands.push(SlopeBand {
                moderator: ctx.plan.to_reported(modx, raw),
                estimate,
                std_error,
                lower: estimate - critical * std_error,
                upper: estimate + critical * std_error,
                significant: line.is_significant(raw, critical),
            });
        }

        Ok(JohnsonNeymanInterval {
            moderator: modx.to_string(),
            mod2: mod2.map(|p| p.point.clone()),
            bounds,
            region: boundaries.region,
            observed_range: (
                ctx.plan.to_reported(modx, observed.0),
                ctx.plan.to_reported(modx, observed.1),
            ),
            alpha: self.options.alpha,
            critical_value: critical,
            fdr_adjusted,
            bands,
        })
    }

    fn critical_value(
        &self,
        line: &SlopeLine,
        distribution: ReferenceDistribution,
        scan: (f64, f64),
    ) -> ProbeResult<(f64, bool)> {
        let nominal = distribution.critical_value(self.options.alpha)?;
        if !self.options.control_fdr {
            return Ok((nominal, false));
        }
        match self
            .adjuster
            .adjust(line, distribution, self.options.alpha, scan)
        {
            Ok(adjustment) => Ok((adjustment.critical_value.max(nominal), true)),
            Err(e) if self.options.fdr_tolerant => {
                log::warn!("{}; using the nominal critical value {}", e, nominal);
                Ok((nominal, false))
            }
            Err(e) => Err(e),
        }
    }
}

/// Conditional slope as an affine function of the primary moderator, with
/// the second moderator (if any) held at `mod2`.
pub(crate) fn slope_line(ctx: &ProbeContext<'_>, mod2: Option<&FixedValue>) -> ProbeResult<SlopeLine> {
    let at_zero = ctx
        .index
        .slope_multipliers(&ctx.assignment(&FixedValue::Continuous(0.0), mod2))?;
    let at_one = ctx
        .index
        .slope_multipliers(&ctx.assignment(&FixedValue::Continuous(1.0), mod2))?;
    let per_unit = Col::from_fn(at_zero.nrows(), |i| at_one[i] - at_zero[i]);

    let lh = ctx.hypothesis()?;
    Ok(SlopeLine {
        intercept: lh.estimate(&at_zero)?,
        slope: lh.estimate(&per_unit)?,
        var_intercept: lh.variance(&at_zero)?,
        covariance: lh.covariance_between(&at_zero, &per_unit)?,
        var_slope: lh.variance(&per_unit)?,
    })
}
