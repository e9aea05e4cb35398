//! Selection of the moderator values at which conditional effects are evaluated.

use crate::core::{
    Column, ModelFrame, ModeratorPoint, ModeratorValue, ModeratorValues, ProbeError, ProbeResult,
};
use crate::inference::FixedValue;
use crate::moderation::CenteringPlan;
use crate::utils::{distinct_count, min_max, sorted_median, weighted_mean, weighted_sd};

/// One evaluation point: the raw value used in linear combinations and its
/// reported form.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    /// Value in model units.
    pub fixed: FixedValue,
    /// Value and label in reported units.
    pub point: ModeratorPoint,
}

/// Ordered evaluation points for one moderator.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeratorGrid {
    variable: String,
    points: Vec<GridPoint>,
}

impl ModeratorGrid {
    /// Moderator name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Evaluation points in order.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Number of evaluation points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Chooses moderator values from the observed data.
#[derive(Debug, Clone, Copy)]
pub struct ModeratorValueSelector<'a> {
    frame: &'a ModelFrame,
    plan: &'a CenteringPlan,
}

impl<'a> ModeratorValueSelector<'a> {
    /// Create a selector over `frame`, reporting values in the units of `plan`.
    pub fn new(frame: &'a ModelFrame, plan: &'a CenteringPlan) -> Self {
        Self { frame, plan }
    }

    /// Build the grid for `variable` under `mode`.
    ///
    /// Factor moderators ignore `mode` and use every observed level.
    pub fn select(&self, variable: &str, mode: &ModeratorValues) -> ProbeResult<ModeratorGrid> {
        let points = match self.frame.column(variable)? {
            Column::Factor(factor) => {
                if *mode != ModeratorValues::default() {
                    log::debug!("value selection mode ignored for factor `{}`", variable);
                }
                let levels = factor.observed_levels();
                if levels.len() < 2 {
                    return Err(ProbeError::degenerate(
                        variable,
                        format!("only {} observed level(s)", levels.len()),
                    ));
                }
                levels
                    .into_iter()
                    .map(|level| GridPoint {
                        fixed: FixedValue::Level(level.to_string()),
                        point: ModeratorPoint {
                            variable: variable.to_string(),
                            value: ModeratorValue::Level(level.to_string()),
                            label: level.to_string(),
                        },
                    })
                    .collect()
            }
            Column::Continuous(values) => self.continuous_points(variable, values, mode)?,
        };

        log::debug!("moderator `{}`: {} evaluation points", variable, points.len());
        Ok(ModeratorGrid {
            variable: variable.to_string(),
            points,
        })
    }

    fn continuous_points(
        &self,
        variable: &str,
        values: &[f64],
        mode: &ModeratorValues,
    ) -> ProbeResult<Vec<GridPoint>> {
        if distinct_count(values) < 2 {
            return Err(ProbeError::degenerate(
                variable,
                "fewer than 2 distinct values",
            ));
        }

        let weights = self.frame.weights();
        let raw_labeled: Vec<(f64, String)> = match mode {
            ModeratorValues::MeanPlusMinus | ModeratorValues::PlusMinus => {
                let mean = weighted_mean(values, weights);
                let sd = weighted_sd(values, weights);
                if !(sd.is_finite() && sd > 0.0) {
                    return Err(ProbeError::degenerate(
                        variable,
                        "standard deviation is zero",
                    ));
                }
                let mut points = vec![(mean - sd, "- 1 SD".to_string())];
                if *mode == ModeratorValues::MeanPlusMinus {
                    points.push((mean, "Mean".to_string()));
                }
                points.push((mean + sd, "+ 1 SD".to_string()));
                points
            }
            ModeratorValues::Terciles => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let n = sorted.len();
                if n < 3 {
                    return Err(ProbeError::degenerate(
                        variable,
                        "terciles need at least 3 observations",
                    ));
                }
                let first = (n as f64 / 3.0).round() as usize;
                let second = (2.0 * n as f64 / 3.0).round() as usize;
                vec![
                    (sorted_median(&sorted[..first]), "Lower tercile".to_string()),
                    (
                        sorted_median(&sorted[first..second]),
                        "Middle tercile".to_string(),
                    ),
                    (sorted_median(&sorted[second..]), "Upper tercile".to_string()),
                ]
            }
            ModeratorValues::Explicit(explicit) => explicit
                .iter()
                .map(|&v| (self.plan.to_raw(variable, v), format!("{}", v)))
                .collect(),
        };

        let (lo, hi) = min_max(values);
        Ok(raw_labeled
            .into_iter()
            .map(|(raw, label)| {
                if raw < lo || raw > hi {
                    log::warn!(
                        "`{}` = {} is outside the observed range [{}, {}]",
                        variable,
                        raw,
                        lo,
                        hi
                    );
                }
                GridPoint {
                    fixed: FixedValue::Continuous(raw),
                    point: ModeratorPoint {
                        variable: variable.to_string(),
                        value: ModeratorValue::Continuous(self.plan.to_reported(variable, raw)),
                        label,
                    },
                }
            })
            .collect())
    }
}
