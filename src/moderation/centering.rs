//! Centering plan: the values non-moderator predictors are held at.
//!
//! Conditional effects are evaluated with every continuous covariate at its
//! centering offset (its mean when centered, zero otherwise). Factor
//! variables are never centered or scaled; their dummies stay at the
//! reference level.

use crate::core::{CenteringPolicy, Column, ModelFrame, ProbeError, ProbeResult};
use crate::utils::{weighted_mean, weighted_sd};
use serde::{Deserialize, Serialize};

/// Role of a variable in the probed interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableRole {
    /// The focal predictor.
    Focal,
    /// A moderator (evaluated at grid values, not at its offset).
    Moderator,
    /// Any other continuous predictor.
    Covariate,
}

/// Centering decision for one continuous variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenteringEntry {
    /// Variable name.
    pub variable: String,
    /// Role in the probed interaction.
    pub role: VariableRole,
    /// Whether the variable is centered.
    pub centered: bool,
    /// Value the variable is held at: its mean when centered, zero otherwise.
    pub offset: f64,
    /// Standard deviation divisor when standardizing.
    pub scale: Option<f64>,
}

/// Centering offsets and scaling divisors for one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenteringPlan {
    entries: Vec<CenteringEntry>,
}

impl CenteringPlan {
    /// Build the plan for the continuous columns of `frame` that appear in `variables`.
    ///
    /// `variables` lists the model's predictors; frame columns outside it are
    /// neither centered nor reported as held constant.
    pub fn build(
        frame: &ModelFrame,
        variables: &[&str],
        pred: &str,
        moderators: &[&str],
        policy: &CenteringPolicy,
        standardize: bool,
    ) -> ProbeResult<Self> {
        if let CenteringPolicy::Named(names) = policy {
            for name in names {
                if frame.column(name)?.is_factor() {
                    log::debug!("`{}` is a factor and is not centered", name);
                }
            }
        }

        let weights = frame.weights();
        let mut entries = Vec::new();
        for (name, column) in frame.columns() {
            if !variables.contains(&name) && name != pred && !moderators.contains(&name) {
                continue;
            }
            let values = match column {
                Column::Continuous(v) => v,
                Column::Factor(_) => continue,
            };

            let role = if name == pred {
                VariableRole::Focal
            } else if moderators.contains(&name) {
                VariableRole::Moderator
            } else {
                VariableRole::Covariate
            };

            let centered = match policy {
                CenteringPolicy::None => false,
                CenteringPolicy::AllButFocal => role != VariableRole::Focal,
                CenteringPolicy::All => true,
                CenteringPolicy::Named(names) => names.iter().any(|n| n == name),
            };

            let (offset, scale) = if centered {
                let mean = weighted_mean(values, weights);
                let scale = if standardize {
                    let sd = weighted_sd(values, weights);
                    if !(sd.is_finite() && sd > 0.0) {
                        return Err(ProbeError::degenerate(
                            name,
                            "cannot standardize a variable with zero standard deviation",
                        ));
                    }
                    Some(sd)
                } else {
                    None
                };
                (mean, scale)
            } else {
                (0.0, None)
            };

            entries.push(CenteringEntry {
                variable: name.to_string(),
                role,
                centered,
                offset,
                scale,
            });
        }

        Ok(Self { entries })
    }

    /// All entries, ordered by variable name.
    pub fn entries(&self) -> &[CenteringEntry] {
        &self.entries
    }

    /// Entry for one variable.
    pub fn entry(&self, variable: &str) -> Option<&CenteringEntry> {
        self.entries.iter().find(|e| e.variable == variable)
    }

    /// Value `variable` is held at (zero for unknown or uncentered variables).
    pub fn offset(&self, variable: &str) -> f64 {
        self.entry(variable).map_or(0.0, |e| e.offset)
    }

    /// Standardization divisor of `variable`, if it is scaled.
    pub fn scale(&self, variable: &str) -> Option<f64> {
        self.entry(variable).and_then(|e| e.scale)
    }

    /// Covariates held constant at their mean.
    pub fn held_constant(&self) -> impl Iterator<Item = &CenteringEntry> {
        self.entries
            .iter()
            .filter(|e| e.role == VariableRole::Covariate && e.centered)
    }

    /// Convert a raw value of `variable` to reported units.
    pub fn to_reported(&self, variable: &str, raw: f64) -> f64 {
        match self.entry(variable) {
            Some(CenteringEntry {
                scale: Some(s),
                offset,
                ..
            }) => (raw - offset) / s,
            _ => raw,
        }
    }

    /// Convert a value of `variable` in reported units back to raw units.
    pub fn to_raw(&self, variable: &str, reported: f64) -> f64 {
        match self.entry(variable) {
            Some(CenteringEntry {
                scale: Some(s),
                offset,
                ..
            }) => offset + s * reported,
            _ => reported,
        }
    }
}
