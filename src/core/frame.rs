//! Observed design columns used for centering and moderator value selection.
//!
//! The frame is only summarized (means, standard deviations, factor levels);
//! nothing here is ever used to refit the model.

use crate::core::error::{ProbeError, ProbeResult};
use std::collections::BTreeMap;

/// A treatment-coded categorical column.
///
/// `levels[0]` is the reference level; every other level has a dummy column
/// named `<factor><level>` in the fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorColumn {
    levels: Vec<String>,
    codes: Vec<usize>,
}

impl FactorColumn {
    /// Create a factor from declared levels and per-row level codes.
    pub fn new<S: Into<String>>(
        levels: impl IntoIterator<Item = S>,
        codes: Vec<usize>,
    ) -> ProbeResult<Self> {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        if levels.is_empty() {
            return Err(ProbeError::InvalidOptions(
                "factor must declare at least one level".to_string(),
            ));
        }
        if let Some(&bad) = codes.iter().find(|&&c| c >= levels.len()) {
            return Err(ProbeError::InvalidOptions(format!(
                "factor code {} is out of range for {} levels",
                bad,
                levels.len()
            )));
        }
        Ok(Self { levels, codes })
    }

    /// Create a factor from row labels, declaring levels in the given order.
    pub fn with_levels<S: AsRef<str>>(levels: &[S], labels: &[S]) -> ProbeResult<Self> {
        let levels: Vec<String> = levels.iter().map(|l| l.as_ref().to_string()).collect();
        let mut codes = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let code = levels.iter().position(|l| l == label).ok_or_else(|| {
                ProbeError::InvalidOptions(format!("label `{}` is not a declared level", label))
            })?;
            codes.push(code);
        }
        Self::new(levels, codes)
    }

    /// Create a factor from row labels with levels sorted lexicographically.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> ProbeResult<Self> {
        let mut levels: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
        levels.sort_unstable();
        levels.dedup();
        let all: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
        Self::with_levels(&levels, &all)
    }

    /// Declared levels, reference level first.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// The reference level.
    pub fn reference_level(&self) -> &str {
        &self.levels[0]
    }

    /// Per-row level codes.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Levels that occur in the data, in declared order.
    pub fn observed_levels(&self) -> Vec<&str> {
        let mut present = vec![false; self.levels.len()];
        for &c in &self.codes {
            present[c] = true;
        }
        self.levels
            .iter()
            .zip(present)
            .filter(|(_, p)| *p)
            .map(|(l, _)| l.as_str())
            .collect()
    }

    fn len(&self) -> usize {
        self.codes.len()
    }
}

/// One observed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric column.
    Continuous(Vec<f64>),
    /// Categorical column.
    Factor(FactorColumn),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Self::Continuous(v) => v.len(),
            Self::Factor(f) => f.len(),
        }
    }

    /// Whether this column is categorical.
    pub fn is_factor(&self) -> bool {
        matches!(self, Self::Factor(_))
    }
}

/// Observed columns of the model's predictors, plus optional observation weights.
#[derive(Debug, Clone)]
pub struct ModelFrame {
    columns: BTreeMap<String, Column>,
    weights: Option<Vec<f64>>,
    n_rows: usize,
}

impl ModelFrame {
    /// Create a builder.
    pub fn builder() -> ModelFrameBuilder {
        ModelFrameBuilder::default()
    }

    /// Number of observations.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Look up a column.
    pub fn column(&self, name: &str) -> ProbeResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| ProbeError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Look up a numeric column.
    pub fn continuous(&self, name: &str) -> ProbeResult<&[f64]> {
        match self.column(name)? {
            Column::Continuous(v) => Ok(v),
            Column::Factor(_) => Err(ProbeError::InvalidOptions(format!(
                "variable `{}` is a factor where a continuous variable is required",
                name
            ))),
        }
    }

    /// Iterate over `(name, column)` pairs in name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Observation weights, if any.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }
}

/// Builder for [`ModelFrame`].
#[derive(Debug, Clone, Default)]
pub struct ModelFrameBuilder {
    columns: Vec<(String, Column)>,
    weights: Option<Vec<f64>>,
}

impl ModelFrameBuilder {
    /// Add a numeric column.
    pub fn continuous(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push((name.into(), Column::Continuous(values)));
        self
    }

    /// Add a categorical column.
    pub fn factor(mut self, name: impl Into<String>, factor: FactorColumn) -> Self {
        self.columns.push((name.into(), Column::Factor(factor)));
        self
    }

    /// Set observation weights.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Validate and build the frame.
    pub fn build(self) -> ProbeResult<ModelFrame> {
        let n_rows = self.columns.first().map_or(0, |(_, c)| c.len());
        let mut columns = BTreeMap::new();
        for (name, column) in self.columns {
            if column.len() != n_rows {
                return Err(ProbeError::DimensionMismatch {
                    what: "model frame column length",
                    expected: n_rows,
                    got: column.len(),
                });
            }
            if let Column::Continuous(ref v) = column {
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(ProbeError::degenerate(
                        &name,
                        "column contains non-finite values",
                    ));
                }
            }
            if columns.insert(name.clone(), column).is_some() {
                return Err(ProbeError::InvalidOptions(format!(
                    "duplicate column `{}`",
                    name
                )));
            }
        }

        if let Some(ref w) = self.weights {
            if w.len() != n_rows {
                return Err(ProbeError::DimensionMismatch {
                    what: "observation weights",
                    expected: n_rows,
                    got: w.len(),
                });
            }
            if w.iter().any(|&wi| !wi.is_finite() || wi < 0.0) {
                return Err(ProbeError::degenerate(
                    "(weights)",
                    "weights must be finite and non-negative",
                ));
            }
            if w.iter().sum::<f64>() <= 0.0 {
                return Err(ProbeError::degenerate(
                    "(weights)",
                    "weights sum to zero",
                ));
            }
        }

        Ok(ModelFrame {
            columns,
            weights: self.weights,
            n_rows,
        })
    }
}
