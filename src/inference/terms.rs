//! Term detection and multiplier construction.
//!
//! Coefficient names follow the usual model-formula convention: products are
//! joined with `:` in any order (`x:m`, `m:x:w`), and treatment-coded factor
//! dummies are named `<factor><level>` (`regionSouth`). Each name is parsed
//! into components that resolve against the model frame, so conditional
//! slopes and intercepts can be written as linear combinations of the
//! coefficients without relying on a fixed coefficient order.

use crate::core::{Column, ModelFrame, ModelSummary, ProbeError, ProbeResult};
use crate::moderation::CenteringPlan;
use faer::Col;
use std::collections::{BTreeSet, HashMap};

/// What one `:`-separated part of a coefficient name refers to.
#[derive(Debug, Clone, PartialEq)]
enum Component {
    Continuous(String),
    Dummy { factor: String, level: String },
    Unresolved(String),
}

impl Component {
    fn variable(&self) -> &str {
        match self {
            Self::Continuous(name) | Self::Unresolved(name) => name,
            Self::Dummy { factor, .. } => factor,
        }
    }
}

#[derive(Debug, Clone)]
struct Term {
    coefficient: String,
    components: Vec<Component>,
}

impl Term {
    fn variables(&self) -> BTreeSet<&str> {
        self.components.iter().map(Component::variable).collect()
    }
}

/// A moderator held fixed while forming a linear combination.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedValue {
    /// Raw value of a continuous moderator.
    Continuous(f64),
    /// Selected level of a factor moderator.
    Level(String),
}

/// Values for every component of every term.
///
/// The focal predictor takes `pred_value` (only used by intercepts), fixed
/// moderators take their assigned values, continuous covariates take their
/// centering offset and covariate factor dummies are at the reference level.
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    pred: &'a str,
    pred_value: f64,
    fixed: HashMap<&'a str, FixedValue>,
    plan: &'a CenteringPlan,
}

impl<'a> Assignment<'a> {
    /// Start an assignment for focal predictor `pred`.
    pub fn new(pred: &'a str, plan: &'a CenteringPlan) -> Self {
        Self {
            pred,
            pred_value: plan.offset(pred),
            fixed: HashMap::new(),
            plan,
        }
    }

    /// Hold a moderator at a value.
    pub fn fix(mut self, variable: &'a str, value: FixedValue) -> Self {
        self.fixed.insert(variable, value);
        self
    }

    fn value(&self, term: &Term, component: &Component) -> ProbeResult<f64> {
        match component {
            Component::Continuous(name) => {
                if name == self.pred {
                    return Ok(self.pred_value);
                }
                match self.fixed.get(name.as_str()) {
                    Some(FixedValue::Continuous(v)) => Ok(*v),
                    Some(FixedValue::Level(_)) => Err(ProbeError::InvalidOptions(format!(
                        "continuous variable `{}` was assigned a factor level",
                        name
                    ))),
                    None => Ok(self.plan.offset(name)),
                }
            }
            Component::Dummy { factor, level } => match self.fixed.get(factor.as_str()) {
                Some(FixedValue::Level(selected)) => Ok(if selected == level { 1.0 } else { 0.0 }),
                Some(FixedValue::Continuous(_)) => Err(ProbeError::InvalidOptions(format!(
                    "factor `{}` was assigned a numeric value",
                    factor
                ))),
                None => Ok(0.0),
            },
            Component::Unresolved(part) => Err(ProbeError::UnknownTermComponent {
                coefficient: term.coefficient.clone(),
                component: part.clone(),
            }),
        }
    }
}

/// Parsed coefficient names of a fitted model.
#[derive(Debug, Clone)]
pub struct TermIndex {
    terms: Vec<Term>,
}

impl TermIndex {
    /// Parse every coefficient name of `model` against the columns of `frame`.
    pub fn new<M: ModelSummary + ?Sized>(model: &M, frame: &ModelFrame) -> ProbeResult<Self> {
        let intercept = model.intercept_name();
        let mut terms = Vec::with_capacity(model.coefficient_names().len());

        for name in model.coefficient_names() {
            let components = if Some(name.as_str()) == intercept {
                Vec::new()
            } else {
                let components: Vec<Component> =
                    name.split(':').map(|part| resolve(part, frame)).collect();
                let distinct: BTreeSet<&str> =
                    components.iter().map(Component::variable).collect();
                if distinct.len() != components.len() {
                    return Err(ProbeError::InvalidOptions(format!(
                        "coefficient `{}` repeats a variable; polynomial terms are not supported",
                        name
                    )));
                }
                components
            };
            terms.push(Term {
                coefficient: name.clone(),
                components,
            });
        }

        log::debug!("parsed {} coefficient terms", terms.len());
        Ok(Self { terms })
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the model has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Variables the model's terms resolve to, sorted and without duplicates.
    ///
    /// Factor dummies count as their factor; unresolved parts are left out.
    pub fn variables(&self) -> Vec<&str> {
        let mut variables: BTreeSet<&str> = BTreeSet::new();
        for term in &self.terms {
            for component in &term.components {
                if !matches!(component, Component::Unresolved(_)) {
                    variables.insert(component.variable());
                }
            }
        }
        variables.into_iter().collect()
    }

    /// Coefficient names whose variables are exactly `variables` (in any order).
    pub fn terms_for(&self, variables: &[&str]) -> Vec<&str> {
        let wanted: BTreeSet<&str> = variables.iter().copied().collect();
        self.terms
            .iter()
            .filter(|t| !t.components.is_empty() && t.variables() == wanted)
            .map(|t| t.coefficient.as_str())
            .collect()
    }

    /// Fail with [`ProbeError::MissingTerm`] unless the product of `variables` is in the model.
    pub fn require(&self, variables: &[&str]) -> ProbeResult<()> {
        if self.terms_for(variables).is_empty() {
            return Err(ProbeError::MissingTerm {
                term: variables.join(":"),
            });
        }
        Ok(())
    }

    /// Multipliers for the slope of the focal predictor under `assignment`.
    ///
    /// Each term containing the focal predictor contributes the product of its
    /// other components' values; every other term contributes zero.
    pub fn slope_multipliers(&self, assignment: &Assignment<'_>) -> ProbeResult<Col<f64>> {
        let mut m = Col::zeros(self.terms.len());
        for (i, term) in self.terms.iter().enumerate() {
            if !term.variables().contains(assignment.pred) {
                continue;
            }
            let mut weight = 1.0;
            for component in &term.components {
                if component.variable() == assignment.pred {
                    continue;
                }
                weight *= assignment.value(term, component)?;
            }
            m[i] = weight;
        }
        Ok(m)
    }

    /// Multipliers for the conditional intercept under `assignment`.
    ///
    /// Every term contributes the product of all its components' values, the
    /// focal predictor taking its own offset. The model intercept contributes one.
    pub fn intercept_multipliers(&self, assignment: &Assignment<'_>) -> ProbeResult<Col<f64>> {
        let mut m = Col::zeros(self.terms.len());
        for (i, term) in self.terms.iter().enumerate() {
            let mut weight = 1.0;
            for component in &term.components {
                weight *= assignment.value(term, component)?;
            }
            m[i] = weight;
        }
        Ok(m)
    }
}

fn resolve(part: &str, frame: &ModelFrame) -> Component {
    if let Ok(column) = frame.column(part) {
        if let Column::Continuous(_) = column {
            return Component::Continuous(part.to_string());
        }
    }
    for (name, column) in frame.columns() {
        if let Column::Factor(f) = column {
            if let Some(level) = part.strip_prefix(name) {
                if f.levels().iter().skip(1).any(|l| l == level) {
                    return Component::Dummy {
                        factor: name.to_string(),
                        level: level.to_string(),
                    };
                }
            }
        }
    }
    Component::Unresolved(part.to_string())
}
