//! Validation and shared state for one probe of an interaction.

use crate::core::{
    Column, DegreesOfFreedom, ModelFrame, ModelSummary, ProbeError, ProbeOptions, ProbeResult,
};
use crate::distributions::ReferenceDistribution;
use crate::inference::{Assignment, FixedValue, LinearHypothesis, TermIndex};
use crate::moderation::CenteringPlan;
use faer::{Col, Mat};

/// Everything derived from (model, frame, options) before any conditional
/// effect is evaluated. Built once per analysis call.
#[derive(Debug, Clone)]
pub(crate) struct ProbeContext<'a> {
    pub options: &'a ProbeOptions,
    pub index: TermIndex,
    pub plan: CenteringPlan,
    pub distribution: ReferenceDistribution,
    names: &'a [String],
    coefficients: &'a Col<f64>,
    covariance: &'a Mat<f64>,
}

impl<'a> ProbeContext<'a> {
    pub fn new<M: ModelSummary + ?Sized>(
        model: &'a M,
        frame: &ModelFrame,
        options: &'a ProbeOptions,
    ) -> ProbeResult<Self> {
        let pred = options.pred();
        if frame.column(pred)?.is_factor() {
            return Err(ProbeError::InvalidOptions(format!(
                "focal predictor `{}` must be continuous",
                pred
            )));
        }

        let mut moderators = vec![options.modx()];
        moderators.extend(options.mod2());
        for &moderator in &moderators {
            let column = frame.column(moderator)?;
            if options.standardize() && matches!(column, Column::Factor(_)) {
                return Err(ProbeError::InvalidOptions(format!(
                    "cannot standardize factor moderator `{}`",
                    moderator
                )));
            }
        }

        if let DegreesOfFreedom::Finite(df) = model.degrees_of_freedom() {
            if df >= frame.n_rows() {
                return Err(ProbeError::InsufficientObservations {
                    observations: frame.n_rows(),
                    df,
                });
            }
        }

        let covariance = if options.robust {
            model.robust_covariance().ok_or_else(|| {
                ProbeError::InvalidOptions(
                    "robust covariance requested but the model provides none".to_string(),
                )
            })?
        } else {
            model.covariance()
        };

        let index = TermIndex::new(model, frame)?;
        index.require(&[pred, options.modx()])?;
        if let Some(mod2) = options.mod2() {
            index.require(&[pred, mod2])?;
            index.require(&[pred, options.modx(), mod2])?;
        }

        let plan = CenteringPlan::build(
            frame,
            &index.variables(),
            pred,
            &moderators,
            options.centering(),
            options.standardize(),
        )?;

        log::debug!(
            "probing `{}` by `{}`{}: {} coefficients, {:?}",
            pred,
            options.modx(),
            options
                .mod2()
                .map(|m| format!(" and `{}`", m))
                .unwrap_or_default(),
            index.len(),
            model.reference_distribution()
        );

        Ok(Self {
            options,
            index,
            plan,
            distribution: model.reference_distribution(),
            names: model.coefficient_names(),
            coefficients: model.coefficients(),
            covariance,
        })
    }

    pub fn hypothesis(&self) -> ProbeResult<LinearHypothesis<'a>> {
        LinearHypothesis::new(
            self.names,
            self.coefficients,
            self.covariance,
            self.distribution,
        )
    }

    pub fn assignment(&self, modx: &FixedValue, mod2: Option<&FixedValue>) -> Assignment<'_> {
        let mut assignment =
            Assignment::new(self.options.pred(), &self.plan).fix(self.options.modx(), modx.clone());
        if let (Some(name), Some(value)) = (self.options.mod2(), mod2) {
            assignment = assignment.fix(name, value.clone());
        }
        assignment
    }

    /// Unit conversion for slopes: per SD of the focal predictor when it is standardized.
    pub fn slope_scale(&self) -> f64 {
        self.plan.scale(self.options.pred()).unwrap_or(1.0)
    }
}
