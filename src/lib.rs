//! Probing interaction effects in fitted regression models.
//!
//! Given the coefficients and covariance matrix of a model with an
//! interaction term, this library reports the conditional effect of a focal
//! predictor at selected moderator values (simple slopes) and the moderator
//! ranges over which that effect is statistically significant
//! (Johnson-Neyman intervals), optionally with a false discovery rate
//! adjusted critical value.
//!
//! # Example
//!
//! ```rust,ignore
//! use anofox_interactions::prelude::*;
//!
//! // Summary of a fitted `Income ~ Illiteracy * Murder` model
//! let summary = FittedModelSummary::builder()
//!     .coefficients(names, estimates)
//!     .covariance(vcov)
//!     .degrees_of_freedom(DegreesOfFreedom::Finite(46))
//!     .build()?;
//!
//! let frame = ModelFrame::builder()
//!     .continuous("Illiteracy", illiteracy)
//!     .continuous("Murder", murder)
//!     .build()?;
//!
//! let options = ProbeOptions::builder("Illiteracy", "Murder").build()?;
//! let result = SimpleSlopesEngine::new(options)
//!     .with_johnson_neyman(JohnsonNeymanOptions::default())
//!     .analyze(&summary, &frame)?;
//!
//! for row in &result.slopes {
//!     println!("{}: {:.2} ({:.2})", row.modx.label, row.slope.estimate, row.slope.std_error);
//! }
//! println!("significant {:?} {:?}", result.johnson_neyman[0].region, result.johnson_neyman[0].bound_values());
//! ```

pub mod core;
pub mod distributions;
pub mod inference;
pub mod moderation;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CenteringPolicy, Column, ConditionalEffect, DegreesOfFreedom, DistributionFamily,
        ErrorKind, FactorColumn, FittedModelSummary, JnBoundary, JohnsonNeymanInterval,
        JohnsonNeymanOptions, ModelFrame, ModelSummary, ModeratorPoint, ModeratorValue,
        ModeratorValues, ProbeError, ProbeOptions, ProbeResult, SignificanceRegion, SlopeBand,
    };
    pub use crate::distributions::ReferenceDistribution;
    pub use crate::inference::LinearHypothesis;
    pub use crate::moderation::{CenteringPlan, ModeratorValueSelector};
    pub use crate::solvers::{
        CriticalValueAdjuster, FdrCorrector, JohnsonNeymanSolver, SimpleSlope,
        SimpleSlopesEngine, SimpleSlopesResult,
    };
}

pub use crate::core::{
    DegreesOfFreedom, DistributionFamily, ErrorKind, FittedModelSummary, JohnsonNeymanOptions,
    ModelFrame, ModelSummary, ProbeError, ProbeOptions, ProbeResult,
};
pub use crate::solvers::{FdrCorrector, JohnsonNeymanSolver, SimpleSlopesEngine};
