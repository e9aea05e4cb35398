//! Core types for interaction probing.

mod error;
mod family;
mod frame;
mod model;
mod options;
mod result;

pub use error::{ErrorKind, ProbeError, ProbeResult};
pub use family::{DegreesOfFreedom, DistributionFamily};
pub use frame::{Column, FactorColumn, ModelFrame, ModelFrameBuilder};
pub use model::{FittedModelSummary, FittedModelSummaryBuilder, ModelSummary, DEFAULT_INTERCEPT_NAME};
pub use options::{
    CenteringPolicy, JohnsonNeymanOptions, JohnsonNeymanOptionsBuilder, ModeratorValues,
    ProbeOptions, ProbeOptionsBuilder,
};
pub use result::{
    ConditionalEffect, JnBoundary, JohnsonNeymanInterval, ModeratorPoint, ModeratorValue,
    SignificanceRegion, SlopeBand,
};
