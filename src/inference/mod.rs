//! Statistical inference on conditional effects (linear combinations of coefficients).

mod linear_hypothesis;
mod terms;

pub use linear_hypothesis::LinearHypothesis;
pub use terms::{Assignment, FixedValue, TermIndex};
