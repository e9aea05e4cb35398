//! Moderator value selection and centering.

mod centering;
mod selector;

pub use centering::{CenteringEntry, CenteringPlan, VariableRole};
pub use selector::{GridPoint, ModeratorGrid, ModeratorValueSelector};
