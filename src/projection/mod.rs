//! Projection engine for the explicit forecast period

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::{discount_factor, ProjectionConfig, ProjectionEngine, ReinvestmentPolicy};
pub use records::{ProjectionResult, YearlyRecord};
