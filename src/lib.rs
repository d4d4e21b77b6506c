//! DCF Valuation - discounted cash flow engine with dynamic driver overrides
//!
//! This library provides:
//! - Year-by-year projection of revenue, margins, taxes, reinvestment and FCFF
//! - Terminal value with ROIC-linked reinvestment and the equity bridge
//! - Batch, sensitivity and implied-WACC runs
//! - Settings import/export, price lookup, history log and report rendering

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod valuation;
pub mod scenario;
pub mod integrations;

// Re-export commonly used types
pub use error::DcfError;
pub use assumptions::{AssumptionSet, MAX_HORIZON, DynamicAdjustment, SettingsDocument, CompanyProfile};
pub use projection::{ProjectionEngine, ProjectionConfig, ProjectionResult, ReinvestmentPolicy, YearlyRecord};
pub use valuation::{Valuation, ValuationResult};
pub use scenario::ScenarioRunner;
