//! Terminal value, enterprise-to-equity bridge and per-share value
//!
//! Takes the explicit-period projection and assembles the final valuation:
//! 1. **Terminal value**: growing perpetuity on first post-horizon NOPAT,
//!    net of the reinvestment implied by terminal ROIC
//! 2. **Enterprise value**: discounted explicit FCFF plus discounted terminal value
//! 3. **Equity bridge**: enterprise value less debt plus cash, per share,
//!    then the margin-of-safety haircut and upside against market price

mod terminal;
mod implied;

pub use terminal::{reinvestment_rate, TerminalValue};
pub use implied::implied_wacc;

use serde::{Deserialize, Serialize};

use crate::assumptions::{AssumptionSet, MAX_HORIZON};
use crate::error::DcfError;
use crate::projection::ProjectionResult;

/// Final valuation of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Sum of discounted FCFF over the explicit period
    pub explicit_value: f64,

    pub terminal: TerminalValue,

    pub enterprise_value: f64,
    pub equity_value: f64,
    pub value_per_share: f64,

    /// Per-share value after the safety-margin haircut
    pub margin_adjusted_value: f64,

    /// Market price the upside was measured against
    pub current_price: Option<f64>,

    /// (value - price) / price; `None` when no positive price was supplied
    pub upside: Option<f64>,
}

impl ValuationResult {
    pub fn pv_terminal_value(&self) -> f64 {
        self.terminal.present_value
    }
}

/// Projection table together with the valuation built from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub projection: ProjectionResult,
    pub result: ValuationResult,
}

/// Check the assumptions that do not depend on a projected year
pub fn validate(assumptions: &AssumptionSet) -> Result<(), DcfError> {
    check_horizon(assumptions.horizon)?;
    if !(assumptions.wacc > assumptions.terminal_growth) {
        return Err(DcfError::invalid(
            "wacc",
            format!(
                "WACC ({}) must exceed terminal growth ({})",
                assumptions.wacc, assumptions.terminal_growth
            ),
        ));
    }
    if assumptions.shares_outstanding == 0.0 {
        return Err(DcfError::invalid("shares_outstanding", "must not be zero"));
    }
    Ok(())
}

/// Reject an empty projection period or one beyond [`MAX_HORIZON`]
pub fn check_horizon(horizon: u32) -> Result<(), DcfError> {
    if horizon == 0 {
        return Err(DcfError::invalid("horizon", "must be at least one year"));
    }
    if horizon > MAX_HORIZON {
        return Err(DcfError::invalid(
            "horizon",
            format!("{} years exceeds the limit of {}", horizon, MAX_HORIZON),
        ));
    }
    Ok(())
}

/// Upside of `value` against a market price; "not applicable" without a positive price
pub fn upside(value: f64, current_price: Option<f64>) -> Option<f64> {
    match current_price {
        Some(price) if price > 0.0 => Some((value - price) / price),
        _ => None,
    }
}

/// Assemble the valuation from a completed projection
pub fn aggregate(
    assumptions: &AssumptionSet,
    projection: &ProjectionResult,
    current_price: Option<f64>,
) -> Result<ValuationResult, DcfError> {
    let final_year = projection
        .last()
        .ok_or_else(|| DcfError::invalid("horizon", "projection has no years"))?;

    let terminal = TerminalValue::from_final_year(assumptions, final_year)?;

    if assumptions.shares_outstanding == 0.0 {
        return Err(DcfError::invalid("shares_outstanding", "must not be zero"));
    }

    let explicit_value = projection.explicit_value();
    let enterprise_value = explicit_value + terminal.present_value;
    let equity_value = enterprise_value - assumptions.debt + assumptions.cash;
    let value_per_share = equity_value / assumptions.shares_outstanding;
    let margin_adjusted_value = value_per_share * (1.0 - assumptions.safety_margin);

    Ok(ValuationResult {
        explicit_value,
        terminal,
        enterprise_value,
        equity_value,
        value_per_share,
        margin_adjusted_value,
        current_price,
        upside: upside(value_per_share, current_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ProjectionConfig, ProjectionEngine, ReinvestmentPolicy};
    use approx::assert_relative_eq;

    fn scenario() -> AssumptionSet {
        AssumptionSet::flat(5, 100.0, 100.0, 0.20, 0.25, 1.0, 0.05, 0.09, 0.02, 0.15)
            .with_balance_sheet(20.0, 5.0, 10.0)
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let a = scenario();
        let valuation = ProjectionEngine::default().value(&a, None).unwrap();
        let r = &valuation.result;

        assert_eq!(valuation.projection.len(), 5);
        assert_relative_eq!(r.explicit_value, valuation.projection.explicit_value());
        assert_relative_eq!(r.enterprise_value, r.explicit_value + r.pv_terminal_value(), epsilon = 1e-9);
        assert_relative_eq!(r.equity_value, r.enterprise_value - 15.0, epsilon = 1e-9);
        assert_relative_eq!(r.value_per_share, r.equity_value / 10.0, epsilon = 1e-9);
        assert!(r.value_per_share.is_finite());
        assert!(r.value_per_share > 0.0);
        assert_eq!(r.upside, None);
        assert_eq!(r.current_price, None);
    }

    #[test]
    fn test_reference_scenario_value_by_hand() {
        let a = scenario();
        let r = ProjectionEngine::default().value(&a, None).unwrap().result;

        let mut revenue: f64 = 100.0;
        let mut explicit = 0.0;
        let mut last_nopat = 0.0;
        for year in 1..=5 {
            let prior = revenue;
            revenue *= 1.05;
            last_nopat = revenue * 0.15;
            explicit += (last_nopat - (revenue - prior)) / 1.09_f64.powi(year);
        }
        let tv = last_nopat * 1.02 * (1.0 - 0.02 / 0.15) / 0.07;
        let ev = explicit + tv / 1.09_f64.powi(5);
        let per_share = (ev - 20.0 + 5.0) / 10.0;

        assert_relative_eq!(r.explicit_value, explicit, epsilon = 1e-9);
        assert_relative_eq!(r.value_per_share, per_share, epsilon = 1e-9);
    }

    #[test]
    fn test_safety_margin_haircut() {
        let a = scenario().with_safety_margin(0.25);
        let r = ProjectionEngine::default().value(&a, None).unwrap().result;
        assert_relative_eq!(r.margin_adjusted_value, r.value_per_share * 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_upside_against_price() {
        let a = scenario();
        let base = ProjectionEngine::default().value(&a, None).unwrap().result;
        let price = base.value_per_share / 2.0;

        let r = ProjectionEngine::default().value(&a, Some(price)).unwrap().result;
        assert_relative_eq!(r.upside.unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_price_upside_not_applicable() {
        let a = scenario();
        let r = ProjectionEngine::default().value(&a, Some(0.0)).unwrap().result;
        assert_eq!(r.upside, None);
        assert_eq!(upside(12.0, Some(-3.0)), None);
        assert_eq!(upside(12.0, None), None);
    }

    #[test]
    fn test_zero_shares_rejected() {
        let a = scenario().with_balance_sheet(20.0, 5.0, 0.0);
        let err = ProjectionEngine::default().value(&a, None).unwrap_err();
        assert!(matches!(
            err,
            DcfError::InvalidAssumption { field: "shares_outstanding", .. }
        ));
    }

    #[test]
    fn test_wacc_guard_before_projection() {
        let mut a = scenario();
        a.wacc = a.terminal_growth;
        let err = ProjectionEngine::default().value(&a, None).unwrap_err();
        assert!(err.is_invalid_assumption());

        a.wacc = a.terminal_growth + 0.0001;
        let r = ProjectionEngine::default().value(&a, None).unwrap().result;
        assert!(r.terminal.value.is_finite());
        assert!(r.terminal.value > r.explicit_value * 100.0);
    }

    #[test]
    fn test_forward_policy_values_differently() {
        let a = scenario();
        let backward = ProjectionEngine::default().value(&a, None).unwrap().result;
        let forward = ProjectionEngine::new(ProjectionConfig::with_policy(
            ReinvestmentPolicy::ForwardLooking,
        ))
        .value(&a, None)
        .unwrap()
        .result;

        assert!(forward.value_per_share.is_finite());
        assert_ne!(backward.value_per_share, forward.value_per_share);
    }

    #[test]
    fn test_horizon_limit() {
        let mut a = scenario();
        a.horizon = MAX_HORIZON;
        let r = ProjectionEngine::default().value(&a, None).unwrap();
        assert_eq!(r.projection.len(), MAX_HORIZON as usize);

        a.horizon = MAX_HORIZON + 1;
        let err = ProjectionEngine::default().value(&a, None).unwrap_err();
        assert!(matches!(err, DcfError::InvalidAssumption { field: "horizon", .. }));
    }

    #[test]
    fn test_huge_saved_horizon_is_an_invalid_assumption() {
        let doc = crate::SettingsDocument::from_json_str(r#"{"projectie_jaren": 4000000000}"#)
            .unwrap();
        let err = ProjectionEngine::default()
            .value(&doc.to_assumptions(), None)
            .unwrap_err();
        assert!(matches!(err, DcfError::InvalidAssumption { field: "horizon", .. }));
    }

    #[test]
    fn test_aggregate_requires_a_year() {
        let a = scenario();
        assert!(aggregate(&a, &ProjectionResult::default(), None).is_err());
    }
}
