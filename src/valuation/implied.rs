//! Implied discount rate (reverse DCF)
//!
//! Finds the WACC at which the per-share value equals the market price.

use crate::assumptions::AssumptionSet;
use crate::error::DcfError;
use crate::projection::ProjectionEngine;

/// Smallest spread of WACC over terminal growth that is searched
const MIN_SPREAD: f64 = 1e-6;

/// Widest spread of WACC over terminal growth that is searched
const MAX_SPREAD: f64 = 1.0;

/// Calculate the WACC that prices the company at `market_price` per share
/// using the bisection method.
///
/// # Returns
/// * `Ok(Some(wacc))` when a root exists in the search interval
/// * `Ok(None)` when the price is not positive or is not bracketed
/// * `Err` when the assumptions are invalid regardless of the discount rate
pub fn implied_wacc(
    engine: &ProjectionEngine,
    assumptions: &AssumptionSet,
    market_price: f64,
) -> Result<Option<f64>, DcfError> {
    if !(market_price > 0.0) {
        return Ok(None);
    }

    let mut trial = assumptions.clone();
    let mut gap_at = |wacc: f64| -> Result<f64, DcfError> {
        trial.wacc = wacc;
        let valuation = engine.value(&trial, None)?;
        Ok(valuation.result.value_per_share - market_price)
    };

    let mut low = assumptions.terminal_growth + MIN_SPREAD;
    let mut high = assumptions.terminal_growth + MAX_SPREAD;
    let tolerance = 1e-10;
    let max_iterations = 1000;

    let mut gap_low = gap_at(low)?;
    let gap_high = gap_at(high)?;

    // Check that we have a root in this interval
    if gap_low * gap_high > 0.0 {
        return Ok(None);
    }

    for _ in 0..max_iterations {
        let mid = (low + high) / 2.0;
        let gap_mid = gap_at(mid)?;

        if gap_mid.abs() < tolerance || (high - low) / 2.0 < tolerance {
            return Ok(Some(mid));
        }

        if gap_mid * gap_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            gap_low = gap_mid;
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario() -> AssumptionSet {
        AssumptionSet::flat(5, 100.0, 100.0, 0.20, 0.25, 1.0, 0.05, 0.09, 0.02, 0.15)
            .with_balance_sheet(20.0, 5.0, 10.0)
    }

    #[test]
    fn test_recovers_input_wacc() {
        let engine = ProjectionEngine::default();
        let a = scenario();
        let price = engine.value(&a, None).unwrap().result.value_per_share;

        let wacc = implied_wacc(&engine, &a, price).unwrap().unwrap();
        assert_relative_eq!(wacc, 0.09, epsilon = 1e-6);
    }

    #[test]
    fn test_higher_price_implies_lower_wacc() {
        let engine = ProjectionEngine::default();
        let a = scenario();
        let price = engine.value(&a, None).unwrap().result.value_per_share;

        let wacc = implied_wacc(&engine, &a, price * 1.5).unwrap().unwrap();
        assert!(wacc < 0.09);
        assert!(wacc > a.terminal_growth);
    }

    #[test]
    fn test_no_price_no_rate() {
        let engine = ProjectionEngine::default();
        assert_eq!(implied_wacc(&engine, &scenario(), 0.0).unwrap(), None);
    }

    #[test]
    fn test_invalid_assumptions_propagate() {
        let engine = ProjectionEngine::default();
        let a = scenario().with_balance_sheet(20.0, 5.0, 0.0);
        assert!(implied_wacc(&engine, &a, 10.0).is_err());
    }
}
