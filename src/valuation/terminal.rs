//! Perpetuity-growth terminal value

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::error::DcfError;
use crate::projection::YearlyRecord;

/// Terminal value components at the end of the explicit period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalValue {
    /// NOPAT of the first year beyond the horizon
    pub nopat: f64,

    /// Share of terminal NOPAT reinvested to sustain terminal growth
    pub reinvestment_rate: f64,

    pub fcff: f64,

    /// Value at the end of the final projection year
    pub value: f64,

    /// Value discounted with the final year's discount factor
    pub present_value: f64,
}

/// Reinvestment rate implied by terminal growth and terminal ROIC.
///
/// A non-positive ROIC yields zero reinvestment rather than a division
/// by zero or a negative rate.
pub fn reinvestment_rate(terminal_growth: f64, terminal_roic: f64) -> f64 {
    if terminal_roic > 0.0 {
        terminal_growth / terminal_roic
    } else {
        0.0
    }
}

impl TerminalValue {
    /// Extend the final projected year into a growing perpetuity
    pub fn from_final_year(
        assumptions: &AssumptionSet,
        final_year: &YearlyRecord,
    ) -> Result<Self, DcfError> {
        let growth = assumptions.terminal_growth;
        let spread = assumptions.wacc - growth;

        // Also rejects NaN
        if !(spread > 0.0) {
            return Err(DcfError::invalid(
                "wacc",
                format!(
                    "WACC ({}) must exceed terminal growth ({})",
                    assumptions.wacc, growth
                ),
            ));
        }

        let nopat = final_year.nopat * (1.0 + growth);
        let reinvestment_rate = reinvestment_rate(growth, assumptions.terminal_roic);
        let fcff = nopat * (1.0 - reinvestment_rate);
        let value = fcff / spread;
        let present_value = value * final_year.discount_factor;

        debug!(
            "terminal: nopat={:.2} reinvestment_rate={:.4} fcff={:.2} value={:.2} pv={:.2}",
            nopat, reinvestment_rate, fcff, value, present_value
        );

        Ok(Self {
            nopat,
            reinvestment_rate,
            fcff,
            value,
            present_value,
        })
    }
}
