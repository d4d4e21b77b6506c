//! Output structures for the explicit projection period

use serde::{Deserialize, Serialize};

use crate::assumptions::MAX_HORIZON;

/// One projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    /// Projection year (1-indexed)
    pub year: u32,

    // P&L
    pub revenue: f64,
    pub ebit: f64,
    pub nopat: f64,

    /// Invested capital as reported for the year.
    /// End-of-year under the backward-looking policy, beginning-of-year
    /// under the forward-looking policy.
    pub invested_capital: f64,

    /// Reinvestment for the year
    pub investment: f64,

    // Cash flow
    pub fcff: f64,
    pub discount_factor: f64,
    pub pv_fcff: f64,

    // Drivers actually applied this year
    pub applied_growth: f64,
    pub applied_margin: f64,
    pub applied_tax_rate: f64,
    pub applied_sales_to_capital: f64,
}

/// Ordered yearly records of one projection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub records: Vec<YearlyRecord>,
}

impl ProjectionResult {
    pub fn with_capacity(horizon: u32) -> Self {
        let capacity = horizon.min(MAX_HORIZON) as usize;
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn add_record(&mut self, record: YearlyRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&YearlyRecord> {
        self.records.last()
    }

    /// Sum of discounted FCFF over the explicit period
    pub fn explicit_value(&self) -> f64 {
        self.records.iter().map(|r| r.pv_fcff).sum()
    }
}

