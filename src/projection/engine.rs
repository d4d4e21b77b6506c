//! Core projection engine for annual free cash flow projections

use log::debug;
use serde::{Deserialize, Serialize};

use super::records::{ProjectionResult, YearlyRecord};
use super::state::ProjectionState;
use crate::assumptions::AssumptionSet;
use crate::error::DcfError;
use crate::valuation::{self, Valuation};

/// How yearly reinvestment is derived from the sales-to-capital ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReinvestmentPolicy {
    /// Capital required by this year's revenue, less capital already in place.
    /// Invested capital moves to the required level within the year.
    #[default]
    #[serde(rename = "backward", alias = "backward-looking")]
    BackwardLooking,

    /// Capital needed to fund next year's revenue growth, invested this year.
    /// Next-year growth is the terminal growth rate in the final year.
    /// Invested capital lags the backward policy by one year.
    #[serde(rename = "forward", alias = "forward-looking")]
    ForwardLooking,
}

impl std::str::FromStr for ReinvestmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backward" | "backward-looking" => Ok(ReinvestmentPolicy::BackwardLooking),
            "forward" | "forward-looking" => Ok(ReinvestmentPolicy::ForwardLooking),
            other => Err(format!("Unknown reinvestment policy: {}", other)),
        }
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, Default)]
pub struct ProjectionConfig {
    /// Reinvestment timing
    pub reinvestment: ReinvestmentPolicy,
}

impl ProjectionConfig {
    pub fn with_policy(reinvestment: ReinvestmentPolicy) -> Self {
        Self { reinvestment }
    }
}

/// Discount factor for a cash flow at the end of `year`
pub fn discount_factor(wacc: f64, year: u32) -> f64 {
    match i32::try_from(year) {
        Ok(exponent) => 1.0 / (1.0 + wacc).powi(exponent),
        Err(_) => 1.0 / (1.0 + wacc).powf(f64::from(year)),
    }
}

/// Main projection engine
///
/// Holds configuration only; every call works on the assumption set it is
/// given and keeps nothing between calls.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project the explicit period and value the company.
    ///
    /// Assumptions that can be checked without projecting are validated
    /// first, so a failure never leaves a partial projection behind.
    pub fn value(
        &self,
        assumptions: &AssumptionSet,
        current_price: Option<f64>,
    ) -> Result<Valuation, DcfError> {
        valuation::validate(assumptions)?;
        let projection = self.project(assumptions)?;
        let result = valuation::aggregate(assumptions, &projection, current_price)?;

        Ok(Valuation { projection, result })
    }

    /// Run the explicit-period projection
    pub fn project(&self, assumptions: &AssumptionSet) -> Result<ProjectionResult, DcfError> {
        valuation::check_horizon(assumptions.horizon)?;

        let mut result = ProjectionResult::with_capacity(assumptions.horizon);
        let mut state = ProjectionState::from_assumptions(assumptions);

        for _year in 1..=assumptions.horizon {
            let record = self.project_year(assumptions, &mut state)?;
            result.add_record(record);
        }

        Ok(result)
    }

    /// Calculate a single year and advance the state
    fn project_year(
        &self,
        assumptions: &AssumptionSet,
        state: &mut ProjectionState,
    ) -> Result<YearlyRecord, DcfError> {
        let year = state.next_year();
        let drivers = assumptions.drivers_for_year(year);

        if drivers.sales_to_capital == 0.0 {
            return Err(DcfError::invalid_in_year(
                "sales_to_capital",
                year,
                "ratio resolved to zero",
            ));
        }

        let revenue = state.revenue * (1.0 + drivers.growth);
        let ebit = revenue * drivers.margin;
        let nopat = ebit * (1.0 - drivers.tax_rate);

        let override_investment = if year == 1 {
            assumptions.initial_investment
        } else {
            None
        };

        // (investment, capital reported for the year, capital carried forward)
        let (investment, reported_capital, carried_capital) = match self.config.reinvestment {
            ReinvestmentPolicy::BackwardLooking => {
                let (investment, capital) = match override_investment {
                    Some(amount) => (amount, state.invested_capital + amount),
                    None => {
                        let required = revenue / drivers.sales_to_capital;
                        (required - state.invested_capital, required)
                    }
                };
                (investment, capital, capital)
            }
            ReinvestmentPolicy::ForwardLooking => {
                let investment = match override_investment {
                    Some(amount) => amount,
                    None => {
                        let next_growth = if year == assumptions.horizon {
                            assumptions.terminal_growth
                        } else {
                            assumptions.growth_for_year(year + 1)
                        };
                        let next_revenue = revenue * (1.0 + next_growth);
                        (next_revenue - revenue) / drivers.sales_to_capital
                    }
                };
                (
                    investment,
                    state.invested_capital,
                    state.invested_capital + investment,
                )
            }
        };

        let fcff = nopat - investment;
        let discount_factor = discount_factor(assumptions.wacc, year);
        let pv_fcff = fcff * discount_factor;

        debug!(
            "year {}: revenue={:.2} nopat={:.2} investment={:.2} fcff={:.2} pv={:.2}",
            year, revenue, nopat, investment, fcff, pv_fcff
        );

        state.advance(revenue, carried_capital);

        Ok(YearlyRecord {
            year,
            revenue,
            ebit,
            nopat,
            invested_capital: reported_capital,
            investment,
            fcff,
            discount_factor,
            pv_fcff,
            applied_growth: drivers.growth,
            applied_margin: drivers.margin,
            applied_tax_rate: drivers.tax_rate,
            applied_sales_to_capital: drivers.sales_to_capital,
        })
    }
}
