//! Valuation assumptions: company baseline, drivers and financial position

mod dynamic;
pub mod settings;

pub use dynamic::DynamicAdjustment;
pub use settings::{CompanyProfile, SettingsDocument};

use serde::{Deserialize, Serialize};

/// Longest explicit projection period the engine accepts, in years
pub const MAX_HORIZON: u32 = 1000;

/// Complete set of inputs for one valuation run.
///
/// Rates, margins and fractions are decimals (0.05 for 5%). Nothing here is
/// defaulted or clamped by the engine; callers build a fresh set per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
    /// Number of explicit projection years, 1..=[`MAX_HORIZON`]
    pub horizon: u32,

    // Year-0 baseline
    pub base_revenue: f64,
    pub base_invested_capital: f64,
    pub base_ebit_margin: f64,
    pub base_tax_rate: f64,
    pub base_sales_to_capital: f64,
    pub base_growth: f64,

    // Discounting and terminal value
    pub wacc: f64,
    pub terminal_growth: f64,
    pub terminal_roic: f64,

    // Equity bridge
    pub shares_outstanding: f64,
    pub debt: f64,
    pub cash: f64,

    /// Haircut applied to the per-share value (0.2 for 20%)
    pub safety_margin: f64,

    /// Manual year-1 investment used in place of the sales-to-capital formula
    #[serde(default)]
    pub initial_investment: Option<f64>,

    #[serde(default)]
    pub growth_adjustment: DynamicAdjustment,
    #[serde(default)]
    pub margin_adjustment: DynamicAdjustment,
    #[serde(default)]
    pub tax_adjustment: DynamicAdjustment,
    #[serde(default)]
    pub sales_to_capital_adjustment: DynamicAdjustment,
}

/// Driver values in effect for a single projection year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearDrivers {
    pub growth: f64,
    pub margin: f64,
    pub tax_rate: f64,
    pub sales_to_capital: f64,
}

impl AssumptionSet {
    /// Flat assumptions with no dynamic adjustments and no year-1 override
    #[allow(clippy::too_many_arguments)]
    pub fn flat(
        horizon: u32,
        base_revenue: f64,
        base_invested_capital: f64,
        base_ebit_margin: f64,
        base_tax_rate: f64,
        base_sales_to_capital: f64,
        base_growth: f64,
        wacc: f64,
        terminal_growth: f64,
        terminal_roic: f64,
    ) -> Self {
        Self {
            horizon,
            base_revenue,
            base_invested_capital,
            base_ebit_margin,
            base_tax_rate,
            base_sales_to_capital,
            base_growth,
            wacc,
            terminal_growth,
            terminal_roic,
            shares_outstanding: 1.0,
            debt: 0.0,
            cash: 0.0,
            safety_margin: 0.0,
            initial_investment: None,
            growth_adjustment: DynamicAdjustment::none(),
            margin_adjustment: DynamicAdjustment::none(),
            tax_adjustment: DynamicAdjustment::none(),
            sales_to_capital_adjustment: DynamicAdjustment::none(),
        }
    }

    /// Set the equity bridge (debt, cash, shares outstanding)
    pub fn with_balance_sheet(mut self, debt: f64, cash: f64, shares_outstanding: f64) -> Self {
        self.debt = debt;
        self.cash = cash;
        self.shares_outstanding = shares_outstanding;
        self
    }

    pub fn with_safety_margin(mut self, safety_margin: f64) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn with_initial_investment(mut self, amount: f64) -> Self {
        self.initial_investment = Some(amount);
        self
    }

    pub fn growth_for_year(&self, year: u32) -> f64 {
        self.growth_adjustment.resolve(self.base_growth, year)
    }

    pub fn margin_for_year(&self, year: u32) -> f64 {
        self.margin_adjustment.resolve(self.base_ebit_margin, year)
    }

    pub fn tax_rate_for_year(&self, year: u32) -> f64 {
        self.tax_adjustment.resolve(self.base_tax_rate, year)
    }

    pub fn sales_to_capital_for_year(&self, year: u32) -> f64 {
        self.sales_to_capital_adjustment
            .resolve(self.base_sales_to_capital, year)
    }

    /// Resolve all four drivers for `year`
    pub fn drivers_for_year(&self, year: u32) -> YearDrivers {
        YearDrivers {
            growth: self.growth_for_year(year),
            margin: self.margin_for_year(year),
            tax_rate: self.tax_rate_for_year(year),
            sales_to_capital: self.sales_to_capital_for_year(year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> AssumptionSet {
        AssumptionSet::flat(10, 100.0, 100.0, 0.20, 0.25, 1.0, 0.05, 0.09, 0.02, 0.15)
    }

    #[test]
    fn test_adjustments_are_independent() {
        let mut a = base();
        a.growth_adjustment = DynamicAdjustment::new(5, 0.02);
        a.margin_adjustment = DynamicAdjustment::new(3, -0.05);
        a.tax_adjustment = DynamicAdjustment::new(7, 0.01);
        a.sales_to_capital_adjustment = DynamicAdjustment::new(2, 0.5);

        let y1 = a.drivers_for_year(1);
        assert_relative_eq!(y1.growth, 0.05);
        assert_relative_eq!(y1.margin, 0.20);
        assert_relative_eq!(y1.tax_rate, 0.25);
        assert_relative_eq!(y1.sales_to_capital, 1.0);

        let y4 = a.drivers_for_year(4);
        assert_relative_eq!(y4.growth, 0.05);
        assert_relative_eq!(y4.margin, 0.15, epsilon = 1e-12);
        assert_relative_eq!(y4.tax_rate, 0.25);
        assert_relative_eq!(y4.sales_to_capital, 1.5);

        let y8 = a.drivers_for_year(8);
        assert_relative_eq!(y8.growth, 0.07, epsilon = 1e-12);
        assert_relative_eq!(y8.tax_rate, 0.26, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_has_no_override() {
        let a = base();
        assert!(a.initial_investment.is_none());
        assert_eq!(a.drivers_for_year(1), a.drivers_for_year(10));
    }

    #[test]
    fn test_builders() {
        let a = base()
            .with_balance_sheet(20.0, 5.0, 10.0)
            .with_safety_margin(0.25)
            .with_initial_investment(12.0);
        assert_eq!(a.debt, 20.0);
        assert_eq!(a.cash, 5.0);
        assert_eq!(a.shares_outstanding, 10.0);
        assert_eq!(a.safety_margin, 0.25);
        assert_eq!(a.initial_investment, Some(12.0));
    }
}
