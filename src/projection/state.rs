//! Values carried from one projection year to the next

use crate::assumptions::AssumptionSet;

/// Running state of a projection between years
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    /// Year just completed (0 before the first year)
    pub year: u32,

    /// Revenue of the year just completed (base revenue at year 0)
    pub revenue: f64,

    /// Invested capital carried into the next year
    pub invested_capital: f64,
}

impl ProjectionState {
    /// Initialize state from the year-0 baseline
    pub fn from_assumptions(assumptions: &AssumptionSet) -> Self {
        Self {
            year: 0,
            revenue: assumptions.base_revenue,
            invested_capital: assumptions.base_invested_capital,
        }
    }

    /// Year about to be projected
    pub fn next_year(&self) -> u32 {
        self.year + 1
    }

    /// Record the close of a year
    pub fn advance(&mut self, revenue: f64, invested_capital: f64) {
        self.year += 1;
        self.revenue = revenue;
        self.invested_capital = invested_capital;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_carries_values() {
        let a = AssumptionSet::flat(5, 100.0, 80.0, 0.2, 0.25, 1.0, 0.05, 0.09, 0.02, 0.15);
        let mut state = ProjectionState::from_assumptions(&a);
        assert_eq!(state.next_year(), 1);
        assert_eq!(state.invested_capital, 80.0);

        state.advance(105.0, 105.0);
        assert_eq!(state.year, 1);
        assert_eq!(state.next_year(), 2);
        assert_eq!(state.revenue, 105.0);
    }
}
