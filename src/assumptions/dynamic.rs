//! Step adjustments applied to a base driver from a given projection year

use serde::{Deserialize, Serialize};

/// A one-time step change to a base driver.
///
/// From `start_year` onward the driver equals `base + delta`; before it the
/// base value is used unchanged. The step is not cumulative: year 12 of a
/// rule starting in year 5 still receives a single `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicAdjustment {
    /// First projection year (1-indexed) the delta applies to
    pub start_year: u32,

    /// Amount added to the base value, in the driver's own units
    pub delta: f64,
}

impl DynamicAdjustment {
    pub fn new(start_year: u32, delta: f64) -> Self {
        Self { start_year, delta }
    }

    /// Adjustment that never changes the base value
    pub fn none() -> Self {
        Self { start_year: 1, delta: 0.0 }
    }

    /// Whether the delta is in effect for `year`
    pub fn is_active(&self, year: u32) -> bool {
        year >= self.start_year
    }

    /// Resolve the driver value for `year`.
    ///
    /// Values are not clamped: a tax rate pushed below zero or a margin above
    /// one flows through to the projection as given.
    pub fn resolve(&self, base: f64, year: u32) -> f64 {
        if self.is_active(year) {
            base + self.delta
        } else {
            base
        }
    }
}

impl Default for DynamicAdjustment {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_step_from_year_five() {
        let rule = DynamicAdjustment::new(5, 0.02);

        for year in 1..=4 {
            assert_relative_eq!(rule.resolve(0.05, year), 0.05);
        }
        for year in 5..=10 {
            assert_relative_eq!(rule.resolve(0.05, year), 0.07, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_is_not_cumulative() {
        let rule = DynamicAdjustment::new(2, 0.01);
        assert_relative_eq!(rule.resolve(0.10, 2), rule.resolve(0.10, 30));
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let tax = DynamicAdjustment::new(1, -0.40);
        assert_relative_eq!(tax.resolve(0.25, 1), -0.15, epsilon = 1e-12);

        let margin = DynamicAdjustment::new(3, 0.9);
        assert_relative_eq!(margin.resolve(0.5, 3), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_none_leaves_base_untouched() {
        let rule = DynamicAdjustment::none();
        assert_eq!(rule.resolve(0.95, 1), 0.95);
        assert_eq!(rule.resolve(0.95, 25), 0.95);
    }
}
