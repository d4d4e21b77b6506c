//! Scenario runner for batch and sensitivity valuations
//!
//! Every valuation is independent, so batches are spread across threads
//! with rayon without any coordination.

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::AssumptionSet;
use crate::error::DcfError;
use crate::projection::{ProjectionConfig, ProjectionEngine};
use crate::valuation::Valuation;

/// One cell of a WACC x terminal-growth sensitivity grid
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityCell {
    pub wacc: f64,
    pub terminal_growth: f64,

    /// Per-share value, or the reason this combination could not be valued
    pub value_per_share: Result<f64, String>,
}

/// Per-share values over a WACC x terminal-growth grid, row-major by WACC
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityGrid {
    pub wacc_values: Vec<f64>,
    pub terminal_growth_values: Vec<f64>,
    pub cells: Vec<SensitivityCell>,
}

impl SensitivityGrid {
    pub fn get(&self, wacc_index: usize, growth_index: usize) -> Option<&SensitivityCell> {
        if growth_index >= self.terminal_growth_values.len() {
            return None;
        }
        self.cells
            .get(wacc_index * self.terminal_growth_values.len() + growth_index)
    }
}

/// Valuation runner around a base assumption set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(assumptions, ProjectionConfig::default());
/// let grid = runner.sensitivity(&[0.08, 0.09, 0.10], &[0.01, 0.02, 0.03]);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_assumptions: AssumptionSet,
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(base_assumptions: AssumptionSet, config: ProjectionConfig) -> Self {
        Self {
            base_assumptions,
            engine: ProjectionEngine::new(config),
        }
    }

    /// Value the base assumptions
    pub fn run(&self, current_price: Option<f64>) -> Result<Valuation, DcfError> {
        self.engine.value(&self.base_assumptions, current_price)
    }

    /// Value many assumption sets in parallel; results keep the input order
    pub fn run_batch(&self, scenarios: &[AssumptionSet]) -> Vec<Result<Valuation, DcfError>> {
        info!("Running {} valuations", scenarios.len());
        scenarios
            .par_iter()
            .map(|assumptions| self.engine.value(assumptions, None))
            .collect()
    }

    /// Re-value the base case across WACC and terminal growth values.
    /// Invalid combinations (e.g. WACC at or below growth) are reported per cell.
    pub fn sensitivity(&self, wacc_values: &[f64], terminal_growth_values: &[f64]) -> SensitivityGrid {
        let pairs: Vec<(f64, f64)> = wacc_values
            .iter()
            .flat_map(|&w| terminal_growth_values.iter().map(move |&g| (w, g)))
            .collect();

        info!(
            "Running {}x{} sensitivity grid",
            wacc_values.len(),
            terminal_growth_values.len()
        );

        let cells = pairs
            .par_iter()
            .map(|&(wacc, terminal_growth)| {
                let mut assumptions = self.base_assumptions.clone();
                assumptions.wacc = wacc;
                assumptions.terminal_growth = terminal_growth;
                let value_per_share = self
                    .engine
                    .value(&assumptions, None)
                    .map(|v| v.result.value_per_share)
                    .map_err(|e| e.to_string());
                SensitivityCell {
                    wacc,
                    terminal_growth,
                    value_per_share,
                }
            })
            .collect();

        SensitivityGrid {
            wacc_values: wacc_values.to_vec(),
            terminal_growth_values: terminal_growth_values.to_vec(),
            cells,
        }
    }

    /// Get reference to base assumptions for inspection
    pub fn assumptions(&self) -> &AssumptionSet {
        &self.base_assumptions
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }
}
