//! JSON settings documents for saving and reloading an analysis
//!
//! The document keeps the key names and units of the saved-analysis files
//! users already have: rates are percent numbers (`"wacc": 8.9`), the
//! sales-to-capital ratio and its delta are plain ratios. Missing keys fall
//! back to the reference case below.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AssumptionSet, DynamicAdjustment};
use crate::error::DcfError;
use crate::projection::ReinvestmentPolicy;

/// Company identification carried alongside the assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub ticker: String,

    /// Market price per share, if one was entered
    pub current_price: Option<f64>,
}

/// Saved analysis in the settings-file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(rename = "bedrijfsnaam", default = "default_company")]
    pub company: String,
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(rename = "projectie_jaren", default = "default_years")]
    pub projection_years: u32,
    #[serde(rename = "basis_omzet", default = "default_base_revenue")]
    pub base_revenue: f64,
    #[serde(rename = "ebit_marge", default = "default_ebit_margin")]
    pub ebit_margin_pct: f64,
    #[serde(rename = "tax_rate", default = "default_tax_rate")]
    pub tax_rate_pct: f64,
    #[serde(rename = "invested_cap", default = "default_invested_capital")]
    pub invested_capital: f64,
    #[serde(default = "default_shares")]
    pub shares: f64,
    #[serde(rename = "target_sales_to_cap", default = "default_sales_to_capital")]
    pub sales_to_capital: f64,
    #[serde(default = "default_initial_investment")]
    pub initial_investment: Option<f64>,
    #[serde(rename = "revenue_growth", default = "default_growth")]
    pub revenue_growth_pct: f64,
    #[serde(rename = "wacc", default = "default_wacc")]
    pub wacc_pct: f64,
    #[serde(default = "default_debt")]
    pub debt: f64,
    #[serde(default = "default_cash")]
    pub cash: f64,
    #[serde(rename = "margin_safety", default)]
    pub margin_safety_pct: f64,
    #[serde(rename = "term_growth", default = "default_terminal_growth")]
    pub terminal_growth_pct: f64,
    #[serde(rename = "term_roic", default = "default_terminal_roic")]
    pub terminal_roic_pct: f64,
    #[serde(default)]
    pub current_price: f64,

    #[serde(rename = "dyn_groei_start", default = "default_growth_start")]
    pub growth_start: u32,
    #[serde(rename = "dyn_groei_delta", default = "default_growth_delta")]
    pub growth_delta_pct: f64,
    #[serde(rename = "dyn_marge_start", default = "default_margin_start")]
    pub margin_start: u32,
    #[serde(rename = "dyn_marge_delta", default)]
    pub margin_delta_pct: f64,
    #[serde(rename = "dyn_tax_start", default = "default_later_start")]
    pub tax_start: u32,
    #[serde(rename = "dyn_tax_delta", default)]
    pub tax_delta_pct: f64,
    #[serde(rename = "dyn_s2c_start", default = "default_later_start")]
    pub sales_to_capital_start: u32,
    #[serde(rename = "dyn_s2c_delta", default)]
    pub sales_to_capital_delta: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reinvestment_policy: Option<ReinvestmentPolicy>,
}

fn default_company() -> String { "Zoetis".to_string() }
fn default_ticker() -> String { "ZTS".to_string() }
fn default_years() -> u32 { 10 }
fn default_base_revenue() -> f64 { 9256.0 }
fn default_ebit_margin() -> f64 { 40.3 }
fn default_tax_rate() -> f64 { 20.3 }
fn default_invested_capital() -> f64 { 9792.0 }
fn default_shares() -> f64 { 443.2 }
fn default_sales_to_capital() -> f64 { 0.95 }
fn default_initial_investment() -> Option<f64> { Some(312.0) }
fn default_growth() -> f64 { 5.0 }
fn default_wacc() -> f64 { 8.9 }
fn default_debt() -> f64 { 7273.0 }
fn default_cash() -> f64 { 1899.0 }
fn default_terminal_growth() -> f64 { 4.1 }
fn default_terminal_roic() -> f64 { 15.0 }
fn default_growth_start() -> u32 { 10 }
fn default_growth_delta() -> f64 { -0.9 }
fn default_margin_start() -> u32 { 3 }
fn default_later_start() -> u32 { 5 }

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            company: default_company(),
            ticker: default_ticker(),
            projection_years: default_years(),
            base_revenue: default_base_revenue(),
            ebit_margin_pct: default_ebit_margin(),
            tax_rate_pct: default_tax_rate(),
            invested_capital: default_invested_capital(),
            shares: default_shares(),
            sales_to_capital: default_sales_to_capital(),
            initial_investment: default_initial_investment(),
            revenue_growth_pct: default_growth(),
            wacc_pct: default_wacc(),
            debt: default_debt(),
            cash: default_cash(),
            margin_safety_pct: 0.0,
            terminal_growth_pct: default_terminal_growth(),
            terminal_roic_pct: default_terminal_roic(),
            current_price: 0.0,
            growth_start: default_growth_start(),
            growth_delta_pct: default_growth_delta(),
            margin_start: default_margin_start(),
            margin_delta_pct: 0.0,
            tax_start: default_later_start(),
            tax_delta_pct: 0.0,
            sales_to_capital_start: default_later_start(),
            sales_to_capital_delta: 0.0,
            reinvestment_policy: None,
        }
    }
}

fn pct(value: f64) -> f64 {
    value / 100.0
}

impl SettingsDocument {
    pub fn from_json_str(json: &str) -> Result<Self, DcfError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a settings document from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DcfError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the document as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DcfError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, DcfError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a document from a profile and an assumption set
    pub fn from_parts(
        profile: &CompanyProfile,
        assumptions: &AssumptionSet,
        policy: Option<ReinvestmentPolicy>,
    ) -> Self {
        Self {
            company: profile.name.clone(),
            ticker: profile.ticker.clone(),
            projection_years: assumptions.horizon,
            base_revenue: assumptions.base_revenue,
            ebit_margin_pct: assumptions.base_ebit_margin * 100.0,
            tax_rate_pct: assumptions.base_tax_rate * 100.0,
            invested_capital: assumptions.base_invested_capital,
            shares: assumptions.shares_outstanding,
            sales_to_capital: assumptions.base_sales_to_capital,
            initial_investment: assumptions.initial_investment,
            revenue_growth_pct: assumptions.base_growth * 100.0,
            wacc_pct: assumptions.wacc * 100.0,
            debt: assumptions.debt,
            cash: assumptions.cash,
            margin_safety_pct: assumptions.safety_margin * 100.0,
            terminal_growth_pct: assumptions.terminal_growth * 100.0,
            terminal_roic_pct: assumptions.terminal_roic * 100.0,
            current_price: profile.current_price.unwrap_or(0.0),
            growth_start: assumptions.growth_adjustment.start_year,
            growth_delta_pct: assumptions.growth_adjustment.delta * 100.0,
            margin_start: assumptions.margin_adjustment.start_year,
            margin_delta_pct: assumptions.margin_adjustment.delta * 100.0,
            tax_start: assumptions.tax_adjustment.start_year,
            tax_delta_pct: assumptions.tax_adjustment.delta * 100.0,
            sales_to_capital_start: assumptions.sales_to_capital_adjustment.start_year,
            sales_to_capital_delta: assumptions.sales_to_capital_adjustment.delta,
            reinvestment_policy: policy,
        }
    }

    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            name: self.company.clone(),
            ticker: self.ticker.clone(),
            current_price: if self.current_price > 0.0 {
                Some(self.current_price)
            } else {
                None
            },
        }
    }

    /// Convert percent-denominated fields into an engine assumption set
    pub fn to_assumptions(&self) -> AssumptionSet {
        AssumptionSet {
            horizon: self.projection_years,
            base_revenue: self.base_revenue,
            base_invested_capital: self.invested_capital,
            base_ebit_margin: pct(self.ebit_margin_pct),
            base_tax_rate: pct(self.tax_rate_pct),
            base_sales_to_capital: self.sales_to_capital,
            base_growth: pct(self.revenue_growth_pct),
            wacc: pct(self.wacc_pct),
            terminal_growth: pct(self.terminal_growth_pct),
            terminal_roic: pct(self.terminal_roic_pct),
            shares_outstanding: self.shares,
            debt: self.debt,
            cash: self.cash,
            safety_margin: pct(self.margin_safety_pct),
            initial_investment: self.initial_investment,
            growth_adjustment: DynamicAdjustment::new(self.growth_start, pct(self.growth_delta_pct)),
            margin_adjustment: DynamicAdjustment::new(self.margin_start, pct(self.margin_delta_pct)),
            tax_adjustment: DynamicAdjustment::new(self.tax_start, pct(self.tax_delta_pct)),
            sales_to_capital_adjustment: DynamicAdjustment::new(
                self.sales_to_capital_start,
                self.sales_to_capital_delta,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_document_uses_reference_case() {
        let doc = SettingsDocument::from_json_str("{}").unwrap();
        assert_eq!(doc, SettingsDocument::default());
        assert_eq!(doc.company, "Zoetis");
        assert_eq!(doc.projection_years, 10);
        assert_eq!(doc.initial_investment, Some(312.0));
    }

    #[test]
    fn test_percent_fields_become_fractions() {
        let a = SettingsDocument::default().to_assumptions();
        assert_relative_eq!(a.base_ebit_margin, 0.403, epsilon = 1e-12);
        assert_relative_eq!(a.base_tax_rate, 0.203, epsilon = 1e-12);
        assert_relative_eq!(a.wacc, 0.089, epsilon = 1e-12);
        assert_relative_eq!(a.terminal_growth, 0.041, epsilon = 1e-12);
        assert_relative_eq!(a.growth_adjustment.delta, -0.009, epsilon = 1e-12);
        assert_eq!(a.growth_adjustment.start_year, 10);
        assert_relative_eq!(a.base_sales_to_capital, 0.95);
    }

    #[test]
    fn test_saved_analysis_file() {
        let json = r#"{
            "bedrijfsnaam": "Acme",
            "ticker": "ACME",
            "projectie_jaren": 7,
            "basis_omzet": 500.0,
            "ebit_marge": 12.5,
            "margin_safety": 20,
            "current_price": 42.0,
            "dyn_s2c_start": 3,
            "dyn_s2c_delta": 0.25,
            "initial_investment": null,
            "reinvestment_policy": "forward"
        }"#;
        let doc = SettingsDocument::from_json_str(json).unwrap();
        let a = doc.to_assumptions();

        assert_eq!(a.horizon, 7);
        assert_relative_eq!(a.base_ebit_margin, 0.125);
        assert_relative_eq!(a.safety_margin, 0.2);
        assert_eq!(a.initial_investment, None);
        assert_eq!(a.sales_to_capital_adjustment, DynamicAdjustment::new(3, 0.25));
        assert_eq!(doc.reinvestment_policy, Some(ReinvestmentPolicy::ForwardLooking));

        let profile = doc.profile();
        assert_eq!(profile.name, "Acme");
        assert_eq!(profile.current_price, Some(42.0));
    }

    #[test]
    fn test_zero_price_means_no_price() {
        let profile = SettingsDocument::default().profile();
        assert_eq!(profile.current_price, None);
    }

    #[test]
    fn test_export_then_import_preserves_assumptions() {
        let original = SettingsDocument::default();
        let assumptions = original.to_assumptions();
        let exported = SettingsDocument::from_parts(&original.profile(), &assumptions, None);
        let json = exported.to_json_string().unwrap();
        let reloaded = SettingsDocument::from_json_str(&json).unwrap().to_assumptions();

        assert_eq!(reloaded.horizon, assumptions.horizon);
        assert_relative_eq!(reloaded.wacc, assumptions.wacc, epsilon = 1e-12);
        assert_relative_eq!(reloaded.base_ebit_margin, assumptions.base_ebit_margin, epsilon = 1e-12);
        assert_relative_eq!(
            reloaded.growth_adjustment.delta,
            assumptions.growth_adjustment.delta,
            epsilon = 1e-12
        );
        assert!(!json.contains("reinvestment_policy"));
    }
}
