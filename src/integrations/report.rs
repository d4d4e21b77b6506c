//! Human-readable valuation report and projection table export

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::assumptions::{AssumptionSet, CompanyProfile};
use crate::error::DcfError;
use crate::projection::YearlyRecord;
use crate::valuation::Valuation;

/// Projection table row as exported to CSV
#[derive(Debug, Serialize)]
struct TableRow {
    #[serde(rename = "Year")]
    year: u32,
    #[serde(rename = "Revenue")]
    revenue: f64,
    #[serde(rename = "EBIT")]
    ebit: f64,
    #[serde(rename = "NOPAT")]
    nopat: f64,
    #[serde(rename = "Invested Capital")]
    invested_capital: f64,
    #[serde(rename = "Investment")]
    investment: f64,
    #[serde(rename = "FCFF")]
    fcff: f64,
    #[serde(rename = "PV FCFF")]
    pv_fcff: f64,
    #[serde(rename = "Used Growth")]
    used_growth: f64,
    #[serde(rename = "Used Margin")]
    used_margin: f64,
}

impl From<&YearlyRecord> for TableRow {
    fn from(r: &YearlyRecord) -> Self {
        Self {
            year: r.year,
            revenue: r.revenue,
            ebit: r.ebit,
            nopat: r.nopat,
            invested_capital: r.invested_capital,
            investment: r.investment,
            fcff: r.fcff,
            pv_fcff: r.pv_fcff,
            used_growth: r.applied_growth,
            used_margin: r.applied_margin,
        }
    }
}

/// Write the projection table as CSV
pub fn write_projection_csv<W: Write>(writer: W, records: &[YearlyRecord]) -> Result<(), DcfError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(TableRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn format_upside(upside: Option<f64>) -> String {
    match upside {
        Some(u) => format!("{:.1}%", u * 100.0),
        None => "N/A".to_string(),
    }
}

/// Plain-text valuation report, rendered through [`fmt::Display`]
pub struct Report<'a> {
    pub profile: &'a CompanyProfile,
    pub analysis_date: NaiveDate,
    pub assumptions: &'a AssumptionSet,
    pub valuation: &'a Valuation,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.valuation.result;
        let assumptions = self.assumptions;

        writeln!(f, "Valuation Report: {}", self.profile.name)?;
        writeln!(f, "Analysis Date: {}", self.analysis_date.format("%Y-%m-%d"))?;
        writeln!(f)?;

        writeln!(f, "1. Valuation Results")?;
        let results = [
            ("Value per share", format!("{:.2}", r.value_per_share)),
            (
                "Value after margin of safety",
                format!("{:.2}", r.margin_adjusted_value),
            ),
            (
                "Current price",
                r.current_price
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Upside", format_upside(r.upside)),
            ("Explicit period value", format!("{:.1}", r.explicit_value)),
            ("PV terminal value", format!("{:.1}", r.pv_terminal_value())),
            ("Enterprise value", format!("{:.1}", r.enterprise_value)),
            ("Equity value", format!("{:.1}", r.equity_value)),
        ];
        for (label, value) in &results {
            writeln!(f, "  {:<32}{}", label, value)?;
        }
        writeln!(f)?;

        writeln!(f, "2. Key Assumptions")?;
        let inputs = [
            ("Ticker", self.profile.ticker.clone()),
            ("Projection years", assumptions.horizon.to_string()),
            ("Base revenue", format!("{:.1}", assumptions.base_revenue)),
            ("Base growth", format!("{:.1}%", assumptions.base_growth * 100.0)),
            ("EBIT margin", format!("{:.1}%", assumptions.base_ebit_margin * 100.0)),
            ("Tax rate", format!("{:.1}%", assumptions.base_tax_rate * 100.0)),
            ("Invested capital", format!("{:.1}", assumptions.base_invested_capital)),
            ("Sales-to-capital", format!("{:.2}", assumptions.base_sales_to_capital)),
            (
                "Initial investment",
                assumptions
                    .initial_investment
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "formula".to_string()),
            ),
            ("WACC", format!("{:.1}%", assumptions.wacc * 100.0)),
            ("Terminal growth", format!("{:.1}%", assumptions.terminal_growth * 100.0)),
            ("Terminal ROIC", format!("{:.1}%", assumptions.terminal_roic * 100.0)),
            ("Debt", format!("{:.1}", assumptions.debt)),
            ("Cash", format!("{:.1}", assumptions.cash)),
            ("Shares outstanding", format!("{:.1}", assumptions.shares_outstanding)),
            ("Margin of safety", format!("{:.0}%", assumptions.safety_margin * 100.0)),
        ];
        for (label, value) in &inputs {
            writeln!(f, "  {}: {}", label, value)?;
        }
        writeln!(f)?;

        writeln!(f, "3. Projections")?;
        writeln!(
            f,
            "{:>4} {:>12} {:>11} {:>11} {:>12} {:>11} {:>11}",
            "Year", "Rev", "EBIT", "NOPAT", "Inv.Cap", "Gr.Inv", "FCFF"
        )?;
        for row in &self.valuation.projection.records {
            writeln!(
                f,
                "{:>4} {:>12.1} {:>11.1} {:>11.1} {:>12.1} {:>11.1} {:>11.1}",
                row.year, row.revenue, row.ebit, row.nopat, row.invested_capital, row.investment, row.fcff
            )?;
        }
        Ok(())
    }
}

/// Render a plain-text valuation report
pub fn render_report(
    profile: &CompanyProfile,
    analysis_date: NaiveDate,
    assumptions: &AssumptionSet,
    valuation: &Valuation,
) -> String {
    Report {
        profile,
        analysis_date,
        assumptions,
        valuation,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionEngine;

    fn fixture() -> (CompanyProfile, AssumptionSet, Valuation) {
        let profile = CompanyProfile {
            name: "Acme".to_string(),
            ticker: "ACME".to_string(),
            current_price: None,
        };
        let a = AssumptionSet::flat(5, 100.0, 100.0, 0.20, 0.25, 1.0, 0.05, 0.09, 0.02, 0.15)
            .with_balance_sheet(20.0, 5.0, 10.0);
        let valuation = ProjectionEngine::default().value(&a, None).unwrap();
        (profile, a, valuation)
    }

    #[test]
    fn test_report_sections() {
        let (profile, a, valuation) = fixture();
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let report = render_report(&profile, date, &a, &valuation);

        assert!(report.starts_with("Valuation Report: Acme"));
        assert!(report.contains("Analysis Date: 2024-06-30"));
        assert!(report.contains("1. Valuation Results"));
        assert!(report.contains("2. Key Assumptions"));
        assert!(report.contains("3. Projections"));
        assert!(report.contains("N/A"));

        let table_start = report.find("3. Projections").unwrap();
        let table_lines = report[table_start..].lines().count();
        assert_eq!(table_lines, 2 + 5);
    }

    #[test]
    fn test_report_displays_in_place() {
        let (profile, a, valuation) = fixture();
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let report = Report {
            profile: &profile,
            analysis_date: date,
            assumptions: &a,
            valuation: &valuation,
        };

        let mut out = String::new();
        fmt::Write::write_fmt(&mut out, format_args!("{}", report)).unwrap();
        assert_eq!(out, render_report(&profile, date, &a, &valuation));
        assert!(out.ends_with(&format!("{:>11.1}\n", valuation.projection.records[4].fcff)));
    }

    #[test]
    fn test_projection_csv() {
        let (_, _, valuation) = fixture();
        let mut buffer = Vec::new();
        write_projection_csv(&mut buffer, &valuation.projection.records).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Year,Revenue,EBIT,NOPAT,Invested Capital,Investment,FCFF,PV FCFF,Used Growth,Used Margin"
        );
        assert_eq!(lines.count(), 5);
        assert!(text.contains("\n1,105"));
    }
}
