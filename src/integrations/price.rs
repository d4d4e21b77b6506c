//! Market price lookup

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use log::warn;

use crate::error::DcfError;

/// Source of a current market price per share
pub trait PriceSource {
    /// Price for `ticker`, or `DataUnavailable` when none can be supplied
    fn current_price(&self, ticker: &str) -> Result<f64, DcfError>;
}

/// In-memory ticker to price table
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, price: f64) {
        self.prices.insert(ticker.to_ascii_uppercase(), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Load prices from a CSV file with `ticker,price` columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DcfError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load prices from any reader (e.g., string buffer, network stream)
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DcfError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut table = Self::new();

        for result in csv_reader.records() {
            let record = result?;
            let ticker = record.get(0).unwrap_or("").trim();
            let raw_price = record.get(1).unwrap_or("").trim();
            let price: f64 = raw_price.parse().map_err(|_| {
                DcfError::unavailable(
                    "price table",
                    format!("invalid price '{}' for ticker '{}'", raw_price, ticker),
                )
            })?;
            table.insert(ticker, price);
        }

        Ok(table)
    }
}

impl PriceSource for PriceTable {
    fn current_price(&self, ticker: &str) -> Result<f64, DcfError> {
        self.prices
            .get(&ticker.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| DcfError::unavailable("price lookup", format!("no price for {}", ticker)))
    }
}

/// Look up a price, treating any failure as "price unavailable".
///
/// Non-positive prices are also reported as unavailable so that upside is
/// never computed against them.
pub fn resolve_price(source: &dyn PriceSource, ticker: &str) -> Option<f64> {
    if ticker.trim().is_empty() {
        return None;
    }
    match source.current_price(ticker) {
        Ok(price) if price > 0.0 => Some(price),
        Ok(price) => {
            warn!("Ignoring non-positive price {} for {}", price, ticker);
            None
        }
        Err(e) => {
            warn!("Price lookup failed for {}: {}", ticker, e);
            None
        }
    }
}
