//! Valuation history log
//!
//! Each finished valuation can be appended to a history sink together with
//! the settings that produced it. Recording is fire-and-forget: a failing
//! sink never changes the valuation that was computed.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::Serialize;

use crate::assumptions::SettingsDocument;
use crate::error::DcfError;
use crate::valuation::ValuationResult;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER: [&str; 6] = ["timestamp", "company", "value_per_share", "ticker", "upside", "settings"];

/// One logged valuation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    pub company: String,
    pub ticker: String,
    pub value_per_share: f64,
    pub upside: Option<f64>,

    /// Settings document serialized as JSON
    pub settings_json: String,
}

impl HistoryEntry {
    pub fn new(
        timestamp: NaiveDateTime,
        settings: &SettingsDocument,
        result: &ValuationResult,
    ) -> Result<Self, DcfError> {
        Ok(Self {
            timestamp,
            company: settings.company.clone(),
            ticker: settings.ticker.clone(),
            value_per_share: result.value_per_share,
            upside: result.upside,
            settings_json: serde_json::to_string(settings)?,
        })
    }

    /// Row in sheet layout: value to two decimals, upside as a percentage
    pub fn to_row(&self) -> [String; 6] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.company.clone(),
            format!("{:.2}", self.value_per_share),
            self.ticker.clone(),
            match self.upside {
                Some(u) => format!("{:.1}%", u * 100.0),
                None => "N/A".to_string(),
            },
            self.settings_json.clone(),
        ]
    }
}

/// Destination for finished valuations
pub trait HistorySink {
    fn record(&self, entry: &HistoryEntry) -> Result<(), DcfError>;
}

/// Append-only CSV history file
#[derive(Debug, Clone)]
pub struct CsvHistorySink {
    path: PathBuf,
}

impl CsvHistorySink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for CsvHistorySink {
    fn record(&self, entry: &HistoryEntry) -> Result<(), DcfError> {
        let is_new = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(HEADER)?;
        }
        writer.write_record(entry.to_row())?;
        writer.flush()?;

        debug!("Recorded valuation of {} to {}", entry.company, self.path.display());
        Ok(())
    }
}

/// Record an entry, logging and discarding any failure
pub fn record_quietly(sink: &dyn HistorySink, entry: &HistoryEntry) -> bool {
    match sink.record(entry) {
        Ok(()) => true,
        Err(e) => {
            warn!("History save failed: {}", e);
            false
        }
    }
}
