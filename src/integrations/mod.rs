//! Collaborators around the engine: price lookup, history log and reports
//!
//! Nothing in here feeds back into a valuation. Price failures degrade to
//! "price unavailable" and history failures are logged and dropped.

mod price;
mod history;
mod report;

pub use price::{resolve_price, PriceSource, PriceTable};
pub use history::{record_quietly, CsvHistorySink, HistoryEntry, HistorySink, TIMESTAMP_FORMAT};
pub use report::{render_report, write_projection_csv, Report};
