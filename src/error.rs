//! Error types shared by the engine and its integrations

use thiserror::Error;

/// Errors raised by the valuation engine and the collaborators around it.
///
/// The engine itself only ever returns [`DcfError::InvalidAssumption`].
/// The remaining variants belong to integrations (settings files, price
/// tables, history sinks) and are isolated at that boundary.
#[derive(Error, Debug)]
pub enum DcfError {
    #[error("invalid assumption `{field}`{}: {message}", year_suffix(.year))]
    InvalidAssumption {
        field: &'static str,
        year: Option<u32>,
        message: String,
    },

    #[error("{source_name} unavailable: {message}")]
    DataUnavailable { source_name: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn year_suffix(year: &Option<u32>) -> String {
    match year {
        Some(y) => format!(" in year {}", y),
        None => String::new(),
    }
}

impl DcfError {
    /// Invalid assumption that is not tied to a particular projection year
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DcfError::InvalidAssumption {
            field,
            year: None,
            message: message.into(),
        }
    }

    /// Invalid assumption detected while projecting `year`
    pub fn invalid_in_year(field: &'static str, year: u32, message: impl Into<String>) -> Self {
        DcfError::InvalidAssumption {
            field,
            year: Some(year),
            message: message.into(),
        }
    }

    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        DcfError::DataUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// True for engine-side assumption failures
    pub fn is_invalid_assumption(&self) -> bool {
        matches!(self, DcfError::InvalidAssumption { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_field_and_year() {
        let err = DcfError::invalid_in_year("sales_to_capital", 3, "ratio resolved to zero");
        assert_eq!(
            err.to_string(),
            "invalid assumption `sales_to_capital` in year 3: ratio resolved to zero"
        );
        assert!(err.is_invalid_assumption());
    }

    #[test]
    fn test_message_without_year() {
        let err = DcfError::invalid("horizon", "must be at least one year");
        assert_eq!(err.to_string(), "invalid assumption `horizon`: must be at least one year");
    }

    #[test]
    fn test_unavailable_is_not_an_assumption_error() {
        let err = DcfError::unavailable("price lookup", "ticker ZTS not found");
        assert!(!err.is_invalid_assumption());
        assert_eq!(err.to_string(), "price lookup unavailable: ticker ZTS not found");
    }
}
