//! Batch reference codes
//!
//! A batch is identified to people by `V{NN}/{YYYY}`: the two-digit (or
//! wider) sequence suffix within its year of receipt, and the year itself.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::RegisterError;

/// Field holding the year of receipt (four-digit string)
pub const YEAR_FIELD: &str = "yearOfReceipt";

/// Derived field holding the batch code
pub const NUMBER_FIELD: &str = "batchNumber";

/// Parsed form of a batch code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCode {
    /// Sequence suffix within the year
    pub suffix: u32,
    /// Four-digit year of receipt
    pub year: String,
}

impl BatchCode {
    /// Build a code from a suffix and a year
    pub fn new(suffix: u32, year: impl Into<String>) -> Self {
        Self {
            suffix,
            year: year.into(),
        }
    }
}

impl fmt::Display for BatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:02}/{}", self.suffix, self.year)
    }
}

impl FromStr for BatchCode {
    type Err = RegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = parse_suffix(s)?;
        let year = s.split_once('/').map(|(_, year)| year).unwrap_or_default();
        validate_year(year)?;
        Ok(Self::new(suffix, year))
    }
}

/// Extract the numeric suffix: strip the leading `V`, stop before `/`
pub fn parse_suffix(code: &str) -> Result<u32, RegisterError> {
    let digits = code
        .strip_prefix('V')
        .map(|rest| rest.split('/').next().unwrap_or_default())
        .ok_or_else(|| RegisterError::Sequence(format!("Malformed batch number '{}'", code)))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegisterError::Sequence(format!(
            "Malformed batch number '{}'",
            code
        )));
    }

    digits
        .parse()
        .map_err(|_| RegisterError::Sequence(format!("Malformed batch number '{}'", code)))
}

/// Check that a year of receipt is exactly four ASCII digits
pub fn validate_year(year: &str) -> Result<(), RegisterError> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(RegisterError::Validation(format!(
            "Year of receipt must be a four-digit year, got '{}'",
            year
        )))
    }
}

/// Read a year of receipt given either as a string or a number
pub fn normalize_year(value: Option<&Value>) -> Result<String, RegisterError> {
    let year = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) | None => {
            return Err(RegisterError::Validation(
                "Year of receipt is required".into(),
            ))
        }
    };
    validate_year(&year)?;
    Ok(year)
}
