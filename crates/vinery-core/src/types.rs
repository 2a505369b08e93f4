//! Shared types used across the Vinery application.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for Google spreadsheet identifiers with validation.
///
/// Spreadsheet IDs are the opaque key from the sheet URL: alphanumeric plus
/// `-` and `_`, at least 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpreadsheetId(String);

impl SpreadsheetId {
    /// Create a new `SpreadsheetId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the expected format.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        static ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            ID_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid spreadsheet ID: expected at least 20 characters of [A-Za-z0-9_-], got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract an ASIN from a review-link URL.
///
/// Portal review links carry the product identifier as a query parameter
/// (`...&asin=B0ABCDEFG1&...`). Returns `None` when the URL carries no such
/// parameter; extraction failure is never an error.
#[must_use]
pub fn extract_asin(url: &str) -> Option<String> {
    static ASIN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ASIN_REGEX.get_or_init(|| Regex::new(r"asin=([A-Z0-9]+)").expect("valid regex"));

    regex
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Derive a screenshot filename stem from an optional ASIN value.
///
/// Keeps alphanumeric characters only; blank or fully stripped values fall
/// back to `"unknown"`. Collisions overwrite silently by design of the
/// screenshot directory contract.
#[must_use]
pub fn screenshot_stem(asin: Option<&str>) -> String {
    let sanitized: String = asin
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_id_valid() {
        let id = SpreadsheetId::new("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms").unwrap();
        assert_eq!(
            id.as_str(),
            "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms"
        );
    }

    #[test]
    fn test_spreadsheet_id_too_short() {
        assert!(SpreadsheetId::new("short").is_err());
    }

    #[test]
    fn test_spreadsheet_id_bad_chars() {
        assert!(SpreadsheetId::new("abc/def!1234567890123456789").is_err());
    }

    #[test]
    fn test_extract_asin() {
        let url = "https://portal.example.com/vp/abc?ref=x&asin=B0ABCDEFG1&tag=y";
        assert_eq!(extract_asin(url), Some("B0ABCDEFG1".to_string()));
    }

    #[test]
    fn test_extract_asin_absent() {
        assert_eq!(extract_asin("https://portal.example.com/vp/abc?ref=x"), None);
    }

    #[test]
    fn test_extract_asin_stops_at_lowercase() {
        // Capture is uppercase alphanumeric only
        assert_eq!(
            extract_asin("https://x.test/?asin=B0ABCx"),
            Some("B0AB".to_string())
        );
    }

    #[test]
    fn test_screenshot_stem_sanitizes() {
        assert_eq!(screenshot_stem(Some("B0-AB_CD 1")), "B0ABCD1");
    }

    #[test]
    fn test_screenshot_stem_fallback() {
        assert_eq!(screenshot_stem(None), "unknown");
        assert_eq!(screenshot_stem(Some("--- ")), "unknown");
    }
}
