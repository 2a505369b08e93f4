//! Lead rows and their field mappings.

use std::collections::HashMap;
use vinery_core::extract_asin;
use vinery_submit::ReviewForm;

use crate::error::RowFault;

/// Column holding the review URL; required in the leads header.
pub const REVIEW_LINK_COLUMN: &str = "Review link";

/// Column holding the product identifier.
pub const ASIN_COLUMN: &str = "Asin";

/// Column holding the review body text.
pub const REVIEW_COLUMN: &str = "Review";

/// Column holding the review headline.
pub const HEADLINE_COLUMN: &str = "Headline";

/// Output column set on successful submission.
pub const STATUS_COLUMN: &str = "Status";

/// Terminal status value written to "processed".
pub const REVIEWED_STATUS: &str = "Reviewed";

/// One row of the "leads" table plus its 1-based sheet position.
///
/// Keeps both the raw values (written to "not_processed" on failure) and a
/// trimmed field map keyed by header name (used for submission and written
/// to "processed" on success).
#[derive(Debug, Clone)]
pub struct LeadRow {
    /// 1-based sheet row number, header included
    pub row_number: u32,
    raw: Vec<String>,
    fields: HashMap<String, String>,
}

impl LeadRow {
    /// Build a lead from a sheet row, trimming every value. Values beyond
    /// the header width are ignored; missing trailing cells are absent from
    /// the field map.
    #[must_use]
    pub fn from_values(header: &[String], row_number: u32, values: Vec<String>) -> Self {
        let fields = header
            .iter()
            .zip(values.iter())
            .map(|(name, value)| (name.clone(), value.trim().to_string()))
            .collect();

        Self {
            row_number,
            raw: values,
            fields,
        }
    }

    /// Get a trimmed field value by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set (or insert) a field value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// The review URL, if present and non-blank.
    #[must_use]
    pub fn review_link(&self) -> Option<&str> {
        self.get(REVIEW_LINK_COLUMN).filter(|v| !v.is_empty())
    }

    /// Populate `Asin` from the review link when the field is absent or
    /// empty. Returns the newly extracted value; `None` means the field was
    /// already set or the URL carried no identifier (never an error).
    pub fn ensure_asin(&mut self) -> Option<String> {
        if self.get(ASIN_COLUMN).is_some_and(|v| !v.is_empty()) {
            return None;
        }

        let asin = extract_asin(self.review_link()?)?;
        self.set(ASIN_COLUMN, asin.clone());
        Some(asin)
    }

    /// Build the submission form. Fails when the `Review` or `Headline`
    /// column is absent from the sheet.
    pub fn review_form(&self) -> Result<ReviewForm, RowFault> {
        let review = self
            .get(REVIEW_COLUMN)
            .ok_or_else(|| RowFault::new(format!("missing column: {REVIEW_COLUMN}")))?;
        let headline = self
            .get(HEADLINE_COLUMN)
            .ok_or_else(|| RowFault::new(format!("missing column: {HEADLINE_COLUMN}")))?;

        Ok(ReviewForm {
            review: review.to_string(),
            headline: headline.to_string(),
        })
    }

    /// Trimmed values aligned to the header order, for "processed".
    #[must_use]
    pub fn cleaned_row(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|name| self.get(name).unwrap_or("").to_string())
            .collect()
    }

    /// Raw (untrimmed) values aligned to the header order plus the fault
    /// description, for "not_processed".
    #[must_use]
    pub fn failed_row(&self, header: &[String], error: &str) -> Vec<String> {
        let mut row: Vec<String> = (0..header.len())
            .map(|i| self.raw.get(i).cloned().unwrap_or_default())
            .collect();
        row.push(error.to_string());
        row
    }
}
