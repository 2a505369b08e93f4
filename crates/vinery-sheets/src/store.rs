//! The `TableStore` trait and an in-memory implementation.

use crate::error::{Result, SheetsError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Title of the source table holding pending leads.
pub const LEADS: &str = "leads";

/// Title of the destination table for successfully reviewed leads.
pub const PROCESSED: &str = "processed";

/// Title of the destination table for failed leads.
pub const NOT_PROCESSED: &str = "not_processed";

/// Trailing column appended to the `not_processed` header.
pub const ERROR_COLUMN: &str = "ERROR";

/// Read/append/delete access to named tables inside one spreadsheet.
///
/// Rows are positional and 1-indexed with the header occupying row 1. The
/// adapter enforces no uniqueness constraints; the reconciliation loop is
/// assumed to be the sole writer.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Check whether a table with the given title exists.
    async fn table_exists(&self, table: &str) -> Result<bool>;

    /// Read every row of a table. Row 1 is the header; an empty table
    /// yields an empty sequence.
    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>>;

    /// Append one row at the end of a table.
    async fn append_row(&self, table: &str, row: &[String]) -> Result<()>;

    /// Delete exactly one row by its 1-based position (header included).
    /// Subsequent reads reflect the shift.
    async fn delete_row(&self, table: &str, row_number: u32) -> Result<()>;

    /// Create a new table with the given header as row 1.
    async fn create_table(&self, table: &str, header: &[String]) -> Result<()>;

    /// Clear a table and rewrite just the header row. Destructive: discards
    /// any previously accumulated rows.
    async fn reset_table(&self, table: &str, header: &[String]) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: TableStore + ?Sized> TableStore for std::sync::Arc<T> {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        (**self).table_exists(table).await
    }

    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>> {
        (**self).read_all(table).await
    }

    async fn append_row(&self, table: &str, row: &[String]) -> Result<()> {
        (**self).append_row(table, row).await
    }

    async fn delete_row(&self, table: &str, row_number: u32) -> Result<()> {
        (**self).delete_row(table, row_number).await
    }

    async fn create_table(&self, table: &str, header: &[String]) -> Result<()> {
        (**self).create_table(table, header).await
    }

    async fn reset_table(&self, table: &str, header: &[String]) -> Result<()> {
        (**self).reset_table(table, header).await
    }
}

/// In-process `TableStore` backed by a hash map.
///
/// Used by tests and dry runs; mirrors the positional semantics of the real
/// spreadsheet backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one table.
    #[must_use]
    pub fn with_table(title: &str, rows: Vec<Vec<String>>) -> Self {
        let store = Self::new();
        store
            .tables
            .lock()
            .expect("MemoryStore lock poisoned")
            .insert(title.to_string(), rows);
        store
    }

    /// Snapshot the current contents of a table, if present.
    #[must_use]
    pub fn snapshot(&self, table: &str) -> Option<Vec<Vec<String>>> {
        self.tables
            .lock()
            .expect("MemoryStore lock poisoned")
            .get(table)
            .cloned()
    }
}

#[async_trait::async_trait]
impl TableStore for MemoryStore {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .expect("MemoryStore lock poisoned")
            .contains_key(table))
    }

    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>> {
        self.tables
            .lock()
            .expect("MemoryStore lock poisoned")
            .get(table)
            .cloned()
            .ok_or_else(|| SheetsError::MissingTable {
                name: table.to_string(),
            })
    }

    async fn append_row(&self, table: &str, row: &[String]) -> Result<()> {
        let mut tables = self.tables.lock().expect("MemoryStore lock poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| SheetsError::MissingTable {
                name: table.to_string(),
            })?;
        rows.push(row.to_vec());
        Ok(())
    }

    async fn delete_row(&self, table: &str, row_number: u32) -> Result<()> {
        let mut tables = self.tables.lock().expect("MemoryStore lock poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| SheetsError::MissingTable {
                name: table.to_string(),
            })?;

        let idx = row_number as usize;
        if idx == 0 || idx > rows.len() {
            return Err(SheetsError::Api {
                status: 400,
                message: format!("row {row_number} out of range for sheet '{table}'"),
            });
        }
        rows.remove(idx - 1);
        Ok(())
    }

    async fn create_table(&self, table: &str, header: &[String]) -> Result<()> {
        let mut tables = self.tables.lock().expect("MemoryStore lock poisoned");
        if tables.contains_key(table) {
            return Err(SheetsError::Api {
                status: 400,
                message: format!("sheet '{table}' already exists"),
            });
        }
        tables.insert(table.to_string(), vec![header.to_vec()]);
        Ok(())
    }

    async fn reset_table(&self, table: &str, header: &[String]) -> Result<()> {
        let mut tables = self.tables.lock().expect("MemoryStore lock poisoned");
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| SheetsError::MissingTable {
                name: table.to_string(),
            })?;
        rows.clear();
        rows.push(header.to_vec());
        Ok(())
    }
}
