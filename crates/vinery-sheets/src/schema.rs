//! Schema setup and repair for the three lead tables.
//!
//! The "leads" header is the source of truth: "processed" mirrors it
//! verbatim and "not_processed" mirrors it plus a trailing `ERROR` column.
//! Pre-existing destination tables whose row-1 header has drifted are
//! destructively repaired (cleared and rewritten with just the header).

use crate::error::{Result, SheetsError};
use crate::store::{TableStore, ERROR_COLUMN, LEADS, NOT_PROCESSED, PROCESSED};
use tracing::info;

/// Header schemas for the three tables, derived once at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSet {
    /// Header of "leads", mirrored by "processed"
    pub header: Vec<String>,
    /// Header of "not_processed": leads header plus trailing `ERROR`
    pub failed_header: Vec<String>,
}

/// Derive the "not_processed" header from the leads header.
///
/// Appends `ERROR` unless the column is already present.
#[must_use]
pub fn derive_failed_header(header: &[String]) -> Vec<String> {
    let mut failed = header.to_vec();
    if !failed.iter().any(|col| col == ERROR_COLUMN) {
        failed.push(ERROR_COLUMN.to_string());
    }
    failed
}

/// Open the three lead tables, creating or repairing destinations as needed.
///
/// Fails if "leads" is missing or has no header row. Idempotent when the
/// destination headers already match the derived schema. Destructive when
/// they have drifted: the destination is cleared and only the header is
/// rewritten, discarding previously accumulated rows.
pub async fn ensure_schema<S: TableStore + ?Sized>(store: &S) -> Result<TableSet> {
    if !store.table_exists(LEADS).await? {
        return Err(SheetsError::MissingTable {
            name: LEADS.to_string(),
        });
    }

    let rows = store.read_all(LEADS).await?;
    let header = match rows.first() {
        Some(h) if !h.is_empty() => h.clone(),
        _ => return Err(SheetsError::EmptyHeader),
    };

    let failed_header = derive_failed_header(&header);

    ensure_destination(store, PROCESSED, &header).await?;
    ensure_destination(store, NOT_PROCESSED, &failed_header).await?;

    Ok(TableSet {
        header,
        failed_header,
    })
}

async fn ensure_destination<S: TableStore + ?Sized>(
    store: &S,
    table: &str,
    header: &[String],
) -> Result<()> {
    if store.table_exists(table).await? {
        let rows = store.read_all(table).await?;
        if rows.first().map(Vec::as_slice) != Some(header) {
            info!("Header drift in '{table}', repairing (existing rows discarded)");
            store.reset_table(table, header).await?;
        }
    } else {
        info!("Creating '{table}' sheet");
        store.create_table(table, header).await?;
    }
    Ok(())
}
