//! Sheets v4 REST client.
//!
//! Direct HTTP via reqwest rather than a generated API client: the adapter
//! needs five operations and nothing else. Row deletion goes through
//! `batchUpdate` with the numeric sheet ID, so the title-to-ID mapping is
//! fetched from the spreadsheet properties and cached until a sheet is
//! created.

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::error::{Result, SheetsError};
use crate::store::TableStore;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use vinery_core::SpreadsheetId;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Rows created for new destination sheets, matching the portal convention.
const NEW_SHEET_ROWS: u32 = 1000;

/// Google Sheets client scoped to one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: TokenProvider,
    spreadsheet_id: SpreadsheetId,
    base_url: String,
    // title -> numeric sheetId, refreshed lazily and after addSheet
    sheet_ids: Mutex<Option<HashMap<String, i64>>>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl SheetsClient {
    /// Create a client from a loaded service-account key.
    #[must_use]
    pub fn new(key: ServiceAccountKey, spreadsheet_id: SpreadsheetId) -> Self {
        let http = reqwest::Client::new();
        Self {
            auth: TokenProvider::new(key, http.clone()),
            http,
            spreadsheet_id,
            base_url: SHEETS_BASE.to_string(),
            sheet_ids: Mutex::new(None),
        }
    }

    /// Create a client by loading the service-account key from a file.
    pub fn from_credentials_file(
        path: impl AsRef<Path>,
        spreadsheet_id: SpreadsheetId,
    ) -> Result<Self> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?, spreadsheet_id))
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    async fn bearer(&self) -> Result<String> {
        self.auth.access_token().await
    }

    /// Decode a response, surfacing non-2xx statuses as `SheetsError::Api`.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) if !body.error.message.is_empty() => body.error.message,
            _ => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch (or return cached) title-to-sheetId mapping.
    async fn sheet_id_map(&self) -> Result<HashMap<String, i64>> {
        let mut cached = self.sheet_ids.lock().await;
        if let Some(map) = cached.as_ref() {
            return Ok(map.clone());
        }

        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .bearer_auth(token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;

        let map: HashMap<String, i64> = meta
            .sheets
            .into_iter()
            .map(|s| (s.properties.title, s.properties.sheet_id))
            .collect();

        *cached = Some(map.clone());
        Ok(map)
    }

    async fn invalidate_sheet_ids(&self) {
        *self.sheet_ids.lock().await = None;
    }

    async fn numeric_sheet_id(&self, table: &str) -> Result<i64> {
        self.sheet_id_map()
            .await?
            .get(table)
            .copied()
            .ok_or_else(|| SheetsError::MissingTable {
                name: table.to_string(),
            })
    }

    async fn batch_update(&self, requests: serde_json::Value) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn write_header(&self, table: &str, header: &[String]) -> Result<()> {
        let range = format!("{}!A1", quote_title(table));
        let token = self.bearer().await?;
        let response = self
            .http
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "range": range, "values": [header] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Quote a sheet title for use in an A1 range, doubling embedded quotes.
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[async_trait::async_trait]
impl TableStore for SheetsClient {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        // Always re-check against the live spreadsheet: an external actor
        // may add or remove sheets between cycles.
        self.invalidate_sheet_ids().await;
        Ok(self.sheet_id_map().await?.contains_key(table))
    }

    async fn read_all(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.values_url(&quote_title(table)))
            .bearer_auth(token)
            .send()
            .await?;
        let range: ValueRange = Self::check(response).await?.json().await?;
        Ok(range.values)
    }

    async fn append_row(&self, table: &str, row: &[String]) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(format!("{}:append", self.values_url(&quote_title(table))))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_row(&self, table: &str, row_number: u32) -> Result<()> {
        let sheet_id = self.numeric_sheet_id(table).await?;
        // deleteDimension takes a 0-based half-open row range
        self.batch_update(json!([{
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_number - 1,
                    "endIndex": row_number,
                }
            }
        }]))
        .await
    }

    async fn create_table(&self, table: &str, header: &[String]) -> Result<()> {
        self.batch_update(json!([{
            "addSheet": {
                "properties": {
                    "title": table,
                    "gridProperties": {
                        "rowCount": NEW_SHEET_ROWS,
                        "columnCount": header.len(),
                    }
                }
            }
        }]))
        .await?;
        self.invalidate_sheet_ids().await;
        self.write_header(table, header).await
    }

    async fn reset_table(&self, table: &str, header: &[String]) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(format!("{}:clear", self.values_url(&quote_title(table))))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        self.write_header(table, header).await
    }
}
