//! Report spreadsheet mirror
//!
//! Appends report rows to a spreadsheet tab. The mirror is a secondary
//! projection of the datastore and may diverge from it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod google;

pub use google::{GoogleSheetsClient, SHEETS_API_BASE, SHEETS_SCOPE, TOKEN_URL};

/// Spreadsheet and tab receiving rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Spreadsheet append failure
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("GOOGLE_SHEETS_SPREADSHEET_ID ausente.")]
    MissingSpreadsheet,

    #[error("Credenciais do Service Account ausentes (GOOGLE_SHEETS_CLIENT_EMAIL/PRIVATE_KEY).")]
    MissingCredentials,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Append-rows interface of the spreadsheet service
#[async_trait]
pub trait SheetMirror: Send + Sync {
    /// Append `rows` (already in column order) below the last row of the tab
    ///
    /// Returns the number of rows appended.
    async fn append_rows(&self, target: &SheetTarget, rows: Vec<Vec<Value>>) -> Result<usize, MirrorError>;
}
