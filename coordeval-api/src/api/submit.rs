//! Submission endpoint
//!
//! `POST /api/sheets/append` accepts two bodies:
//! - `{ base, competencias }`: a finished evaluation, persisted then mirrored
//! - `{ spreadsheetId, sheetName, rows }`: raw rows appended to a spreadsheet tab
//!
//! Rejections are plain-text Portuguese messages. A spreadsheet failure after
//! a successful insert is still a 200, carried in `sheet_error`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coordeval_common::assembler::project_row;
use coordeval_common::{EvaluationBase, Responses};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::dispatch::{MirrorStatus, SubmissionOutcome, SubmitError};
use crate::sheets::SheetTarget;
use crate::AppState;

pub const INVALID_PAYLOAD: &str =
    "Payload inválido. Envie { base, competencias } ou { spreadsheetId, sheetName, rows }.";

#[derive(Debug, Deserialize)]
struct EvaluationRequest {
    base: EvaluationBase,
    competencias: Responses,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: String,
    #[serde(rename = "sheetName")]
    sheet_name: String,
    rows: Vec<Map<String, Value>>,
}

/// Success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appended: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_error: Option<String>,
}

impl From<&SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: &SubmissionOutcome) -> Self {
        Self {
            ok: true,
            inserted: Some(outcome.inserted),
            appended: outcome.appended(),
            sheet_error: outcome.sheet_error().map(str::to_string),
        }
    }
}

impl SubmissionResponse {
    /// Rebuild the dispatcher outcome from a decoded response
    pub fn into_outcome(self) -> SubmissionOutcome {
        let mirror = match (self.sheet_error, self.appended) {
            (Some(message), _) => MirrorStatus::Failed(message),
            (None, Some(count)) => MirrorStatus::Appended(count),
            (None, None) => MirrorStatus::Appended(0),
        };
        SubmissionOutcome {
            inserted: self.inserted.unwrap_or(0),
            mirror,
        }
    }
}

/// Rejected submission, rendered as plain text
#[derive(Debug)]
pub enum SubmitApiError {
    BadRequest(String),
    Internal(String),
}

impl From<SubmitError> for SubmitApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation(message) => SubmitApiError::BadRequest(message),
            SubmitError::Persistence(message) | SubmitError::Transport(message) => {
                SubmitApiError::Internal(message)
            }
        }
    }
}

impl IntoResponse for SubmitApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SubmitApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            SubmitApiError::Internal(message) if message.is_empty() => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno.".to_string())
            }
            SubmitApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, message).into_response()
    }
}

/// POST /api/sheets/append
pub async fn append_submission(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionResponse>, SubmitApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| SubmitApiError::BadRequest(INVALID_PAYLOAD.to_string()))?;

    if is_present(&payload, "base") && is_present(&payload, "competencias") {
        let request: EvaluationRequest = serde_json::from_value(payload)
            .map_err(|e| SubmitApiError::BadRequest(format!("Payload inválido: {}", e)))?;

        let outcome = state
            .dispatcher
            .submit(&request.base, &request.competencias)
            .await?;
        return Ok(Json(SubmissionResponse::from(&outcome)));
    }

    if is_present(&payload, "spreadsheetId")
        && is_present(&payload, "sheetName")
        && payload.get("rows").is_some_and(Value::is_array)
    {
        let batch: BatchRequest = serde_json::from_value(payload)
            .map_err(|e| SubmitApiError::BadRequest(format!("Payload inválido: {}", e)))?;
        return append_batch(&state, batch).await.map(Json);
    }

    Err(SubmitApiError::BadRequest(INVALID_PAYLOAD.to_string()))
}

async fn append_batch(state: &AppState, batch: BatchRequest) -> Result<SubmissionResponse, SubmitApiError> {
    let target = SheetTarget {
        spreadsheet_id: batch.spreadsheet_id,
        sheet_name: batch.sheet_name,
    };
    let values: Vec<Vec<Value>> = batch.rows.iter().map(project_row).collect();

    let appended = state
        .dispatcher
        .mirror()
        .append_rows(&target, values)
        .await
        .map_err(|e| {
            error!(spreadsheet = %target.spreadsheet_id, "Batch append failed: {}", e);
            SubmitApiError::Internal(e.to_string())
        })?;

    info!(spreadsheet = %target.spreadsheet_id, rows = appended, "Batch appended");

    Ok(SubmissionResponse {
        ok: true,
        inserted: None,
        appended: Some(appended),
        sheet_error: None,
    })
}

// Absent, null, false, 0 and "" all count as missing
fn is_present(payload: &Value, key: &str) -> bool {
    match payload.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}
