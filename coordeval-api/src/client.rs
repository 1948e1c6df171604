//! HTTP client for a running coordeval-api service
//!
//! Posts to `/api/sheets/append` and maps the response back onto the
//! dispatcher's result types, so a [`FormController`](crate::form::FormController)
//! can submit remotely exactly as it would in-process.

use async_trait::async_trait;
use coordeval_common::{EvaluationBase, Responses};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::api::SubmissionResponse;
use crate::dispatch::{SubmissionOutcome, SubmissionSink, SubmitError};

pub const SUBMIT_PATH: &str = "/api/sheets/append";

#[derive(Serialize)]
struct EvaluationBody<'a> {
    base: &'a EvaluationBase,
    competencias: &'a Responses,
}

#[derive(Serialize)]
struct BatchBody<'a> {
    #[serde(rename = "spreadsheetId")]
    spreadsheet_id: &'a str,
    #[serde(rename = "sheetName")]
    sheet_name: &'a str,
    rows: &'a [Map<String, Value>],
}

pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl SubmissionClient {
    /// Client for the service at `base_url` (e.g. `http://127.0.0.1:5790`)
    pub fn new(base_url: &str) -> Result<Self, SubmitError> {
        let endpoint = reqwest::Url::parse(base_url)
            .and_then(|url| url.join(SUBMIT_PATH))
            .map_err(|e| SubmitError::Transport(format!("URL inválida {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    /// Submit a finished evaluation
    ///
    /// 400 maps to [`SubmitError::Validation`], 500 to
    /// [`SubmitError::Persistence`], anything else to
    /// [`SubmitError::Transport`].
    pub async fn submit_evaluation(
        &self,
        base: &EvaluationBase,
        responses: &Responses,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let response = self
            .post(&EvaluationBody {
                base,
                competencias: responses,
            })
            .await?;
        Ok(response.into_outcome())
    }

    /// Append raw rows to a spreadsheet tab through the service
    ///
    /// Returns the number of rows appended.
    pub async fn append_batch(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        rows: &[Map<String, Value>],
    ) -> Result<usize, SubmitError> {
        let response = self
            .post(&BatchBody {
                spreadsheet_id,
                sheet_name,
                rows,
            })
            .await
            .map_err(|e| match e {
                // Nothing is persisted in batch mode
                SubmitError::Persistence(message) => SubmitError::Transport(message),
                other => other,
            })?;
        Ok(response.appended.unwrap_or(0))
    }

    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<SubmissionResponse, SubmitError> {
        debug!(endpoint = %self.endpoint, "Posting submission");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(format!("Falha de comunicação com o servidor: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SubmissionResponse>()
                .await
                .map_err(|e| SubmitError::Transport(format!("Resposta inválida do servidor: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        let message = if text.trim().is_empty() {
            "Erro ao enviar avaliação.".to_string()
        } else {
            text
        };

        Err(match status {
            StatusCode::BAD_REQUEST => SubmitError::Validation(message),
            StatusCode::INTERNAL_SERVER_ERROR => SubmitError::Persistence(message),
            other => SubmitError::Transport(format!("{} {}", other.as_u16(), message)),
        })
    }
}

#[async_trait]
impl SubmissionSink for SubmissionClient {
    async fn submit(
        &self,
        base: &EvaluationBase,
        responses: &Responses,
    ) -> Result<SubmissionOutcome, SubmitError> {
        self.submit_evaluation(base, responses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_submit_path() {
        let client = SubmissionClient::new("http://127.0.0.1:5790").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:5790/api/sheets/append");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SubmissionClient::new("not a url").err().unwrap();
        assert!(matches!(err, SubmitError::Transport(_)));
    }
}
