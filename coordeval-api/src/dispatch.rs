//! Dual-write submission dispatcher
//!
//! The datastore insert is the source of truth. The spreadsheet append runs
//! only after a successful insert, is attempted once, and its failure never
//! fails the submission: it comes back as [`MirrorStatus::Failed`].

use async_trait::async_trait;
use coordeval_common::assembler::{build_rows, PersistedRow};
use coordeval_common::config::ServiceConfig;
use coordeval_common::{EvaluationBase, Responses};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::sheets::{MirrorError, SheetMirror, SheetTarget};

/// Append-only evaluation storage
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Insert all rows as one batch, optionally stamping each with the
    /// person snapshot. Returns the number of rows written.
    async fn insert_assessments(
        &self,
        rows: &[PersistedRow],
        context: Option<&EvaluationBase>,
    ) -> coordeval_common::Result<u64>;
}

/// Anything that accepts a finished evaluation
///
/// Implemented in-process by [`Dispatcher`] and remotely by
/// [`SubmissionClient`](crate::client::SubmissionClient).
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(
        &self,
        base: &EvaluationBase,
        responses: &Responses,
    ) -> Result<SubmissionOutcome, SubmitError>;
}

/// Why a submission was not stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Rejected before any write
    #[error("{0}")]
    Validation(String),

    /// Datastore write failed; nothing was mirrored
    #[error("{0}")]
    Persistence(String),

    /// The submission service could not be reached or answered unexpectedly
    #[error("{0}")]
    Transport(String),
}

/// Result of the spreadsheet mirror step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    Appended(usize),
    Failed(String),
}

/// A stored submission
///
/// The mirror may have failed even though the submission succeeded; check
/// [`SubmissionOutcome::sheet_error`].
#[must_use = "the spreadsheet mirror may have failed"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub inserted: usize,
    pub mirror: MirrorStatus,
}

impl SubmissionOutcome {
    pub fn appended(&self) -> Option<usize> {
        match self.mirror {
            MirrorStatus::Appended(count) => Some(count),
            MirrorStatus::Failed(_) => None,
        }
    }

    pub fn sheet_error(&self) -> Option<&str> {
        match &self.mirror {
            MirrorStatus::Appended(_) => None,
            MirrorStatus::Failed(message) => Some(message),
        }
    }
}

/// Dispatcher settings, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Target spreadsheet; `None` makes every mirror attempt fail
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    /// Store the person snapshot on every assessment row
    pub persist_context: bool,
}

impl DispatchConfig {
    fn target(&self) -> Option<SheetTarget> {
        self.spreadsheet_id.as_ref().map(|id| SheetTarget {
            spreadsheet_id: id.clone(),
            sheet_name: self.sheet_name.clone(),
        })
    }
}

impl From<&ServiceConfig> for DispatchConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            spreadsheet_id: config.sheets.spreadsheet_id.clone(),
            sheet_name: config.sheets.sheet_name.clone(),
            persist_context: config.persist_context,
        }
    }
}

/// Persists evaluations, then mirrors them to the report spreadsheet
pub struct Dispatcher {
    store: Arc<dyn EvaluationStore>,
    mirror: Arc<dyn SheetMirror>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        mirror: Arc<dyn SheetMirror>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            mirror,
            config,
        }
    }

    pub fn mirror(&self) -> Arc<dyn SheetMirror> {
        Arc::clone(&self.mirror)
    }

    /// Validate, persist, then mirror one evaluation
    pub async fn submit(
        &self,
        base: &EvaluationBase,
        responses: &Responses,
    ) -> Result<SubmissionOutcome, SubmitError> {
        validate(responses)?;

        let (persisted, report) = build_rows(base, responses);

        let context = self.config.persist_context.then_some(base);
        self.store
            .insert_assessments(&persisted, context)
            .await
            .map_err(|e| {
                error!(registration = %base.person.registration, "Assessment insert failed: {}", e);
                SubmitError::Persistence(format!("Erro ao inserir no banco de dados: {}", e))
            })?;

        info!(
            registration = %base.person.registration,
            unit = %base.unit,
            rows = persisted.len(),
            "Evaluation stored"
        );

        let values = report.iter().map(|row| row.values()).collect();
        let mirror = match self.append(values).await {
            Ok(count) => {
                info!(rows = count, "Evaluation mirrored to spreadsheet");
                MirrorStatus::Appended(count)
            }
            Err(e) => {
                warn!(
                    registration = %base.person.registration,
                    "Spreadsheet mirror failed, datastore rows kept: {}", e
                );
                MirrorStatus::Failed(e.to_string())
            }
        };

        Ok(SubmissionOutcome {
            inserted: persisted.len(),
            mirror,
        })
    }

    async fn append(&self, values: Vec<Vec<serde_json::Value>>) -> Result<usize, MirrorError> {
        let target = self.config.target().ok_or(MirrorError::MissingSpreadsheet)?;
        self.mirror.append_rows(&target, values).await
    }
}

#[async_trait]
impl SubmissionSink for Dispatcher {
    async fn submit(
        &self,
        base: &EvaluationBase,
        responses: &Responses,
    ) -> Result<SubmissionOutcome, SubmitError> {
        Dispatcher::submit(self, base, responses).await
    }
}

/// Completeness gate applied before any write
///
/// Every competency must be rated and no identifier may fall outside the
/// catalog.
pub fn validate(responses: &Responses) -> Result<(), SubmitError> {
    let unknown = responses.unknown_keys();
    if !unknown.is_empty() {
        return Err(SubmitError::Validation(format!(
            "Competência desconhecida: {}.",
            unknown.join(", ")
        )));
    }

    let unrated = responses.unrated();
    if !unrated.is_empty() {
        let pending: Vec<&str> = unrated.iter().map(|c| c.key()).collect();
        return Err(SubmitError::Validation(format!(
            "Avaliação incompleta: atribua uma nota (1 a 4) em todas as competências. Pendentes: {}.",
            pending.join(", ")
        )));
    }

    Ok(())
}
