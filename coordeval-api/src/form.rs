//! Evaluation form controller
//!
//! Two-step wizard driving one evaluation at a time:
//! - **Selecting**: choose a unit, then a person from that unit.
//! - **Scoring**: rate each of the ten competencies and add optional notes.
//!
//! A successful submit resets the form to an empty Selecting step. A failed
//! submit keeps every entered score so the user can retry. Choosing a unit
//! again always returns to Selecting and discards scores in progress.

use coordeval_common::{Competency, EvaluationBase, Person, Rating, Responses};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::{SubmissionOutcome, SubmissionSink, SubmitError};
use crate::lookup::PersonLookup;

/// Form operation rejected in the current state
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Selecione uma unidade.")]
    NoUnitSelected,

    #[error("Coordenador não encontrado: {0}.")]
    UnknownPerson(String),

    #[error("Nenhuma avaliação em andamento.")]
    NotScoring,

    #[error("Avaliação incompleta: {} competência(s) sem nota.", .0.len())]
    Incomplete(Vec<Competency>),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Current wizard step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStep {
    #[default]
    Selecting,
    Scoring {
        /// Snapshot taken when the person was picked
        base: EvaluationBase,
        responses: Responses,
    },
}

#[derive(Debug, Default)]
pub struct FormController {
    units: Vec<String>,
    unit: Option<String>,
    people: Vec<Person>,
    notice: Option<String>,
    step: FormStep,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the unit list; a failed query leaves it empty with a notice
    pub async fn load_units(&mut self, lookup: &PersonLookup) {
        match lookup.list_units().await {
            Ok(units) => {
                debug!(count = units.len(), "Units loaded");
                self.units = units;
            }
            Err(e) => {
                warn!("Unit list unavailable: {}", e);
                self.units.clear();
                self.notice = Some(format!("Erro ao carregar unidades: {}", e));
            }
        }
    }

    /// Choose a unit and load its people
    ///
    /// Returns to Selecting, dropping any chosen person and scores.
    pub async fn select_unit(&mut self, unit: &str, lookup: &PersonLookup) {
        if matches!(self.step, FormStep::Scoring { .. }) {
            info!(unit = %unit, "Unit changed during scoring, discarding scores");
        }

        self.step = FormStep::Selecting;
        self.people.clear();
        self.notice = None;
        self.unit = Some(unit.to_string());

        match lookup.find_people(unit).await {
            Ok(people) => self.people = people,
            Err(e) => {
                warn!(unit = %unit, "Person list unavailable: {}", e);
                self.notice = Some(format!("Erro ao carregar coordenadores: {}", e));
            }
        }
    }

    /// Pick a person of the current unit and start scoring
    pub fn select_person(&mut self, registration: &str) -> Result<(), FormError> {
        let unit = self.unit.as_deref().ok_or(FormError::NoUnitSelected)?;
        let person = self
            .people
            .iter()
            .find(|p| p.registration == registration)
            .ok_or_else(|| FormError::UnknownPerson(registration.to_string()))?;

        self.step = FormStep::Scoring {
            base: EvaluationBase::capture(unit, person),
            responses: Responses::new(),
        };
        Ok(())
    }

    pub fn set_rating(&mut self, competency: Competency, rating: Rating) -> Result<(), FormError> {
        self.responses_mut()?.entry(competency).rating = Some(rating);
        Ok(())
    }

    /// Blank notes clear the field
    pub fn set_notes(&mut self, competency: Competency, notes: &str) -> Result<(), FormError> {
        let notes = (!notes.trim().is_empty()).then(|| notes.to_string());
        self.responses_mut()?.entry(competency).development_actions = notes;
        Ok(())
    }

    /// All ten competencies rated
    pub fn is_complete(&self) -> bool {
        self.responses().is_some_and(Responses::is_complete)
    }

    pub fn can_submit(&self) -> bool {
        self.is_complete()
    }

    /// Send the evaluation to `sink`
    ///
    /// Nothing is sent while any competency lacks a rating.
    pub async fn submit(&mut self, sink: &dyn SubmissionSink) -> Result<SubmissionOutcome, FormError> {
        let FormStep::Scoring { base, responses } = &self.step else {
            return Err(FormError::NotScoring);
        };

        let pending = responses.unrated();
        if !pending.is_empty() {
            return Err(FormError::Incomplete(pending));
        }

        let result = sink.submit(base, responses).await;
        match result {
            Ok(outcome) => {
                self.reset();
                self.notice = outcome
                    .sheet_error()
                    .map(|e| format!("Avaliação salva, mas a planilha não foi atualizada: {}", e));
                Ok(outcome)
            }
            Err(e) => {
                warn!("Submission failed, keeping entered scores: {}", e);
                self.notice = Some(e.to_string());
                Err(FormError::Submit(e))
            }
        }
    }

    fn reset(&mut self) {
        self.unit = None;
        self.people.clear();
        self.notice = None;
        self.step = FormStep::Selecting;
    }

    fn responses_mut(&mut self) -> Result<&mut Responses, FormError> {
        match &mut self.step {
            FormStep::Scoring { responses, .. } => Ok(responses),
            FormStep::Selecting => Err(FormError::NotScoring),
        }
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Message to show the user, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn step(&self) -> &FormStep {
        &self.step
    }

    pub fn base(&self) -> Option<&EvaluationBase> {
        match &self.step {
            FormStep::Scoring { base, .. } => Some(base),
            FormStep::Selecting => None,
        }
    }

    pub fn responses(&self) -> Option<&Responses> {
        match &self.step {
            FormStep::Scoring { responses, .. } => Some(responses),
            FormStep::Selecting => None,
        }
    }
}
