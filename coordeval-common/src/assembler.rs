//! Submission row assembly
//!
//! Turns one evaluation (person snapshot + responses) into the rows written to
//! the datastore and the rows appended to the report spreadsheet. Pure
//! transformation, no I/O.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{CompetencyResponse, EvaluationBase, ResponseKey, Responses};
use crate::rubric::Rating;

/// Report spreadsheet columns, in sheet order
pub const SHEET_COLUMNS: [&str; 24] = [
    "data_envio",
    "unidade",
    "regional",
    "cadastro",
    "nome",
    "admissao",
    "cpf",
    "cargo",
    "local",
    "escola",
    "horas_mes",
    "horas_semana",
    "tempo_casa_meses",
    "total_carga_horaria_acumulada",
    "horas_faltas_injustificadas",
    "perc_faltas_injustificadas",
    "competencia",
    "pergunta",
    "nivel_1",
    "nivel_2",
    "nivel_3",
    "nivel_4",
    "avaliacao",
    "acoes_desenvolvimento",
];

/// One `competency_assessments` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedRow {
    #[serde(rename = "competencia")]
    pub competency: String,
    #[serde(rename = "descricao")]
    pub prompt: Option<String>,
    #[serde(rename = "nivel_1")]
    pub level_1: Option<String>,
    #[serde(rename = "nivel_2")]
    pub level_2: Option<String>,
    #[serde(rename = "nivel_3")]
    pub level_3: Option<String>,
    #[serde(rename = "nivel_4")]
    pub level_4: Option<String>,
    #[serde(rename = "avaliacao")]
    pub rating: Option<Rating>,
    #[serde(rename = "acoes_desenvolvimento")]
    pub development_actions: Option<String>,
}

impl PersistedRow {
    fn from_response(key: &ResponseKey, response: &CompetencyResponse) -> Self {
        let definition = key.definition();
        let level = |index: usize| definition.map(|d| d.levels[index].description.to_string());

        Self {
            competency: definition
                .map(|d| d.title.to_string())
                .unwrap_or_else(|| key.as_str().to_string()),
            prompt: definition.map(|d| d.prompt.to_string()),
            level_1: level(0),
            level_2: level(1),
            level_3: level(2),
            level_4: level(3),
            rating: response.rating,
            development_actions: response.development_actions.clone(),
        }
    }
}

/// One report spreadsheet row
///
/// Context fields are never null here: missing values become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "data_envio")]
    pub submitted_at: String,
    #[serde(rename = "unidade")]
    pub unit: String,
    pub regional: String,
    #[serde(rename = "cadastro")]
    pub registration: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "admissao")]
    pub admission: String,
    #[serde(rename = "cpf")]
    pub national_id: String,
    #[serde(rename = "cargo")]
    pub job_title: String,
    #[serde(rename = "local")]
    pub location: String,
    #[serde(rename = "escola")]
    pub school: String,
    #[serde(rename = "horas_mes")]
    pub monthly_hours: String,
    #[serde(rename = "horas_semana")]
    pub weekly_hours: String,
    #[serde(rename = "tempo_casa_meses")]
    pub tenure_months: String,
    #[serde(rename = "total_carga_horaria_acumulada")]
    pub cumulative_hours: String,
    #[serde(rename = "horas_faltas_injustificadas")]
    pub unexcused_absence_hours: String,
    #[serde(rename = "perc_faltas_injustificadas")]
    pub unexcused_absence_pct: String,
    #[serde(rename = "competencia")]
    pub competency: String,
    #[serde(rename = "pergunta")]
    pub question: Option<String>,
    #[serde(rename = "nivel_1")]
    pub level_1: Option<String>,
    #[serde(rename = "nivel_2")]
    pub level_2: Option<String>,
    #[serde(rename = "nivel_3")]
    pub level_3: Option<String>,
    #[serde(rename = "nivel_4")]
    pub level_4: Option<String>,
    #[serde(rename = "avaliacao")]
    pub rating: Option<Rating>,
    #[serde(rename = "acoes_desenvolvimento")]
    pub development_actions: String,
}

impl ReportRow {
    fn merge(base: &EvaluationBase, row: &PersistedRow) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let person = &base.person;

        Self {
            submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            unit: base.unit.clone(),
            regional: text(&person.regional),
            registration: person.registration.clone(),
            name: person.name.clone(),
            admission: text(&person.admission),
            national_id: text(&person.national_id),
            job_title: text(&person.job_title),
            location: text(&person.location),
            school: text(&person.school),
            monthly_hours: text(&person.monthly_hours),
            weekly_hours: text(&person.weekly_hours),
            tenure_months: text(&person.tenure_months),
            cumulative_hours: text(&person.cumulative_hours),
            unexcused_absence_hours: text(&person.unexcused_absence_hours),
            unexcused_absence_pct: text(&person.unexcused_absence_pct),
            competency: row.competency.clone(),
            question: row.prompt.clone(),
            level_1: row.level_1.clone(),
            level_2: row.level_2.clone(),
            level_3: row.level_3.clone(),
            level_4: row.level_4.clone(),
            rating: row.rating,
            development_actions: text(&row.development_actions),
        }
    }

    /// Cell values in `SHEET_COLUMNS` order, nulls as empty strings
    pub fn values(&self) -> Vec<Value> {
        fn text(s: &str) -> Value {
            Value::String(s.to_string())
        }
        fn optional(s: &Option<String>) -> Value {
            text(s.as_deref().unwrap_or(""))
        }

        vec![
            text(&self.submitted_at),
            text(&self.unit),
            text(&self.regional),
            text(&self.registration),
            text(&self.name),
            text(&self.admission),
            text(&self.national_id),
            text(&self.job_title),
            text(&self.location),
            text(&self.school),
            text(&self.monthly_hours),
            text(&self.weekly_hours),
            text(&self.tenure_months),
            text(&self.cumulative_hours),
            text(&self.unexcused_absence_hours),
            text(&self.unexcused_absence_pct),
            text(&self.competency),
            optional(&self.question),
            optional(&self.level_1),
            optional(&self.level_2),
            optional(&self.level_3),
            optional(&self.level_4),
            self.rating
                .map(|r| Value::from(r.value()))
                .unwrap_or_else(|| text("")),
            text(&self.development_actions),
        ]
    }
}

/// Project an arbitrary row object onto the sheet columns
///
/// Missing and null cells become empty strings.
pub fn project_row(row: &Map<String, Value>) -> Vec<Value> {
    SHEET_COLUMNS
        .iter()
        .map(|column| match row.get(*column) {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(value) => value.clone(),
        })
        .collect()
}

/// Build datastore and report rows for one submission
///
/// One row of each kind per response entry, in input order. Unknown
/// identifiers keep their raw key as title and get no rubric text; entries
/// without a rating are still emitted. Each report row takes its own
/// timestamp.
pub fn build_rows(base: &EvaluationBase, responses: &Responses) -> (Vec<PersistedRow>, Vec<ReportRow>) {
    let persisted: Vec<PersistedRow> = responses
        .iter()
        .map(|(key, response)| PersistedRow::from_response(key, response))
        .collect();

    let report = persisted
        .iter()
        .map(|row| ReportRow::merge(base, row))
        .collect();

    (persisted, report)
}
