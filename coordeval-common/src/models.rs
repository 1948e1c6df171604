//! Evaluation data model
//!
//! Wire names follow the submission payload contract; Rust names follow the
//! `coordinators` table columns.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::rubric::{self, Competency, CompetencyDefinition, Rating};

/// A coordinator as stored in the `coordinators` table
///
/// Read-only to this system. Only `registration` and `name` are mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    #[serde(rename = "regional", default)]
    pub regional: Option<String>,
    #[serde(rename = "cadastro", deserialize_with = "text")]
    pub registration: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "admissao", default)]
    pub admission: Option<String>,
    #[serde(rename = "cpf", default)]
    pub national_id: Option<String>,
    #[serde(rename = "cargo", default)]
    pub job_title: Option<String>,
    #[serde(rename = "local", default)]
    pub location: Option<String>,
    /// Organizational unit the person belongs to
    #[serde(rename = "escola", default)]
    pub school: Option<String>,
    #[serde(rename = "horas_mes", default, deserialize_with = "optional_text")]
    pub monthly_hours: Option<String>,
    #[serde(rename = "horas_semana", default, deserialize_with = "optional_text")]
    pub weekly_hours: Option<String>,
    #[serde(rename = "tempo_casa_meses", default, deserialize_with = "optional_text")]
    pub tenure_months: Option<String>,
    #[serde(rename = "total_carga_horaria_acumulada", default, deserialize_with = "optional_text")]
    pub cumulative_hours: Option<String>,
    #[serde(rename = "horas_faltas_injustificadas", default, deserialize_with = "optional_text")]
    pub unexcused_absence_hours: Option<String>,
    #[serde(rename = "perc_faltas_injustificadas", default, deserialize_with = "optional_text")]
    pub unexcused_absence_pct: Option<String>,
}

// Spreadsheet exports and older clients send hour counts and registration
// numbers as JSON numbers.
fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    optional_text(deserializer)?.ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Snapshot of the evaluated person plus the unit chosen in the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationBase {
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(flatten)]
    pub person: Person,
}

impl EvaluationBase {
    /// Capture the snapshot at the moment scoring begins
    pub fn capture(unit: &str, person: &Person) -> Self {
        Self {
            unit: unit.to_string(),
            person: person.clone(),
        }
    }
}

/// Answer for one competency
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompetencyResponse {
    #[serde(rename = "avaliacao", default)]
    pub rating: Option<Rating>,
    #[serde(rename = "acoes_desenvolvimento", default, skip_serializing_if = "Option::is_none")]
    pub development_actions: Option<String>,
}

impl CompetencyResponse {
    pub fn rated(rating: Rating) -> Self {
        Self {
            rating: Some(rating),
            development_actions: None,
        }
    }
}

/// Identifier of a response entry as received
///
/// Payloads are keyed by raw strings; anything outside the catalog is kept
/// verbatim so the assembler can still emit a row for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    Known(Competency),
    Unknown(String),
}

impl ResponseKey {
    pub fn parse(key: &str) -> Self {
        match Competency::from_key(key) {
            Some(competency) => ResponseKey::Known(competency),
            None => ResponseKey::Unknown(key.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResponseKey::Known(competency) => competency.key(),
            ResponseKey::Unknown(raw) => raw,
        }
    }

    pub fn definition(&self) -> Option<&'static CompetencyDefinition> {
        match self {
            ResponseKey::Known(competency) => Some(competency.definition()),
            ResponseKey::Unknown(raw) => rubric::lookup(raw),
        }
    }
}

impl From<Competency> for ResponseKey {
    fn from(competency: Competency) -> Self {
        ResponseKey::Known(competency)
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-competency responses, in insertion order
///
/// Serializes as a JSON object keyed by competency identifier. Re-inserting an
/// existing key replaces the response in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Responses {
    entries: Vec<(ResponseKey, CompetencyResponse)>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ResponseKey>, response: CompetencyResponse) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = response,
            None => self.entries.push((key, response)),
        }
    }

    pub fn get(&self, competency: Competency) -> Option<&CompetencyResponse> {
        self.entries
            .iter()
            .find(|(k, _)| *k == ResponseKey::Known(competency))
            .map(|(_, r)| r)
    }

    /// Mutable entry for a competency, created empty if absent
    pub fn entry(&mut self, competency: Competency) -> &mut CompetencyResponse {
        let key = ResponseKey::Known(competency);
        let index = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key, CompetencyResponse::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResponseKey, &CompetencyResponse)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog competencies without a rating, in canonical order
    pub fn unrated(&self) -> Vec<Competency> {
        Competency::ALL
            .into_iter()
            .filter(|c| self.get(*c).and_then(|r| r.rating).is_none())
            .collect()
    }

    /// Identifiers outside the catalog
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                ResponseKey::Unknown(raw) => Some(raw.as_str()),
                ResponseKey::Known(_) => None,
            })
            .collect()
    }

    /// True iff every one of the ten competencies has a rating
    pub fn is_complete(&self) -> bool {
        self.unrated().is_empty()
    }
}

impl FromIterator<(Competency, CompetencyResponse)> for Responses {
    fn from_iter<I: IntoIterator<Item = (Competency, CompetencyResponse)>>(iter: I) -> Self {
        let mut responses = Responses::new();
        for (competency, response) in iter {
            responses.insert(competency, response);
        }
        responses
    }
}

impl Serialize for Responses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, response) in &self.entries {
            map.serialize_entry(key.as_str(), response)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Responses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResponsesVisitor;

        impl<'de> Visitor<'de> for ResponsesVisitor {
            type Value = Responses;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of competency identifiers to responses")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Responses, A::Error> {
                let mut responses = Responses::new();
                while let Some((key, response)) =
                    access.next_entry::<String, CompetencyResponse>()?
                {
                    responses.insert(ResponseKey::parse(&key), response);
                }
                Ok(responses)
            }
        }

        deserializer.deserialize_map(ResponsesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_responses_preserve_document_order() {
        let responses: Responses = serde_json::from_value(json!({
            "tomada_decisao_analise_dados": { "avaliacao": 2 },
            "integridade_responsabilidade_publica": { "avaliacao": 4, "acoes_desenvolvimento": "Mentoria" },
            "competencia_inexistente": { "avaliacao": 1 },
        }))
        .unwrap();

        let keys: Vec<&str> = responses.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "tomada_decisao_analise_dados",
                "integridade_responsabilidade_publica",
                "competencia_inexistente",
            ]
        );
        assert_eq!(responses.unknown_keys(), vec!["competencia_inexistente"]);
        assert_eq!(
            responses
                .get(Competency::PublicIntegrity)
                .and_then(|r| r.development_actions.as_deref()),
            Some("Mentoria")
        );
    }

    #[test]
    fn test_missing_rating_deserializes_as_none() {
        let responses: Responses = serde_json::from_value(json!({
            "gestao_compras_orcamento": { "acoes_desenvolvimento": "Curso" },
        }))
        .unwrap();
        assert_eq!(responses.get(Competency::ProcurementAndBudget).unwrap().rating, None);
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let result: Result<Responses, _> = serde_json::from_value(json!({
            "gestao_compras_orcamento": { "avaliacao": 5 },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_completeness() {
        let mut responses: Responses = Competency::ALL
            .into_iter()
            .take(9)
            .map(|c| (c, CompetencyResponse::rated(Rating::Two)))
            .collect();
        assert!(!responses.is_complete());
        assert_eq!(responses.unrated(), vec![Competency::PedagogicalArticulation]);

        responses.entry(Competency::PedagogicalArticulation).development_actions =
            Some("Acompanhar indicadores".to_string());
        assert!(!responses.is_complete());

        responses.entry(Competency::PedagogicalArticulation).rating = Some(Rating::Four);
        assert!(responses.is_complete());
        assert_eq!(responses.len(), 10);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut responses = Responses::new();
        responses.insert(Competency::PeopleManagement, CompetencyResponse::rated(Rating::One));
        responses.insert(Competency::PublicIntegrity, CompetencyResponse::rated(Rating::One));
        responses.insert(Competency::PeopleManagement, CompetencyResponse::rated(Rating::Three));

        assert_eq!(responses.len(), 2);
        let (first_key, first) = responses.iter().next().unwrap();
        assert_eq!(*first_key, ResponseKey::Known(Competency::PeopleManagement));
        assert_eq!(first.rating, Some(Rating::Three));
    }

    #[test]
    fn test_evaluation_base_wire_shape() {
        let base: EvaluationBase = serde_json::from_value(json!({
            "unidade": "Escola A",
            "regional": "Norte",
            "cadastro": "1234",
            "nome": "Maria Souza",
            "cargo": "Coordenadora",
            "escola": "Escola A",
            "tempo_casa_meses": 18,
        }))
        .unwrap();

        assert_eq!(base.unit, "Escola A");
        assert_eq!(base.person.registration, "1234");
        assert_eq!(base.person.job_title.as_deref(), Some("Coordenadora"));
        assert_eq!(base.person.national_id, None);
        assert_eq!(base.person.tenure_months.as_deref(), Some("18"));

        let missing_name = serde_json::from_value::<EvaluationBase>(json!({
            "unidade": "Escola A",
            "cadastro": "1234",
        }));
        assert!(missing_name.is_err());
    }
}
