//! Competency catalog endpoint

use axum::Json;
use coordeval_common::rubric::{self, CompetencyDefinition};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub competencies: &'static [CompetencyDefinition],
    pub rating_labels: [&'static str; 4],
}

/// GET /api/competencies
///
/// The ten competencies in canonical order, each with its four rating levels.
pub async fn list_competencies() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        competencies: rubric::catalog(),
        rating_labels: rubric::RATING_LABELS,
    })
}
