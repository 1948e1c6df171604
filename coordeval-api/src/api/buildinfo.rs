//! Build information endpoint

use axum::response::Json;
use coordeval_common::assembler::SHEET_COLUMNS;
use coordeval_common::rubric::RATING_LABELS;
use coordeval_common::Competency;
use serde::Serialize;

/// Build identity plus the shape of the rubric compiled into it
///
/// The counts let an operator check a deployed build against the header row
/// of the spreadsheet it mirrors to.
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
    pub competencies: usize,
    pub rating_levels: usize,
    pub sheet_columns: usize,
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
        competencies: Competency::ALL.len(),
        rating_levels: RATING_LABELS.len(),
        sheet_columns: SHEET_COLUMNS.len(),
    })
}
