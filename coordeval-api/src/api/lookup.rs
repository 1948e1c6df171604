//! Unit and person lookup endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coordeval_common::Person;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::lookup::LookupError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeopleQuery {
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct UnitsResponse {
    pub units: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    pub unit: String,
    pub people: Vec<Person>,
}

/// GET /api/units
pub async fn list_units(State(state): State<AppState>) -> Result<Json<UnitsResponse>, LookupApiError> {
    let units = state.lookup.list_units().await?;
    Ok(Json(UnitsResponse { units }))
}

/// GET /api/people?unit=Escola%20A
///
/// Exact unit match first, then a case-insensitive substring match. An
/// unknown or blank unit yields an empty list.
pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<PeopleQuery>,
) -> Result<Json<PeopleResponse>, LookupApiError> {
    let people = state.lookup.find_people(&query.unit).await?;
    Ok(Json(PeopleResponse {
        unit: query.unit,
        people,
    }))
}

/// Lookup failure rendered as JSON
#[derive(Debug)]
pub struct LookupApiError(LookupError);

impl From<LookupError> for LookupApiError {
    fn from(e: LookupError) -> Self {
        Self(e)
    }
}

impl IntoResponse for LookupApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
