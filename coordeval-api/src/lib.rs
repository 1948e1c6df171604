//! coordeval-api library - coordinator competency evaluation service
//!
//! Serves the evaluation form's data (units, people, competency catalog) and
//! accepts finished evaluations, storing them in SQLite and mirroring them to
//! a Google Sheets tab.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod db;
pub mod dispatch;
pub mod form;
pub mod lookup;
pub mod sheets;

use dispatch::Dispatcher;
use lookup::PersonLookup;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub lookup: PersonLookup,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, lookup: PersonLookup) -> Self {
        Self { dispatcher, lookup }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/sheets/append", post(api::append_submission))
        .route("/api/units", get(api::list_units))
        .route("/api/people", get(api::list_people))
        .route("/api/competencies", get(api::list_competencies))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
