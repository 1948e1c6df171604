//! HTTP API handlers for coordeval-api

pub mod buildinfo;
pub mod catalog;
pub mod health;
pub mod lookup;
pub mod submit;

pub use buildinfo::get_build_info;
pub use catalog::list_competencies;
pub use health::health_routes;
pub use lookup::{list_units, list_people};
pub use submit::{append_submission, SubmissionResponse};
