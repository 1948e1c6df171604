//! # Coordinator Evaluation Common Library
//!
//! Shared code for the coordinator evaluation service:
//! - Rubric catalog (the ten competencies and their rating scales)
//! - Evaluation data model
//! - Submission row assembly
//! - Configuration loading
//! - Database initialization

pub mod assembler;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rubric;

pub use error::{Error, Result};
pub use models::{CompetencyResponse, EvaluationBase, Person, ResponseKey, Responses};
pub use rubric::{Competency, CompetencyDefinition, Rating};
