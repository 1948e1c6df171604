//! Person lookup
//!
//! Lists organizational units and finds the coordinators attached to one.
//! A unit name that matches nothing exactly is retried as a case-insensitive
//! substring search. Case folding is Unicode-aware, so "JOÃO" matches "joão".

use async_trait::async_trait;
use coordeval_common::Person;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Unit or person query failure
#[derive(Debug, Error)]
#[error("{0}")]
pub struct LookupError(#[from] pub coordeval_common::Error);

/// Raw queries against the coordinator directory
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    /// Every non-null unit value, duplicates and padding included
    async fn unit_names(&self) -> coordeval_common::Result<Vec<String>>;

    /// People whose unit equals `unit`, ordered by name
    async fn people_in_unit(&self, unit: &str) -> coordeval_common::Result<Vec<Person>>;

    /// People whose unit contains `term` ignoring case, ordered by name
    ///
    /// `term` is matched literally; `%` and `_` carry no wildcard meaning.
    async fn people_matching(&self, term: &str) -> coordeval_common::Result<Vec<Person>>;

    /// Confirm the directory is reachable
    async fn ping(&self) -> coordeval_common::Result<()> {
        Ok(())
    }
}

/// Unit listing and person search over a [`PersonDirectory`]
#[derive(Clone)]
pub struct PersonLookup {
    directory: Arc<dyn PersonDirectory>,
}

impl PersonLookup {
    pub fn new(directory: Arc<dyn PersonDirectory>) -> Self {
        Self { directory }
    }

    /// Round trip to the directory's backing store
    pub async fn ping(&self) -> Result<(), LookupError> {
        self.directory.ping().await.map_err(LookupError)
    }

    /// Distinct unit names, trimmed, blanks dropped, sorted ascending
    pub async fn list_units(&self) -> Result<Vec<String>, LookupError> {
        let names = self.directory.unit_names().await.map_err(|e| {
            error!("Failed to list units: {}", e);
            LookupError(e)
        })?;

        let units: BTreeSet<String> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(units.into_iter().collect())
    }

    /// People in `unit`, exact match first, then substring match
    ///
    /// Returns an empty list when neither attempt finds anyone.
    pub async fn find_people(&self, unit: &str) -> Result<Vec<Person>, LookupError> {
        if unit.trim().is_empty() {
            return Ok(Vec::new());
        }

        let exact = self.directory.people_in_unit(unit).await.map_err(|e| {
            error!(unit = %unit, "Exact person lookup failed: {}", e);
            LookupError(e)
        })?;
        if !exact.is_empty() {
            return Ok(exact);
        }

        let term = collapse_whitespace(unit);
        debug!(unit = %unit, term = %term, "No exact unit match, retrying with substring search");

        self.directory.people_matching(&term).await.map_err(|e| {
            error!(unit = %unit, "Fuzzy person lookup failed: {}", e);
            LookupError(e)
        })
    }
}

/// Trim and turn runs of whitespace into a single space
pub fn collapse_whitespace(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unicode case-insensitive substring test
pub fn unit_contains(unit: &str, term: &str) -> bool {
    unit.to_lowercase().contains(&term.to_lowercase())
}
