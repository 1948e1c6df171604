//! Coordinator directory queries

use async_trait::async_trait;
use coordeval_common::Person;

use super::SqliteStore;
use crate::lookup::{unit_contains, PersonDirectory};

const PERSON_COLUMNS: &str = "regional, registration, name, admission, national_id, job_title, \
     location, school, monthly_hours, weekly_hours, tenure_months, cumulative_hours, \
     unexcused_absence_hours, unexcused_absence_pct";

#[async_trait]
impl PersonDirectory for SqliteStore {
    async fn unit_names(&self) -> coordeval_common::Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT school FROM coordinators WHERE school IS NOT NULL ORDER BY school ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn people_in_unit(&self, unit: &str) -> coordeval_common::Result<Vec<Person>> {
        let people = sqlx::query_as::<_, Person>(&format!(
            "SELECT {} FROM coordinators WHERE school = ? ORDER BY name ASC",
            PERSON_COLUMNS
        ))
        .bind(unit)
        .fetch_all(&self.pool)
        .await?;
        Ok(people)
    }

    async fn people_matching(&self, term: &str) -> coordeval_common::Result<Vec<Person>> {
        // Filtered here: SQLite LIKE and lower() only fold ASCII letters
        let people = sqlx::query_as::<_, Person>(&format!(
            "SELECT {} FROM coordinators WHERE school IS NOT NULL ORDER BY name ASC",
            PERSON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(people
            .into_iter()
            .filter(|p| p.school.as_deref().is_some_and(|school| unit_contains(school, term)))
            .collect())
    }

    async fn ping(&self) -> coordeval_common::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::lookup::PersonLookup;
    use std::sync::Arc;

    async fn seed(store: &SqliteStore, registration: &str, name: &str, school: Option<&str>) {
        sqlx::query(
            "INSERT INTO coordinators (registration, name, school, job_title, tenure_months) \
             VALUES (?, ?, ?, 'Coordenador(a)', '24')",
        )
        .bind(registration)
        .bind(name)
        .bind(school)
        .execute(store.pool())
        .await
        .expect("seed coordinator");
    }

    async fn seeded_store() -> SqliteStore {
        let store = SqliteStore::new(memory_pool().await);
        seed(&store, "300", "Rita Campos", Some("EE Professor Luiz")).await;
        seed(&store, "100", "Bruno Alves", Some("EE Professor Luiz")).await;
        seed(&store, "200", "Carla Dias", Some("  EE 100% Integral ")).await;
        seed(&store, "400", "Davi Rocha", Some("EEA_Centro")).await;
        seed(&store, "500", "Eva Nunes", Some("EEAxCentro")).await;
        seed(&store, "600", "Sem Escola", None).await;
        seed(&store, "700", "Joana Prado", Some("ESCOLA ESTADUAL JOÃO PAULO")).await;
        store
    }

    #[tokio::test]
    async fn test_units_are_distinct_trimmed_and_sorted() {
        let store = seeded_store().await;
        let lookup = PersonLookup::new(Arc::new(store));

        assert_eq!(
            lookup.list_units().await.unwrap(),
            vec![
                "EE 100% Integral",
                "EE Professor Luiz",
                "EEA_Centro",
                "EEAxCentro",
                "ESCOLA ESTADUAL JOÃO PAULO"
            ]
        );
    }

    #[tokio::test]
    async fn test_exact_match_ordered_by_name() {
        let store = seeded_store().await;
        let people = store.people_in_unit("EE Professor Luiz").await.unwrap();

        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bruno Alves", "Rita Campos"]);
        assert_eq!(people[0].tenure_months.as_deref(), Some("24"));
        assert_eq!(people[0].national_id, None);
    }

    #[tokio::test]
    async fn test_fuzzy_match_is_case_insensitive() {
        let store = seeded_store().await;
        let lookup = PersonLookup::new(Arc::new(store));

        let people = lookup.find_people("ee  100% integral").await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Carla Dias");
    }

    #[tokio::test]
    async fn test_fuzzy_match_folds_accented_letters() {
        let store = seeded_store().await;
        let lookup = PersonLookup::new(Arc::new(store));

        let people = lookup.find_people("joão paulo").await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Joana Prado");

        let people = lookup.find_people("Estadual  João").await.unwrap();
        assert_eq!(people.len(), 1);
    }

    #[tokio::test]
    async fn test_ping_fails_once_pool_is_closed() {
        let store = seeded_store().await;
        assert!(store.ping().await.is_ok());

        store.pool().close().await;
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_underscore_matches_literally() {
        let store = seeded_store().await;
        let lookup = PersonLookup::new(Arc::new(store));

        // A LIKE wildcard `_` would also match "EEAxCentro"
        let people = lookup.find_people("A_Centr").await.unwrap();
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Davi Rocha"]);
    }

    #[tokio::test]
    async fn test_percent_matches_literally() {
        let store = seeded_store().await;
        let lookup = PersonLookup::new(Arc::new(store));

        // A LIKE wildcard `%` would match every school starting with "EE"
        assert!(lookup.find_people("EE%Luiz").await.unwrap().is_empty());
    }
}
