//! Append-only assessment storage

use async_trait::async_trait;
use coordeval_common::assembler::PersistedRow;
use coordeval_common::EvaluationBase;
use sqlx::{QueryBuilder, Sqlite};

use super::SqliteStore;
use crate::dispatch::EvaluationStore;

#[async_trait]
impl EvaluationStore for SqliteStore {
    /// Insert all rows in one statement
    async fn insert_assessments(
        &self,
        rows: &[PersistedRow],
        context: Option<&EvaluationBase>,
    ) -> coordeval_common::Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO competency_assessments (competency, prompt, level_1, level_2, level_3, \
             level_4, rating, development_actions, unit, regional, registration, name, school) ",
        );

        builder.push_values(rows, |mut values, row| {
            values
                .push_bind(row.competency.clone())
                .push_bind(row.prompt.clone())
                .push_bind(row.level_1.clone())
                .push_bind(row.level_2.clone())
                .push_bind(row.level_3.clone())
                .push_bind(row.level_4.clone())
                .push_bind(row.rating.map(|r| i64::from(r.value())))
                .push_bind(row.development_actions.clone())
                .push_bind(context.map(|c| c.unit.clone()))
                .push_bind(context.and_then(|c| c.person.regional.clone()))
                .push_bind(context.map(|c| c.person.registration.clone()))
                .push_bind(context.map(|c| c.person.name.clone()))
                .push_bind(context.and_then(|c| c.person.school.clone()));
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use coordeval_common::assembler::build_rows;
    use coordeval_common::{Competency, CompetencyResponse, Person, Rating, Responses};
    use sqlx::Row;

    fn base() -> EvaluationBase {
        EvaluationBase {
            unit: "Escola A".to_string(),
            person: Person {
                registration: "77".to_string(),
                name: "Paula Reis".to_string(),
                regional: Some("Sul".to_string()),
                school: Some("Escola A".to_string()),
                ..Person::default()
            },
        }
    }

    fn responses() -> Responses {
        let mut responses: Responses = Competency::ALL
            .into_iter()
            .map(|c| (c, CompetencyResponse::rated(Rating::Four)))
            .collect();
        responses.entry(Competency::PublicIntegrity).development_actions =
            Some("Participar do comitê de ética".to_string());
        responses
    }

    #[tokio::test]
    async fn test_insert_without_context() {
        let store = SqliteStore::new(memory_pool().await);
        let (rows, _) = build_rows(&base(), &responses());

        let inserted = store.insert_assessments(&rows, None).await.unwrap();
        assert_eq!(inserted, 10);

        let stored = sqlx::query(
            "SELECT competency, rating, development_actions, unit, registration \
             FROM competency_assessments ORDER BY id LIMIT 1",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();

        assert_eq!(stored.get::<String, _>(0), "Integridade e Responsabilidade Pública");
        assert_eq!(stored.get::<i64, _>(1), 4);
        assert_eq!(
            stored.get::<Option<String>, _>(2).as_deref(),
            Some("Participar do comitê de ética")
        );
        assert_eq!(stored.get::<Option<String>, _>(3), None);
        assert_eq!(stored.get::<Option<String>, _>(4), None);
    }

    #[tokio::test]
    async fn test_insert_with_context_snapshot() {
        let store = SqliteStore::new(memory_pool().await);
        let base = base();
        let (rows, _) = build_rows(&base, &responses());

        store.insert_assessments(&rows, Some(&base)).await.unwrap();

        let registrations: Vec<String> =
            sqlx::query_scalar("SELECT registration FROM competency_assessments")
                .fetch_all(store.pool())
                .await
                .unwrap();
        assert_eq!(registrations.len(), 10);
        assert!(registrations.iter().all(|r| r == "77"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let store = SqliteStore::new(memory_pool().await);
        assert_eq!(store.insert_assessments(&[], None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_table_surfaces_error() {
        let store = SqliteStore::new(memory_pool().await);
        sqlx::query("DROP TABLE competency_assessments")
            .execute(store.pool())
            .await
            .unwrap();
        let (rows, _) = build_rows(&base(), &responses());

        let err = store.insert_assessments(&rows, None).await.unwrap_err();
        assert!(err.to_string().contains("competency_assessments"));
    }
}
