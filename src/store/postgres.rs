// src/store/postgres.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use super::{Collection, Document, DocumentStore, Filter, StoreError, upsert_seed};

/// Postgres-backed document store.
///
/// All collections share the `documents` table; each row holds one JSONB
/// document. Filters are evaluated with JSONB containment (`data @> ...`),
/// and unique keys are partial expression indexes (see `migrations/`).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Row shape returned by every document query.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    data: Json<Value>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.data.0)
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Appends `collection = .. AND (id = ..) AND data @> ..` to a query.
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, collection: Collection, filter: &Filter) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.as_str());
    if let Some(id) = filter.id_constraint() {
        qb.push(" AND id = ");
        qb.push_bind(id);
    }
    if !filter.fields().is_empty() {
        qb.push(" AND data @> ");
        qb.push_bind(Json(Value::Object(filter.fields().clone())));
    }
}

fn select_documents(collection: Collection, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, data FROM documents");
    push_conditions(&mut qb, collection, filter);
    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = select_documents(collection, filter);
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<DocumentRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Document::from))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = select_documents(collection, filter)
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn insert(&self, collection: Collection, doc: Value) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, data)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(doc))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        // `||` on JSONB objects is a shallow merge, right side wins.
        let mut qb = QueryBuilder::new("UPDATE documents SET data = data || ");
        qb.push_bind(Json(Value::Object(patch)));
        qb.push(" WHERE id = (SELECT id FROM documents");
        push_conditions(&mut qb, collection, filter);
        qb.push(" ORDER BY id LIMIT 1)");

        let result = qb.build().execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM documents");
        push_conditions(&mut qb, collection, filter);

        let n: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok(n.max(0) as u64)
    }

    async fn upsert(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        set_on_insert: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes writers targeting the same filter until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(filter.lock_key(collection.as_str()))
            .execute(&mut *tx)
            .await?;

        let mut qb = select_documents(collection, filter);
        qb.push(" LIMIT 1 FOR UPDATE");
        let existing = qb
            .build_query_as::<DocumentRow>()
            .fetch_optional(&mut *tx)
            .await?;

        let row = match existing {
            Some(row) => {
                sqlx::query_as::<_, DocumentRow>(
                    "UPDATE documents SET data = data || $2 WHERE id = $1 RETURNING id, data",
                )
                .bind(row.id)
                .bind(Json(Value::Object(set)))
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, DocumentRow>(
                    "INSERT INTO documents (collection, data) VALUES ($1, $2) RETURNING id, data",
                )
                .bind(collection.as_str())
                .bind(Json(upsert_seed(filter, set, set_on_insert)))
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_or_insert(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Value,
    ) -> Result<(Document, bool), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(filter.lock_key(collection.as_str()))
            .execute(&mut *tx)
            .await?;

        let mut qb = select_documents(collection, filter);
        qb.push(" LIMIT 1");
        let existing = qb
            .build_query_as::<DocumentRow>()
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok((row.into(), false));
        }

        let row = sqlx::query_as::<_, DocumentRow>(
            "INSERT INTO documents (collection, data) VALUES ($1, $2) RETURNING id, data",
        )
        .bind(collection.as_str())
        .bind(Json(doc))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row.into(), true))
    }
}
