use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::model::{hydrate, Attributes, Column, ColumnKind, Model};
use crate::students::model::Student;

#[async_trait]
pub trait StudentRepo: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Student>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Student>>;
    async fn create(&self, attrs: Attributes) -> anyhow::Result<Student>;
    /// Mass update. Only the given columns change; `updated_at` is bumped.
    async fn update(&self, id: Uuid, attrs: Attributes) -> anyhow::Result<Option<Student>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Students stored in PostgreSQL. Rows are read back as `to_jsonb(row)` and
/// hydrated so that the model's casts apply.
#[derive(Clone)]
pub struct PgStudentRepo {
    db: PgPool,
}

impl PgStudentRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, column: &Column, value: &Value) {
    match column.kind {
        ColumnKind::Text => qb.push_bind(value.as_str().map(str::to_owned)),
        ColumnKind::Integer => qb.push_bind(value.as_i64().and_then(|v| i32::try_from(v).ok())),
    };
}

fn hydrate_row(row: Value) -> anyhow::Result<Student> {
    hydrate::<Student>(row).context("hydrate student row")
}

#[async_trait]
impl StudentRepo for PgStudentRepo {
    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Student>> {
        let rows = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT to_jsonb(s)
            FROM students s
            ORDER BY s.created_at DESC, s.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(hydrate_row).collect()
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Student>> {
        let row = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT to_jsonb(s)
            FROM students s
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(hydrate_row).transpose()
    }

    async fn create(&self, attrs: Attributes) -> anyhow::Result<Student> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} ", Student::TABLE));
        if attrs.is_empty() {
            qb.push("DEFAULT VALUES");
        } else {
            qb.push("(");
            qb.push(attrs.keys().collect::<Vec<_>>().join(", "));
            qb.push(") VALUES (");
            for (i, (column, value)) in attrs.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(&mut qb, column, value);
            }
            qb.push(")");
        }
        qb.push(format!(" RETURNING to_jsonb({}.*)", Student::TABLE));
        debug!(sql = qb.sql(), "insert student");

        let row = qb.build_query_scalar::<Value>().fetch_one(&self.db).await?;
        hydrate_row(row)
    }

    async fn update(&self, id: Uuid, attrs: Attributes) -> anyhow::Result<Option<Student>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", Student::TABLE));
        for (column, value) in attrs.iter() {
            qb.push(column.name);
            qb.push(" = ");
            push_value(&mut qb, column, value);
            qb.push(", ");
        }
        qb.push("updated_at = now() WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING to_jsonb({}.*)", Student::TABLE));
        debug!(sql = qb.sql(), "update student");

        let row = qb
            .build_query_scalar::<Value>()
            .fetch_optional(&self.db)
            .await?;
        row.map(hydrate_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
