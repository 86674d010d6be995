use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::database::manager::{DatabaseError, DatabaseManager};

/// A stored JSON document, or an equality filter over top-level fields
pub type Document = Map<String, Value>;

/// Outcome of a replace-by-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceResult {
    pub matched_count: u64,
}

/// Collection of JSON documents addressed by field-equality filters.
///
/// `replace_one` swaps the whole document of the first match and never inserts.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn find_one(&self, filter: &Document) -> Result<Option<Value>, DatabaseError>;

    async fn find(&self, filter: &Document) -> Result<Vec<Value>, DatabaseError>;

    async fn replace_one(&self, filter: &Document, replacement: Document) -> Result<ReplaceResult, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Postgres table `(id BIGSERIAL, doc JSONB)` queried with JSONB containment
pub struct PgCollection {
    pool: PgPool,
    table: String,
}

impl PgCollection {
    pub fn new(pool: PgPool, name: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            pool,
            table: DatabaseManager::table_identifier(name)?,
        })
    }
}

#[async_trait]
impl DocumentCollection for PgCollection {
    async fn find_one(&self, filter: &Document) -> Result<Option<Value>, DatabaseError> {
        let sql = format!("SELECT doc FROM {} WHERE doc @> $1 ORDER BY id LIMIT 1", self.table);
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(filter.clone()))
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!("SELECT doc FROM {} WHERE doc @> $1 ORDER BY id", self.table);
        let docs = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(filter.clone()))
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    async fn replace_one(&self, filter: &Document, replacement: Document) -> Result<ReplaceResult, DatabaseError> {
        let sql = format!(
            "UPDATE {table} SET doc = $2 WHERE id = (SELECT id FROM {table} WHERE doc @> $1 ORDER BY id LIMIT 1 FOR UPDATE)",
            table = self.table
        );
        let result = sqlx::query(&sql)
            .bind(Value::Object(filter.clone()))
            .bind(Value::Object(replacement))
            .execute(&self.pool)
            .await?;
        Ok(ReplaceResult {
            matched_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process collection for local development and tests
#[derive(Default)]
pub struct MemoryCollection {
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, doc: Document) {
        self.docs.write().await.push(doc);
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    fn matches(doc: &Document, filter: &Document) -> bool {
        filter.iter().all(|(k, v)| doc.get(k) == Some(v))
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn find_one(&self, filter: &Document) -> Result<Option<Value>, DatabaseError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .find(|doc| Self::matches(doc, filter))
            .map(|doc| Value::Object(doc.clone())))
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Value>, DatabaseError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|doc| Self::matches(doc, filter))
            .map(|doc| Value::Object(doc.clone()))
            .collect())
    }

    async fn replace_one(&self, filter: &Document, replacement: Document) -> Result<ReplaceResult, DatabaseError> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|doc| Self::matches(doc, filter)) {
            Some(doc) => {
                *doc = replacement;
                Ok(ReplaceResult { matched_count: 1 })
            }
            None => Ok(ReplaceResult { matched_count: 0 }),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
