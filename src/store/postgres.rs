//! Postgres-backed store implementations
//!
//! Chunks live in the `chunks` table with a pgvector `embedding` column;
//! schedule events live in `schedule_events`. Schema is managed manually via
//! SQL files in /migrations.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::QueryBuilder;

use super::ChunkFilter;
use super::EventFilter;
use super::KnowledgeStore;
use super::ScheduleStore;
use crate::errors::Result;
use crate::models::Chunk;
use crate::models::ScheduleEvent;
use crate::models::ScoredChunk;
use crate::models::ScoredEvent;

const CHUNK_COLUMNS: &str = "id, section, kind, category, text, keywords, metadata, embedding";
const EVENT_COLUMNS: &str =
    "id, title, description, start_date, end_date, event_time, category, semester";

#[derive(Debug, FromRow)]
struct ChunkRow {
    id: String,
    section: String,
    kind: String,
    category: String,
    text: String,
    keywords: Vec<String>,
    metadata: serde_json::Value,
    embedding: Option<Vector>,
    relevance: f64,
}

impl ChunkRow {
    fn into_scored(self) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: self.id,
                section: self.section,
                kind: self.kind,
                category: self.category,
                text: self.text,
                keywords: self.keywords,
                metadata: self.metadata.as_object().cloned().unwrap_or_default(),
                embedding: self.embedding.map(|v| v.to_vec()),
            },
            relevance: self.relevance as f32,
        }
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    start_date: chrono::NaiveDate,
    end_date: Option<chrono::NaiveDate>,
    event_time: Option<String>,
    category: String,
    semester: Option<String>,
    relevance: f64,
}

impl EventRow {
    fn into_scored(self) -> ScoredEvent {
        ScoredEvent {
            event: ScheduleEvent {
                id: self.id,
                title: self.title,
                description: self.description,
                start_date: self.start_date,
                end_date: self.end_date,
                time: self.event_time,
                category: self.category,
                semester: self.semester,
            },
            relevance: self.relevance as f32,
        }
    }
}

/// Knowledge store over a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PostgresKnowledgeStore {
    pool: PgPool,
}

impl PostgresKnowledgeStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build a connection pool using the shared database settings
pub async fn pool_from_config(config: &crate::config::AppConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.min_connections())
        .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()))
        .connect(config.database_url())
        .await?;

    tracing::info!(
        "Database pool configured: max_connections={}, min_connections={}",
        config.max_connections(),
        config.min_connections()
    );

    Ok(pool)
}

#[async_trait]
impl KnowledgeStore for PostgresKnowledgeStore {
    async fn filtered_query(&self, filter: &ChunkFilter, limit: usize) -> Result<Vec<ScoredChunk>> {
        let mut qb: QueryBuilder<'_, sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {CHUNK_COLUMNS}, "));

        if filter.keywords_any.is_empty() {
            qb.push("1.0::float8 AS relevance FROM chunks WHERE TRUE");
        } else {
            // Base relevance plus a bump per matched keyword, computed server-side
            qb.push("(1.0 + 0.25 * (SELECT count(*) FROM unnest(keywords) kw WHERE kw = ANY(");
            qb.push_bind(filter.keywords_any.clone());
            qb.push(")))::float8 AS relevance FROM chunks WHERE keywords && ");
            qb.push_bind(filter.keywords_any.clone());
        }

        if let Some(section) = &filter.section {
            qb.push(" AND section = ");
            qb.push_bind(section.clone());
        }
        if let Some(kind) = &filter.kind {
            qb.push(" AND kind = ");
            qb.push_bind(kind.clone());
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ");
            qb.push_bind(category.clone());
        }
        for (key, value) in &filter.metadata_equals {
            qb.push(" AND metadata ->> ");
            qb.push_bind(key.clone());
            qb.push(" = ");
            qb.push_bind(value.clone());
        }

        qb.push(" ORDER BY relevance DESC, id ASC LIMIT ");
        qb.push_bind(limit as i64);

        let rows: Vec<ChunkRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ChunkRow::into_scored).collect())
    }

    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let query_vector = Vector::from(vector.to_vec());
        let rows: Vec<ChunkRow> = sqlx::query_as(&format!(
            "SELECT {CHUNK_COLUMNS}, (1 - (embedding <=> $1))::float8 AS relevance \
             FROM chunks WHERE embedding IS NOT NULL \
             ORDER BY embedding <=> $1, id ASC LIMIT $2"
        ))
        .bind(query_vector)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChunkRow::into_scored).collect())
    }

    async fn keyword_query(&self, terms: &[String], limit: usize) -> Result<Vec<ScoredChunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let patterns: Vec<String> = terms.iter().map(|t| format!("%{t}%")).collect();
        let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let rows: Vec<ChunkRow> = sqlx::query_as(&format!(
            "SELECT {CHUNK_COLUMNS}, 1.0::float8 AS relevance \
             FROM chunks WHERE text ILIKE ANY($1) OR keywords && $2 \
             ORDER BY id ASC LIMIT $3"
        ))
        .bind(patterns)
        .bind(lowered)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChunkRow::into_scored).collect())
    }
}

/// Schedule store over a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PostgresScheduleStore {
    pool: PgPool,
}

impl PostgresScheduleStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PostgresScheduleStore {
    async fn filtered_query(&self, filter: &EventFilter, limit: usize) -> Result<Vec<ScoredEvent>> {
        let mut qb: QueryBuilder<'_, sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS}, 1.0::float8 AS relevance FROM schedule_events WHERE TRUE"
        ));

        if let Some(category) = &filter.category {
            qb.push(" AND category = ");
            qb.push_bind(category.clone());
        }
        if let Some(semester) = &filter.semester {
            qb.push(" AND semester = ");
            qb.push_bind(semester.clone());
        }
        if let Some(from) = filter.from_date {
            qb.push(" AND COALESCE(end_date, start_date) >= ");
            qb.push_bind(from);
        }
        if let Some(to) = filter.to_date {
            qb.push(" AND start_date <= ");
            qb.push_bind(to);
        }

        qb.push(" ORDER BY start_date ASC, id ASC LIMIT ");
        qb.push_bind(limit as i64);

        let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(EventRow::into_scored).collect())
    }

    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEvent>> {
        let query_vector = Vector::from(vector.to_vec());
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS}, (1 - (embedding <=> $1))::float8 AS relevance \
             FROM schedule_events WHERE embedding IS NOT NULL \
             ORDER BY embedding <=> $1, id ASC LIMIT $2"
        ))
        .bind(query_vector)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EventRow::into_scored).collect())
    }
}
