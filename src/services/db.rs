// src/services/db.rs
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Executor;
use std::time::Duration;

use crate::config::Collections;
use crate::models::{Property, PropertyAnalysis};
use super::store::{new_document_id, PropertyStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS documents_property_id_idx
    ON documents (collection, (data->>'property_id'));
"#;

/// Documents are JSONB rows keyed by (collection, id); the stored document
/// always carries its own id field as well.
pub struct DbStore {
    pool: PgPool,
    collections: Collections,
}

impl DbStore {
    pub async fn new(database_url: &str, collections: Collections) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        info!("Connected to document database");
        Ok(Self { pool, collections })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        // Unprepared, so the batch may hold several statements.
        self.pool.execute(SCHEMA).await?;
        debug!("Document schema is in place");
        Ok(())
    }

    /// Inserts or replaces a document. `created_at` from the first write wins.
    async fn put_document<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        document: &T,
    ) -> Result<(), StoreError> {
        let data: Value = serde_json::to_value(document)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (collection, id) DO UPDATE SET
                data = jsonb_set(
                    EXCLUDED.data,
                    '{created_at}',
                    COALESCE(documents.data->'created_at', EXCLUDED.data->'created_at', 'null'::jsonb)
                ),
                updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PropertyStore for DbStore {
    async fn save_property(&self, property: &Property) -> Result<String, StoreError> {
        let id = property.property_id.clone().unwrap_or_else(new_document_id);
        let now = Utc::now();

        let mut document = property.clone();
        document.property_id = Some(id.clone());
        document.created_at = Some(now);
        document.updated_at = Some(now);

        self.put_document(&self.collections.properties, &id, &document).await?;
        debug!("Saved property {}", id);
        Ok(id)
    }

    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, StoreError> {
        let document = sqlx::query_scalar::<_, Json<Property>>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(&self.collections.properties)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(property)| property))
    }

    async fn list_properties(&self, limit: usize) -> Result<Vec<Property>, StoreError> {
        let documents = sqlx::query_scalar::<_, Json<Property>>(
            "SELECT data FROM documents WHERE collection = $1 ORDER BY created_at LIMIT $2",
        )
        .bind(&self.collections.properties)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(documents.into_iter().map(|Json(property)| property).collect())
    }

    async fn delete_property(&self, property_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(&self.collections.properties)
            .bind(property_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_analysis(&self, analysis: &PropertyAnalysis) -> Result<String, StoreError> {
        let id = analysis.analysis_id.clone().unwrap_or_else(new_document_id);

        let mut document = analysis.clone();
        document.analysis_id = Some(id.clone());
        document.created_at = Some(Utc::now());

        self.put_document(&self.collections.analyses, &id, &document).await?;
        debug!("Saved analysis {} for property {}", id, analysis.property_id);
        Ok(id)
    }

    async fn get_analysis(&self, analysis_id: &str) -> Result<Option<PropertyAnalysis>, StoreError> {
        let document = sqlx::query_scalar::<_, Json<PropertyAnalysis>>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(&self.collections.analyses)
        .bind(analysis_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(analysis)| analysis))
    }

    async fn get_analyses_for_property(&self, property_id: &str) -> Result<Vec<PropertyAnalysis>, StoreError> {
        let documents = sqlx::query_scalar::<_, Json<PropertyAnalysis>>(
            r#"
            SELECT data FROM documents
            WHERE collection = $1 AND data->>'property_id' = $2
            ORDER BY (data->>'analysis_date')::timestamptz DESC
            "#,
        )
        .bind(&self.collections.analyses)
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents.into_iter().map(|Json(analysis)| analysis).collect())
    }
}
