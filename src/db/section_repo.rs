// src/db/section_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{asset::LogoType, section::HiddenSection},
};

/// Persistência das seções ocultas. Trait para o serviço poder ser testado sem banco.
#[async_trait]
pub trait SectionStore: Send + Sync {
    async fn list_hidden(&self, client_id: i32) -> Result<Vec<HiddenSection>, AppError>;

    /// Alterna o registro (upsert), nunca apaga e recria.
    async fn set_hidden(&self, client_id: i32, section: LogoType, hidden: bool) -> Result<HiddenSection, AppError>;
}

#[derive(Clone)]
pub struct SectionRepository {
    pool: PgPool,
}

impl SectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionStore for SectionRepository {
    async fn list_hidden(&self, client_id: i32) -> Result<Vec<HiddenSection>, AppError> {
        let sections = sqlx::query_as::<_, HiddenSection>(
            "SELECT client_id, section_type, is_hidden, updated_at
             FROM hidden_sections
             WHERE client_id = $1 AND is_hidden = TRUE
             ORDER BY section_type",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    async fn set_hidden(&self, client_id: i32, section: LogoType, hidden: bool) -> Result<HiddenSection, AppError> {
        let row = sqlx::query_as::<_, HiddenSection>(
            "INSERT INTO hidden_sections (client_id, section_type, is_hidden)
             VALUES ($1, $2, $3)
             ON CONFLICT (client_id, section_type)
             DO UPDATE SET is_hidden = EXCLUDED.is_hidden, updated_at = NOW()
             RETURNING client_id, section_type, is_hidden, updated_at",
        )
        .bind(client_id)
        .bind(section)
        .bind(hidden)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
