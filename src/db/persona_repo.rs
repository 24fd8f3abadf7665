// src/db/persona_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::persona::PersonaRow};

const PERSONA_COLUMNS: &str = "id, client_id, name, role, age_range, event_attributes, motivations, \
     core_needs, pain_points, average_spend, event_attendance, engagement_rate, image_url, \
     created_at, updated_at";

/// Campos gravados de uma persona. Em updates, `None` mantém o valor atual.
#[derive(Debug, Default)]
pub struct PersonaFields<'a> {
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub age_range: Option<&'a str>,
    pub event_attributes: Option<&'a [String]>,
    pub motivations: Option<&'a [String]>,
    pub core_needs: Option<&'a [String]>,
    pub pain_points: Option<&'a [String]>,
    pub average_spend: Option<Decimal>,
    pub event_attendance: Option<i32>,
    pub engagement_rate: Option<Decimal>,
    pub image_url: Option<&'a str>,
}

/// Sem estado: quem chama escolhe o executor (pool ou transação).
#[derive(Clone, Default)]
pub struct PersonaRepository;

impl PersonaRepository {
    pub async fn list<'e, E>(&self, executor: E, client_id: i32) -> Result<Vec<PersonaRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let personas = sqlx::query_as::<_, PersonaRow>(&format!(
            "SELECT {PERSONA_COLUMNS} FROM user_personas WHERE client_id = $1 ORDER BY created_at ASC"
        ))
        .bind(client_id)
        .fetch_all(executor)
        .await?;

        Ok(personas)
    }

    pub async fn find<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<Option<PersonaRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let persona = sqlx::query_as::<_, PersonaRow>(&format!(
            "SELECT {PERSONA_COLUMNS} FROM user_personas WHERE id = $1 AND client_id = $2"
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(executor)
        .await?;

        Ok(persona)
    }

    pub async fn create<'e, E>(&self, executor: E, client_id: i32, f: &PersonaFields<'_>) -> Result<PersonaRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let persona = sqlx::query_as::<_, PersonaRow>(&format!(
            "INSERT INTO user_personas (
                client_id, name, role, age_range, event_attributes, motivations,
                core_needs, pain_points, average_spend, event_attendance, engagement_rate, image_url
             )
             VALUES ($1, $2, $3, $4,
                COALESCE($5, '{{}}'::text[]), COALESCE($6, '{{}}'::text[]),
                COALESCE($7, '{{}}'::text[]), COALESCE($8, '{{}}'::text[]),
                $9, $10, $11, $12)
             RETURNING {PERSONA_COLUMNS}"
        ))
        .bind(client_id)
        .bind(f.name.unwrap_or_default())
        .bind(f.role.unwrap_or_default())
        .bind(f.age_range.unwrap_or_default())
        .bind(f.event_attributes)
        .bind(f.motivations)
        .bind(f.core_needs)
        .bind(f.pain_points)
        .bind(f.average_spend)
        .bind(f.event_attendance)
        .bind(f.engagement_rate)
        .bind(f.image_url)
        .fetch_one(executor)
        .await?;

        Ok(persona)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        id: i32,
        f: &PersonaFields<'_>,
    ) -> Result<Option<PersonaRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let persona = sqlx::query_as::<_, PersonaRow>(&format!(
            "UPDATE user_personas SET
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                age_range = COALESCE($5, age_range),
                event_attributes = COALESCE($6, event_attributes),
                motivations = COALESCE($7, motivations),
                core_needs = COALESCE($8, core_needs),
                pain_points = COALESCE($9, pain_points),
                average_spend = COALESCE($10, average_spend),
                event_attendance = COALESCE($11, event_attendance),
                engagement_rate = COALESCE($12, engagement_rate),
                image_url = COALESCE($13, image_url),
                updated_at = NOW()
             WHERE id = $1 AND client_id = $2
             RETURNING {PERSONA_COLUMNS}"
        ))
        .bind(id)
        .bind(client_id)
        .bind(f.name)
        .bind(f.role)
        .bind(f.age_range)
        .bind(f.event_attributes)
        .bind(f.motivations)
        .bind(f.core_needs)
        .bind(f.pain_points)
        .bind(f.average_spend)
        .bind(f.event_attendance)
        .bind(f.engagement_rate)
        .bind(f.image_url)
        .fetch_optional(executor)
        .await?;

        Ok(persona)
    }

    pub async fn delete<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM user_personas WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
