// src/services/persona_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{PersonaFields, PersonaRepository},
    models::persona::UserPersona,
};

#[derive(Clone)]
pub struct PersonaService {
    repo: PersonaRepository,
}

impl PersonaService {
    pub fn new(repo: PersonaRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, client_id: i32) -> Result<Vec<UserPersona>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.repo.list(executor, client_id).await?;
        Ok(rows.into_iter().map(UserPersona::from).collect())
    }

    pub async fn get<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<UserPersona, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find(executor, client_id, id)
            .await?
            .map(UserPersona::from)
            .ok_or(AppError::PersonaNotFound(id))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        fields: &PersonaFields<'_>,
    ) -> Result<UserPersona, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = self.repo.create(executor, client_id, fields).await?;
        tracing::info!("👤 Persona {} criada para o cliente {}", row.id, client_id);
        Ok(row.into())
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        id: i32,
        fields: &PersonaFields<'_>,
    ) -> Result<UserPersona, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, client_id, id, fields)
            .await?
            .map(UserPersona::from)
            .ok_or(AppError::PersonaNotFound(id))
    }

    pub async fn delete<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, client_id, id).await? {
            return Err(AppError::PersonaNotFound(id));
        }
        Ok(())
    }
}
