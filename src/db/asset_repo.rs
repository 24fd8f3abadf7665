// src/db/asset_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::asset::{AssetCategory, AssetFile, BrandAsset, Variant},
};

const ASSET_COLUMNS: &str = "id, client_id, name, category, data, mime_type, created_at, updated_at";

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  ASSETS (o registro)
    // =========================================================================

    pub async fn list<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        category: Option<AssetCategory>,
    ) -> Result<Vec<BrandAsset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // $2 NULL = todas as categorias
        let assets = sqlx::query_as::<_, BrandAsset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM brand_assets
             WHERE client_id = $1 AND ($2::asset_category IS NULL OR category = $2)
             ORDER BY category, created_at ASC"
        ))
        .bind(client_id)
        .bind(category)
        .fetch_all(executor)
        .await?;

        Ok(assets)
    }

    /// Sempre filtra pelo cliente: um id de outro cliente é "não encontrado".
    pub async fn find<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<Option<BrandAsset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, BrandAsset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM brand_assets WHERE id = $1 AND client_id = $2"
        ))
        .bind(id)
        .bind(client_id)
        .fetch_optional(executor)
        .await?;

        Ok(asset)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        name: &str,
        category: AssetCategory,
        data: &Value,
        mime_type: Option<&str>,
    ) -> Result<BrandAsset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, BrandAsset>(&format!(
            "INSERT INTO brand_assets (client_id, name, category, data, mime_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ASSET_COLUMNS}"
        ))
        .bind(client_id)
        .bind(name)
        .bind(category)
        .bind(data)
        .bind(mime_type)
        .fetch_one(executor)
        .await?;

        Ok(asset)
    }

    /// Atualização parcial: campos `None` ficam como estão.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        id: i32,
        name: Option<&str>,
        data: Option<&Value>,
        mime_type: Option<&str>,
    ) -> Result<Option<BrandAsset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, BrandAsset>(&format!(
            "UPDATE brand_assets SET
                name = COALESCE($3, name),
                data = COALESCE($4, data),
                mime_type = COALESCE($5, mime_type),
                updated_at = NOW()
             WHERE id = $1 AND client_id = $2
             RETURNING {ASSET_COLUMNS}"
        ))
        .bind(id)
        .bind(client_id)
        .bind(name)
        .bind(data)
        .bind(mime_type)
        .fetch_optional(executor)
        .await?;

        Ok(asset)
    }

    /// Grava só `data.description` (usado pelo autosave).
    pub async fn update_description<'e, E>(
        &self,
        executor: E,
        client_id: i32,
        id: i32,
        description: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE brand_assets
             SET data = jsonb_set(data, '{description}', to_jsonb($3::text), true), updated_at = NOW()
             WHERE id = $1 AND client_id = $2",
        )
        .bind(id)
        .bind(client_id)
        .bind(description)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_dark_variant_flag<'e, E>(&self, executor: E, id: i32, has_dark: bool) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE brand_assets
             SET data = jsonb_set(data, '{hasDarkVariant}', to_jsonb($2::boolean), true), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(has_dark)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, client_id: i32, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Os arquivos caem junto (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM brand_assets WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ARQUIVOS (bytes por variante)
    // =========================================================================

    pub async fn upsert_file<'e, E>(
        &self,
        executor: E,
        asset_id: i32,
        variant: Variant,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO brand_asset_files (asset_id, variant, file_name, mime_type, bytes)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (asset_id, variant)
             DO UPDATE SET
                file_name = EXCLUDED.file_name,
                mime_type = EXCLUDED.mime_type,
                bytes = EXCLUDED.bytes,
                created_at = NOW()",
        )
        .bind(asset_id)
        .bind(variant)
        .bind(file_name)
        .bind(mime_type)
        .bind(bytes)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_file<'e, E>(&self, executor: E, asset_id: i32, variant: Variant) -> Result<Option<AssetFile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let file = sqlx::query_as::<_, AssetFile>(
            "SELECT file_name, mime_type, bytes
             FROM brand_asset_files WHERE asset_id = $1 AND variant = $2",
        )
        .bind(asset_id)
        .bind(variant)
        .fetch_optional(executor)
        .await?;

        Ok(file)
    }

    pub async fn delete_file<'e, E>(&self, executor: E, asset_id: i32, variant: Variant) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM brand_asset_files WHERE asset_id = $1 AND variant = $2")
            .bind(asset_id)
            .bind(variant)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
