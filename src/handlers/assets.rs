// src/handlers/assets.rs

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermAssetsCreate, PermAssetsDelete, PermAssetsUpdate, RequirePermission},
    },
    models::asset::{AssetCategory, BrandAsset, LogoFormat, Variant},
    services::{
        asset_service::{AssetChanges, LogoSectionView, NewAsset, UploadedFile},
        file_service::FileRequest,
        logo::{slugify, UrlOptions},
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório"))]
    #[schema(example = "Logo principal")]
    pub name: String,
    pub category: AssetCategory,
    /// Payload da categoria. Em multipart vem como texto JSON no campo `data`.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetPayload {
    #[validate(length(min = 1, max = 200, message = "O nome não pode ficar vazio"))]
    pub name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionPayload {
    #[validate(length(max = 5000, message = "Descrição longa demais"))]
    pub description: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssetsQuery {
    pub category: Option<AssetCategory>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VariantQuery {
    pub variant: Option<Variant>,
}

// Campos explícitos: `flatten` não funciona com números em query string.
// O `t` da URL só fura o cache e cai nos campos ignorados.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    pub client_id: Option<i32>,
    pub format: Option<LogoFormat>,
    pub size: Option<u32>,
    pub variant: Option<Variant>,
    pub preserve_ratio: Option<bool>,
    pub preserve_vector: Option<bool>,
}

/// `filename` só com ASCII seguro (aspas e barras viram `_`) e o nome real
/// em `filename*` (RFC 5987).
fn content_disposition(kind: &str, file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' ' => ' ',
            c if c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    format!(
        "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, NON_ALPHANUMERIC)
    )
}

// =============================================================================
//  CORPO: JSON OU MULTIPART
// =============================================================================

/// Lê o corpo como JSON ou como multipart (`name`, `category`, `data` + `file`).
async fn read_asset_body<T: DeserializeOwned>(
    app_state: &AppState,
    request: Request,
) -> Result<(T, Option<UploadedFile>), AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let Json(payload) = Json::<T>::from_request(request, app_state)
            .await
            .map_err(|e| AppError::InvalidBody(e.body_text()))?;
        return Ok((payload, None));
    }

    let mut multipart = Multipart::from_request(request, app_state)
        .await
        .map_err(|e| AppError::InvalidBody(e.body_text()))?;

    let mut fields = Map::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidBody(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().map(str::to_string).ok_or(AppError::MissingFile)?;
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidBody(e.body_text()))?;
            file = Some(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field.text().await.map_err(|e| AppError::InvalidBody(e.body_text()))?;
        let value = if name == "data" {
            serde_json::from_str(&text).map_err(|e| AppError::InvalidBody(format!("data: {e}")))?
        } else {
            Value::String(text)
        };
        fields.insert(name, value);
    }

    let payload = serde_json::from_value(Value::Object(fields)).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    Ok((payload, file))
}

// =============================================================================
//  CRUD
// =============================================================================

// GET /api/clients/{clientId}/assets
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/assets",
    tag = "Assets",
    params(("clientId" = i32, Path, description = "ID do cliente"), ListAssetsQuery),
    responses((status = 200, description = "Assets do cliente", body = Vec<BrandAsset>)),
    security(("api_jwt" = []))
)]
pub async fn list_assets(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(client_id): Path<i32>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let assets = app_state
        .asset_service
        .list(client_id, query.category)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assets))
}

// GET /api/clients/{clientId}/assets/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/assets/{id}",
    tag = "Assets",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    responses(
        (status = 200, body = BrandAsset),
        (status = 404, description = "Asset não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((client_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = app_state
        .asset_service
        .get(client_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(asset))
}

// POST /api/clients/{clientId}/assets
#[utoipa::path(
    post,
    path = "/api/clients/{clientId}/assets",
    tag = "Assets",
    params(("clientId" = i32, Path)),
    request_body(content = CreateAssetPayload, description = "JSON, ou multipart com `file`"),
    responses(
        (status = 201, description = "Asset criado", body = BrandAsset),
        (status = 400, description = "Payload, cor ou extensão inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermAssetsCreate>,
    Path(client_id): Path<i32>,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    let (payload, file) = read_asset_body::<CreateAssetPayload>(&app_state, request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let asset = app_state
        .asset_service
        .create(
            client_id,
            NewAsset {
                name: payload.name,
                category: payload.category,
                data: payload.data,
            },
            file,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(asset)))
}

// PATCH /api/clients/{clientId}/assets/{id}
#[utoipa::path(
    patch,
    path = "/api/clients/{clientId}/assets/{id}",
    tag = "Assets",
    params(("clientId" = i32, Path), ("id" = i32, Path), VariantQuery),
    request_body(content = UpdateAssetPayload, description = "JSON, ou multipart com `file` (obrigatório com ?variant=dark)"),
    responses(
        (status = 200, body = BrandAsset),
        (status = 400, description = "Payload inválido ou arquivo ausente"),
        (status = 404, description = "Asset não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermAssetsUpdate>,
    Path((client_id, id)): Path<(i32, i32)>,
    Query(query): Query<VariantQuery>,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    let (payload, file) = read_asset_body::<UpdateAssetPayload>(&app_state, request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let asset = app_state
        .asset_service
        .update(
            client_id,
            id,
            AssetChanges {
                name: payload.name,
                data: payload.data,
            },
            query.variant.unwrap_or_default(),
            file,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(asset))
}

// DELETE /api/clients/{clientId}/assets/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{clientId}/assets/{id}",
    tag = "Assets",
    params(("clientId" = i32, Path), ("id" = i32, Path), VariantQuery),
    responses(
        (status = 204, description = "Removido (ou só a variante escura, com ?variant=dark)"),
        (status = 404, description = "Asset ou variante escura inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_asset(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermAssetsDelete>,
    Path((client_id, id)): Path<(i32, i32)>,
    Query(query): Query<VariantQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .asset_service
        .delete(client_id, id, query.variant.unwrap_or_default())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  AUTOSAVE DA DESCRIÇÃO
// =============================================================================

// PATCH /api/clients/{clientId}/brand-assets/{id}/description
#[utoipa::path(
    patch,
    path = "/api/clients/{clientId}/brand-assets/{id}/description",
    tag = "Assets",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    request_body = DescriptionPayload,
    responses((status = 202, description = "Gravação agendada (debounce)")),
    security(("api_jwt" = []))
)]
pub async fn schedule_description(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermAssetsUpdate>,
    Path((client_id, id)): Path<(i32, i32)>,
    Json(payload): Json<DescriptionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    // 404 agora, não quando o timer vencer
    app_state
        .asset_service
        .get(client_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let autosave = &app_state.description_autosave;
    autosave.schedule((client_id, id), payload.description);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "pending": true, "delayMs": autosave.delay().as_millis() as u64 })),
    ))
}

// DELETE /api/clients/{clientId}/brand-assets/{id}/description/pending
#[utoipa::path(
    delete,
    path = "/api/clients/{clientId}/brand-assets/{id}/description/pending",
    tag = "Assets",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    responses((status = 200, description = "`cancelled` = havia gravação pendente")),
    security(("api_jwt" = []))
)]
pub async fn cancel_description(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermAssetsUpdate>,
    Path((client_id, id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    let cancelled = app_state.description_autosave.cancel(&(client_id, id));
    Json(json!({ "cancelled": cancelled }))
}

// =============================================================================
//  LOGOS, URLS E ARQUIVOS
// =============================================================================

// GET /api/clients/{clientId}/logos
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/logos",
    tag = "Logos",
    params(("clientId" = i32, Path)),
    responses((status = 200, description = "Logos agrupados por seção", body = Vec<LogoSectionView>)),
    security(("api_jwt" = []))
)]
pub async fn list_logo_sections(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(client_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let sections = app_state
        .asset_service
        .logo_sections(&user.current(), client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sections))
}

// GET /api/clients/{clientId}/assets/{id}/download-url
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/assets/{id}/download-url",
    tag = "Logos",
    params(("clientId" = i32, Path), ("id" = i32, Path), UrlOptions),
    responses((status = 200, description = "`{ url }`")),
    security(("api_jwt" = []))
)]
pub async fn download_url(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((client_id, id)): Path<(i32, i32)>,
    Query(options): Query<UrlOptions>,
) -> Result<impl IntoResponse, ApiError> {
    let url = app_state
        .asset_service
        .download_url(client_id, id, options)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "url": url })))
}

// GET /api/clients/{clientId}/assets/{id}/package
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/assets/{id}/package",
    tag = "Logos",
    params(("clientId" = i32, Path), ("id" = i32, Path), VariantQuery),
    responses(
        (status = 200, description = "ZIP com PNG/, Vector/ e ICO/", content_type = "application/zip"),
        (status = 501, description = "Conversor não configurado"),
        (status = 502, description = "Falha no conversor")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_package(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((client_id, id)): Path<(i32, i32)>,
    Query(query): Query<VariantQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (asset, logo) = app_state
        .asset_service
        .logo(client_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let zip = app_state
        .package_service
        .build(&asset, &logo, query.variant.unwrap_or_default())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (CONTENT_TYPE, "application/zip".to_string()),
        (
            CONTENT_DISPOSITION,
            content_disposition("attachment", &format!("{}-package.zip", slugify(&asset.name))),
        ),
    ];
    Ok((headers, zip))
}

// GET /api/assets/{id}/file
#[utoipa::path(
    get,
    path = "/api/assets/{id}/file",
    tag = "Logos",
    params(("id" = i32, Path), FileQuery),
    responses(
        (status = 200, description = "Bytes do arquivo (original ou convertido)"),
        (status = 400, description = "clientId ausente"),
        (status = 404, description = "Asset de outro cliente ou sem arquivo"),
        (status = 501, description = "Conversão pedida sem conversor configurado")
    )
)]
pub async fn get_asset_file(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i32>,
    Query(query): Query<FileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = query
        .client_id
        .ok_or_else(|| AppError::MissingClientId.to_api_error(&locale, &app_state.i18n_store))?;

    let request = FileRequest {
        asset_id: id,
        client_id,
        options: UrlOptions {
            format: query.format,
            size: query.size,
            variant: query.variant,
            preserve_ratio: query.preserve_ratio,
            preserve_vector: query.preserve_vector,
        },
    };

    let blob = app_state
        .file_source
        .fetch(&request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (CONTENT_TYPE, blob.mime_type),
        (CONTENT_DISPOSITION, content_disposition("inline", &blob.file_name)),
        // `t` muda a cada montagem de URL; o cache curto basta
        (CACHE_CONTROL, "private, max-age=300".to_string()),
    ];
    Ok((headers, blob.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn quotes_in_file_names_do_not_break_the_header() {
        let header = content_disposition("inline", "logo \"final\".svg");
        assert_eq!(
            header,
            "inline; filename=\"logo _final_.svg\"; filename*=UTF-8''logo%20%22final%22%2Esvg"
        );
        assert!(HeaderValue::from_str(&header).is_ok());
    }

    #[test]
    fn non_ascii_names_keep_the_real_name_encoded() {
        let header = content_disposition("attachment", "marca-ç.zip");
        assert!(header.starts_with("attachment; filename=\"marca-_.zip\""));
        assert!(header.ends_with("filename*=UTF-8''marca%2D%C3%A7%2Ezip"));
    }
}
