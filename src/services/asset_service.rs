// src/services/asset_service.rs

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::AssetRepository,
    models::{
        asset::{
            AssetCategory, AssetData, BrandAsset, ColorData, ColorStep, LogoData, LogoFormat, LogoType, Variant,
        },
        auth::CurrentUser,
    },
    services::{
        autosave::SaveSink,
        color::{generate_tints_and_shades, hex_to_cmyk, hex_to_rgb, ColorError, Rgb, DEFAULT_SHADES, DEFAULT_TINTS},
        logo::{
            resolve_sources, secure_asset_url, validate_font_file_name, validate_upload_file_name, LogoSources,
            UrlOptions,
        },
        section_service::{visible_sections, SectionService},
    },
};

// --- ENTRADAS ---

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub category: AssetCategory,
    pub data: Value,
}

#[derive(Debug, Clone, Default)]
pub struct AssetChanges {
    pub name: Option<String>,
    pub data: Option<Value>,
}

/// Arquivo recebido via multipart.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// --- SAÍDAS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoView {
    pub id: i32,
    pub name: String,
    pub logo: LogoData,
    pub sources: LogoSources,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoSectionView {
    pub section_type: LogoType,
    pub hidden: bool,
    pub logos: Vec<LogoView>,
}

// =============================================================================
//  REGRAS PURAS
// =============================================================================

/// Tints/shades nunca vêm do cliente: são regenerados a partir da primeira cor.
/// Também normaliza os hex e completa `rgb`/`cmyk` ausentes.
pub fn normalize_color(color: &mut ColorData) -> Result<(), ColorError> {
    for value in color.colors.iter_mut() {
        let rgb = Rgb::parse(&value.hex).ok_or_else(|| ColorError::InvalidHex(value.hex.clone()))?;
        value.hex = rgb.to_hex();
        if value.rgb.is_none() {
            value.rgb = hex_to_rgb(&value.hex);
        }
        if value.cmyk.is_none() {
            value.cmyk = hex_to_cmyk(&value.hex);
        }
    }

    let Some(first) = color.colors.first() else {
        return Ok(());
    };
    let ramps = generate_tints_and_shades(&first.hex, &DEFAULT_TINTS, &DEFAULT_SHADES)?;

    color.tints = DEFAULT_TINTS
        .iter()
        .zip(ramps.tints)
        .map(|(percentage, hex)| ColorStep {
            percentage: *percentage,
            hex,
        })
        .collect();
    color.shades = DEFAULT_SHADES
        .iter()
        .zip(ramps.shades)
        .map(|(percentage, hex)| ColorStep {
            percentage: *percentage,
            hex,
        })
        .collect();

    Ok(())
}

/// Valida o payload contra a categoria e devolve o JSON normalizado.
pub fn prepare_data(category: AssetCategory, raw: &Value) -> Result<Value, AppError> {
    let data = match AssetData::parse(category, raw)? {
        AssetData::Color(mut color) => {
            normalize_color(&mut color)?;
            AssetData::Color(color)
        }
        other => other,
    };
    Ok(data.to_value())
}

/// Nome e formato do arquivo entram no `data` do logo.
fn merge_file_into_logo_data(data: &mut Value, file: &UploadedFile, format: LogoFormat) {
    if !data.is_object() {
        *data = json!({});
    }
    if let Value::Object(map) = data {
        map.insert("format".into(), json!(format));
        map.insert("fileName".into(), json!(file.file_name));
    }
}

/// Arquivo aceito para a categoria: logos pela lista de formatos de logo,
/// fontes pela de fontes. Cores não têm arquivo.
pub fn classify_upload(category: AssetCategory, file: &UploadedFile) -> Result<(Option<LogoFormat>, String), AppError> {
    match category {
        AssetCategory::Logo => {
            let format = validate_upload_file_name(&file.file_name)?;
            let mime = file
                .content_type
                .clone()
                .unwrap_or_else(|| format.mime_type().to_string());
            Ok((Some(format), mime))
        }
        AssetCategory::Font => {
            let mime = validate_font_file_name(&file.file_name)?;
            Ok((None, file.content_type.clone().unwrap_or_else(|| mime.to_string())))
        }
        AssetCategory::Color => Err(AppError::UnsupportedFileType(file.file_name.clone())),
    }
}

/// `hasDarkVariant` de um asset já gravado.
pub fn has_dark_variant(asset: &BrandAsset) -> bool {
    matches!(asset.parsed(), Ok(AssetData::Logo(logo)) if logo.has_dark_variant)
}

/// `hasDarkVariant` é do servidor: o valor enviado pelo cliente é descartado.
fn pin_dark_flag(category: AssetCategory, data: &mut Value, has_dark: bool) {
    if category != AssetCategory::Logo {
        return;
    }
    if let Value::Object(map) = data {
        map.insert("hasDarkVariant".into(), json!(has_dark));
    }
}

/// Upload já classificado: arquivo, formato (só logos) e MIME.
type ClassifiedUpload = (UploadedFile, Option<LogoFormat>, String);

/// Monta o `data` final de um PATCH. Com `variant = dark` o arquivo é obrigatório
/// e o `data` só muda pelos campos enviados; o arquivo claro entra no `data`.
fn plan_update(
    existing: &BrandAsset,
    new_data: Option<Value>,
    variant: Variant,
    upload: Option<&ClassifiedUpload>,
) -> Result<Value, AppError> {
    if variant == Variant::Dark && upload.is_none() {
        return Err(AppError::MissingFile);
    }

    let mut raw = new_data.unwrap_or_else(|| existing.data.clone());
    if let (Variant::Light, Some((file, Some(format), _))) = (variant, upload) {
        merge_file_into_logo_data(&mut raw, file, *format);
    }
    let mut data = prepare_data(existing.category, &raw)?;
    pin_dark_flag(existing.category, &mut data, has_dark_variant(existing));
    Ok(data)
}

/// Agrupa os logos por seção, respeitando as seções ocultas e o papel do usuário.
/// Assets que não passam no parse ficam de fora (com aviso), sem derrubar a listagem.
pub fn build_logo_sections(
    user: &CurrentUser,
    assets: &[BrandAsset],
    hidden: &BTreeSet<LogoType>,
    base_url: &str,
    t_millis: i64,
) -> Vec<LogoSectionView> {
    let logos: Vec<(&BrandAsset, LogoData)> = assets
        .iter()
        .filter(|a| a.category == AssetCategory::Logo)
        .filter_map(|asset| match asset.parsed() {
            Ok(AssetData::Logo(logo)) => Some((asset, logo)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Asset {} ignorado na listagem de logos: {}", asset.id, e);
                None
            }
        })
        .collect();

    visible_sections(user, hidden)
        .into_iter()
        .map(|section| LogoSectionView {
            section_type: section.section_type,
            hidden: section.hidden,
            logos: logos
                .iter()
                .filter(|(_, logo)| logo.logo_type == section.section_type)
                .map(|(asset, logo)| LogoView {
                    id: asset.id,
                    name: asset.name.clone(),
                    sources: resolve_sources(base_url, asset.id, asset.client_id, logo, t_millis),
                    logo: logo.clone(),
                })
                .collect(),
        })
        .collect()
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct AssetService {
    repo: AssetRepository,
    sections: SectionService,
    public_base_url: String,
}

impl AssetService {
    pub fn new(repo: AssetRepository, sections: SectionService, public_base_url: String) -> Self {
        Self {
            repo,
            sections,
            public_base_url,
        }
    }

    pub async fn list(&self, client_id: i32, category: Option<AssetCategory>) -> Result<Vec<BrandAsset>, AppError> {
        self.repo.list(self.repo.pool(), client_id, category).await
    }

    pub async fn get(&self, client_id: i32, id: i32) -> Result<BrandAsset, AppError> {
        self.repo
            .find(self.repo.pool(), client_id, id)
            .await?
            .ok_or(AppError::AssetNotFound(id))
    }

    /// Cria o asset (e o arquivo claro, se veio um). Tudo numa transação.
    pub async fn create(
        &self,
        client_id: i32,
        new_asset: NewAsset,
        file: Option<UploadedFile>,
    ) -> Result<BrandAsset, AppError> {
        let mut raw = new_asset.data;

        // Extensão validada antes de qualquer gravação
        let upload = match file {
            Some(file) => {
                let (format, mime) = classify_upload(new_asset.category, &file)?;
                if let Some(format) = format {
                    merge_file_into_logo_data(&mut raw, &file, format);
                }
                Some((file, mime))
            }
            None => None,
        };
        // Variante escura só nasce via PATCH ?variant=dark
        let mut data = prepare_data(new_asset.category, &raw)?;
        pin_dark_flag(new_asset.category, &mut data, false);

        let mut tx = self.repo.pool().begin().await?;
        let asset = self
            .repo
            .create(
                &mut *tx,
                client_id,
                &new_asset.name,
                new_asset.category,
                &data,
                upload.as_ref().map(|(_, mime)| mime.as_str()),
            )
            .await?;

        if let Some((file, mime)) = &upload {
            self.repo
                .upsert_file(&mut *tx, asset.id, Variant::Light, &file.file_name, mime, &file.bytes)
                .await?;
        }
        tx.commit().await?;

        tracing::info!("🎨 Asset {} ({:?}) criado para o cliente {}", asset.id, asset.category, client_id);
        Ok(asset)
    }

    /// PATCH no lugar. Com `variant = dark`, o arquivo anexa/substitui a versão escura.
    pub async fn update(
        &self,
        client_id: i32,
        id: i32,
        changes: AssetChanges,
        variant: Variant,
        file: Option<UploadedFile>,
    ) -> Result<BrandAsset, AppError> {
        let existing = self.get(client_id, id).await?;

        let upload = match file {
            Some(file) => {
                let (format, mime) = classify_upload(existing.category, &file)?;
                Some((file, format, mime))
            }
            None => None,
        };
        let data = plan_update(&existing, changes.data, variant, upload.as_ref())?;

        let mut tx = self.repo.pool().begin().await?;
        let light_mime = match (variant, &upload) {
            (Variant::Light, Some((_, _, mime))) => Some(mime.as_str()),
            _ => None,
        };
        self.repo
            .update(&mut *tx, client_id, id, changes.name.as_deref(), Some(&data), light_mime)
            .await?
            .ok_or(AppError::AssetNotFound(id))?;

        if let Some((file, _, mime)) = &upload {
            self.repo
                .upsert_file(&mut *tx, id, variant, &file.file_name, mime, &file.bytes)
                .await?;
            if variant == Variant::Dark {
                self.repo.set_dark_variant_flag(&mut *tx, id, true).await?;
            }
        }
        tx.commit().await?;

        tracing::info!("Asset {} atualizado (variante {:?})", id, variant);
        self.get(client_id, id).await
    }

    /// Com `variant = dark` remove só o arquivo escuro e limpa `hasDarkVariant`.
    pub async fn delete(&self, client_id: i32, id: i32, variant: Variant) -> Result<(), AppError> {
        match variant {
            Variant::Light => {
                if !self.repo.delete(self.repo.pool(), client_id, id).await? {
                    return Err(AppError::AssetNotFound(id));
                }
                tracing::info!("🗑️ Asset {} removido do cliente {}", id, client_id);
            }
            Variant::Dark => {
                let asset = self.get(client_id, id).await?;
                if !has_dark_variant(&asset) {
                    return Err(AppError::NoDarkVariant(id));
                }

                let mut tx = self.repo.pool().begin().await?;
                self.repo.delete_file(&mut *tx, id, Variant::Dark).await?;
                self.repo.set_dark_variant_flag(&mut *tx, id, false).await?;
                tx.commit().await?;
                tracing::info!("Variante escura do asset {} removida", id);
            }
        }
        Ok(())
    }

    pub async fn logo_sections(&self, user: &CurrentUser, client_id: i32) -> Result<Vec<LogoSectionView>, AppError> {
        let assets = self.list(client_id, Some(AssetCategory::Logo)).await?;
        let hidden = self.sections.hidden_set(client_id).await?;

        Ok(build_logo_sections(
            user,
            &assets,
            &hidden,
            &self.public_base_url,
            Utc::now().timestamp_millis(),
        ))
    }

    /// URL de download. Pedir escuro sem variante escura cai na clara.
    pub async fn download_url(&self, client_id: i32, id: i32, mut options: UrlOptions) -> Result<String, AppError> {
        let asset = self.get(client_id, id).await?;

        if options.wants_dark() && !has_dark_variant(&asset) {
            options.variant = Some(Variant::Light);
        }

        Ok(secure_asset_url(&self.public_base_url, asset.id, client_id, &options))
    }

    pub async fn logo(&self, client_id: i32, id: i32) -> Result<(BrandAsset, LogoData), AppError> {
        let asset = self.get(client_id, id).await?;
        match asset.parsed()? {
            AssetData::Logo(logo) => Ok((asset, logo)),
            _ => Err(AppError::FileNotFound(id)),
        }
    }

}

// ---
// Destino do autosave da descrição
// ---
pub struct DescriptionSink {
    repo: AssetRepository,
}

impl DescriptionSink {
    pub fn new(repo: AssetRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SaveSink<(i32, i32), String> for DescriptionSink {
    async fn save(&self, (client_id, id): (i32, i32), description: String) {
        match self
            .repo
            .update_description(self.repo.pool(), client_id, id, &description)
            .await
        {
            Ok(true) => tracing::debug!("Descrição do asset {} salva", id),
            Ok(false) => tracing::warn!("Autosave: asset {} não existe mais", id),
            Err(e) => tracing::error!("Autosave da descrição do asset {} falhou: {}", id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::{
        asset::{ColorGroup, ColorKind, ColorValue},
        auth::UserRole,
    };

    fn color(hex: &str) -> ColorData {
        ColorData {
            kind: ColorKind::Solid,
            category: ColorGroup::Brand,
            colors: vec![ColorValue {
                hex: hex.into(),
                rgb: None,
                cmyk: None,
                pantone: Some("PMS 2728 C".into()),
            }],
            tints: vec![ColorStep {
                percentage: 99,
                hex: "#000000".into(),
            }],
            shades: vec![],
        }
    }

    fn asset(id: i32, data: Value) -> BrandAsset {
        BrandAsset {
            id,
            client_id: 9,
            name: format!("Logo {id}"),
            category: AssetCategory::Logo,
            data,
            mime_type: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn client_supplied_ramps_are_replaced() {
        let mut data = color("FF0000");
        normalize_color(&mut data).unwrap();

        assert_eq!(data.colors[0].hex, "#ff0000");
        assert_eq!(data.colors[0].rgb.as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(data.colors[0].cmyk.as_deref(), Some("cmyk(0%, 100%, 100%, 0%)"));
        assert_eq!(data.colors[0].pantone.as_deref(), Some("PMS 2728 C"));
        assert_eq!(
            data.tints.iter().map(|s| s.percentage).collect::<Vec<_>>(),
            vec![60, 40, 20]
        );
        assert_eq!(data.tints[0].hex, "#ff9999");
        assert_eq!(data.shades[0], ColorStep { percentage: 20, hex: "#cc0000".into() });
    }

    #[test]
    fn invalid_hex_is_rejected_before_saving() {
        let raw = json!({ "type": "solid", "category": "brand", "colors": [{ "hex": "#12345" }] });
        assert!(matches!(
            prepare_data(AssetCategory::Color, &raw),
            Err(AppError::InvalidColor(_))
        ));
    }

    #[test]
    fn upload_fills_logo_file_fields() {
        let mut raw = json!({ "type": "main" });
        let file = UploadedFile {
            file_name: "acme.svg".into(),
            content_type: None,
            bytes: vec![],
        };
        merge_file_into_logo_data(&mut raw, &file, LogoFormat::Svg);

        let data = prepare_data(AssetCategory::Logo, &raw).unwrap();
        assert_eq!(data["fileName"], "acme.svg");
        assert_eq!(data["format"], "svg");
    }

    #[test]
    fn logo_sections_skip_broken_assets_and_hidden_sections() {
        let assets = vec![
            asset(1, json!({ "type": "main", "format": "svg", "fileName": "a.svg" })),
            asset(2, json!({ "type": "banner", "format": "svg", "fileName": "b.svg" })),
            asset(3, json!({ "type": "favicon", "format": "png", "fileName": "c.png", "hasDarkVariant": true })),
        ];
        let hidden = BTreeSet::from([LogoType::Favicon]);
        let editor = CurrentUser { id: 1, role: UserRole::Editor };

        let sections = build_logo_sections(&editor, &assets, &hidden, "", 1);
        assert!(sections.iter().all(|s| s.section_type != LogoType::Favicon));
        let main = sections.iter().find(|s| s.section_type == LogoType::Main).unwrap();
        assert_eq!(main.logos.len(), 1);
        assert_eq!(main.logos[0].id, 1);
        assert!(main.logos[0].sources.invert_dark);

        let admin = CurrentUser { id: 2, role: UserRole::Admin };
        let sections = build_logo_sections(&admin, &assets, &hidden, "", 1);
        let favicon = sections.iter().find(|s| s.section_type == LogoType::Favicon).unwrap();
        assert!(favicon.hidden);
        assert!(!favicon.logos[0].sources.invert_dark);
        assert!(favicon.logos[0].sources.dark_url.contains("variant=dark"));
    }

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: None,
            bytes: vec![1, 2, 3],
        }
    }

    fn logo_with_dark() -> BrandAsset {
        asset(7, json!({ "type": "main", "format": "svg", "fileName": "a.svg", "hasDarkVariant": true }))
    }

    #[test]
    fn font_files_are_accepted_for_fonts_only() {
        let (format, mime) = classify_upload(AssetCategory::Font, &upload("Inter-Regular.ttf")).unwrap();
        assert_eq!(format, None);
        assert_eq!(mime, "font/ttf");

        assert!(matches!(
            classify_upload(AssetCategory::Logo, &upload("Inter-Regular.ttf")),
            Err(AppError::UnsupportedFileType(_))
        ));
        assert!(classify_upload(AssetCategory::Color, &upload("acme.svg")).is_err());

        let (format, mime) = classify_upload(AssetCategory::Logo, &upload("acme.svg")).unwrap();
        assert_eq!(format, Some(LogoFormat::Svg));
        assert_eq!(mime, "image/svg+xml");
    }

    #[test]
    fn light_patch_keeps_the_stored_dark_flag() {
        let existing = logo_with_dark();
        let data = plan_update(
            &existing,
            Some(json!({ "type": "main", "format": "svg", "fileName": "a.svg" })),
            Variant::Light,
            None,
        )
        .unwrap();
        assert_eq!(data["hasDarkVariant"], true);

        let file = upload("novo.png");
        let classified = (file, Some(LogoFormat::Png), "image/png".to_string());
        let data = plan_update(&existing, None, Variant::Light, Some(&classified)).unwrap();
        assert_eq!(data["fileName"], "novo.png");
        assert_eq!(data["hasDarkVariant"], true);
    }

    #[test]
    fn client_cannot_claim_a_dark_variant() {
        let existing = asset(8, json!({ "type": "main", "format": "svg", "fileName": "a.svg" }));
        let data = plan_update(
            &existing,
            Some(json!({ "type": "main", "format": "svg", "fileName": "a.svg", "hasDarkVariant": true })),
            Variant::Light,
            None,
        )
        .unwrap();
        assert_eq!(data["hasDarkVariant"], false);
        assert!(!has_dark_variant(&existing));
    }

    #[test]
    fn dark_patch_needs_a_file_and_leaves_light_data_alone() {
        let existing = asset(8, json!({ "type": "main", "format": "svg", "fileName": "a.svg" }));
        assert!(matches!(
            plan_update(&existing, None, Variant::Dark, None),
            Err(AppError::MissingFile)
        ));

        let classified = (upload("dark.png"), Some(LogoFormat::Png), "image/png".to_string());
        let data = plan_update(&existing, None, Variant::Dark, Some(&classified)).unwrap();
        assert_eq!(data["fileName"], "a.svg");
        assert_eq!(data["format"], "svg");
    }

}
