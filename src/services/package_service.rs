// src/services/package_service.rs

use std::io::{Cursor, Write};
use std::sync::Arc;

use futures::future::try_join_all;
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    common::error::AppError,
    models::asset::{BrandAsset, LogoData, Variant},
    services::{
        file_service::{AssetFileSource, FileRequest},
        logo::{plan_package, UrlOptions},
    },
};

#[derive(Clone)]
pub struct PackageService {
    source: Arc<dyn AssetFileSource>,
}

impl PackageService {
    pub fn new(source: Arc<dyn AssetFileSource>) -> Self {
        Self { source }
    }

    /// Busca todos os arquivos do plano em paralelo e monta o ZIP.
    /// Tudo ou nada: uma busca com erro aborta o pacote inteiro.
    /// Pedidos simultâneos para o mesmo asset não são deduplicados.
    pub async fn build(&self, asset: &BrandAsset, logo: &LogoData, variant: Variant) -> Result<Vec<u8>, AppError> {
        let plan = plan_package(&asset.name, logo, variant);

        let requests: Vec<FileRequest> = plan
            .iter()
            .map(|entry| FileRequest {
                asset_id: asset.id,
                client_id: asset.client_id,
                options: UrlOptions {
                    format: Some(entry.format),
                    size: entry.size,
                    variant: Some(variant),
                    preserve_ratio: Some(true),
                    preserve_vector: Some(entry.preserve_vector),
                },
            })
            .collect();

        let blobs = try_join_all(requests.iter().map(|r| self.source.fetch(r))).await?;
        tracing::info!("📦 Pacote do asset {}: {} arquivos", asset.id, blobs.len());

        let files: Vec<(String, Vec<u8>)> = plan
            .into_iter()
            .zip(blobs)
            .map(|(entry, blob)| (entry.path, blob.bytes))
            .collect();

        // Compressão é trabalho de CPU: fora do executor assíncrono
        tokio::task::spawn_blocking(move || write_zip(files))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de compressão: {}", e))?
    }
}

pub fn write_zip(files: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (path, bytes) in files {
        zip.start_file(path, options)?;
        zip.write_all(&bytes).map_err(ZipError::from)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{
        models::asset::{AssetCategory, LogoFormat, LogoType},
        services::file_service::FileBlob,
    };

    struct FakeSource {
        calls: AtomicUsize,
        fail_on: Option<LogoFormat>,
    }

    #[async_trait]
    impl AssetFileSource for FakeSource {
        async fn fetch(&self, request: &FileRequest) -> Result<FileBlob, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let format = request.options.format.unwrap();
            if Some(format) == self.fail_on {
                return Err(AppError::Upstream {
                    service: "converter",
                    status: 500,
                    message: "falhou".into(),
                });
            }
            Ok(FileBlob {
                file_name: format!("x.{}", format.extension()),
                mime_type: format.mime_type().into(),
                bytes: format!("{:?}-{:?}", format, request.options.size).into_bytes(),
            })
        }
    }

    fn asset() -> BrandAsset {
        BrandAsset {
            id: 5,
            client_id: 9,
            name: "Acme".into(),
            category: AssetCategory::Logo,
            data: json!({}),
            mime_type: Some("image/svg+xml".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn favicon() -> LogoData {
        LogoData {
            logo_type: LogoType::Favicon,
            format: LogoFormat::Svg,
            file_name: "acme.svg".into(),
            has_dark_variant: false,
            is_dark_variant: false,
            description: None,
            figma_link: None,
        }
    }

    #[tokio::test]
    async fn zip_contains_every_planned_folder() {
        let source = Arc::new(FakeSource {
            calls: AtomicUsize::new(0),
            fail_on: None,
        });
        let service = PackageService::new(source.clone());

        let bytes = service.build(&asset(), &favicon(), Variant::Light).await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();

        assert_eq!(source.calls.load(Ordering::SeqCst), 10);
        assert_eq!(names.len(), 10);
        assert!(names.iter().any(|n| n.starts_with("PNG/")));
        assert!(names.iter().any(|n| n.starts_with("Vector/")));
        assert!(names.iter().any(|n| n.starts_with("ICO/")));

        let mut png = archive.by_name("PNG/acme-512.png").unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut png, &mut content).unwrap();
        assert_eq!(content, "Png-Some(512)");
    }

    #[tokio::test]
    async fn one_failed_fetch_aborts_the_package() {
        let service = PackageService::new(Arc::new(FakeSource {
            calls: AtomicUsize::new(0),
            fail_on: Some(LogoFormat::Ico),
        }));

        let result = service.build(&asset(), &favicon(), Variant::Light).await;
        assert!(matches!(result, Err(AppError::Upstream { .. })));
    }
}
