// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AssetRepository, PersonaRepository, SectionRepository, UserRepository},
    services::{
        asset_service::{AssetService, DescriptionSink},
        auth::AuthService,
        autosave::{Debouncer, DEFAULT_DEBOUNCE},
        file_service::{AssetFileSource, ConverterClient, StoredFileSource},
        font_service::FontService,
        package_service::PackageService,
        persona_service::PersonaService,
        section_service::SectionService,
    },
};

/// Autosave da descrição: chave (cliente, asset), valor = texto.
pub type DescriptionAutosave = Debouncer<(i32, i32), String>;

// Tudo que vem do ambiente, lido uma vez na inicialização
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub public_base_url: String,
    pub file_converter_url: Option<String>,
    pub google_fonts_api_key: Option<String>,
    pub autosave_debounce: Duration,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match optional("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };
        let autosave_debounce = match optional("AUTOSAVE_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(raw.parse().context("AUTOSAVE_DEBOUNCE_MS deve ser um número")?),
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            // Vazio = URLs relativas
            public_base_url: optional("PUBLIC_BASE_URL").unwrap_or_default(),
            file_converter_url: optional("FILE_CONVERTER_URL"),
            google_fonts_api_key: optional("GOOGLE_FONTS_API_KEY"),
            autosave_debounce,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub asset_service: AssetService,
    pub persona_service: PersonaService,
    pub section_service: SectionService,
    pub file_source: Arc<dyn AssetFileSource>,
    pub package_service: PackageService,
    pub font_service: FontService,
    pub description_autosave: Arc<DescriptionAutosave>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = Arc::new(I18nStore::load()?);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let asset_repo = AssetRepository::new(db_pool.clone());
        let persona_repo = PersonaRepository;
        let section_repo = SectionRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone());
        let section_service = SectionService::new(Arc::new(section_repo));
        let asset_service = AssetService::new(
            asset_repo.clone(),
            section_service.clone(),
            settings.public_base_url.clone(),
        );
        let persona_service = PersonaService::new(persona_repo);

        let converter = settings
            .file_converter_url
            .as_ref()
            .map(|url| ConverterClient::new(http.clone(), url.clone()));
        if converter.is_none() {
            tracing::warn!("FILE_CONVERTER_URL ausente: só os arquivos originais serão servidos");
        }
        let file_source: Arc<dyn AssetFileSource> = Arc::new(StoredFileSource::new(asset_repo.clone(), converter));
        let package_service = PackageService::new(Arc::clone(&file_source));

        if settings.google_fonts_api_key.is_none() {
            tracing::warn!("GOOGLE_FONTS_API_KEY ausente: /api/google-fonts responderá 503");
        }
        let font_service = FontService::new(http, settings.google_fonts_api_key.clone());

        let description_autosave: Arc<DescriptionAutosave> = Arc::new(Debouncer::new(
            settings.autosave_debounce,
            Arc::new(DescriptionSink::new(asset_repo)),
        ));

        Ok(Self {
            db_pool,
            settings: Arc::new(settings),
            i18n_store,
            auth_service,
            asset_service,
            persona_service,
            section_service,
            file_source,
            package_service,
            font_service,
            description_autosave,
        })
    }
}
