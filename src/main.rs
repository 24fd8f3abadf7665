//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Uploads de logo (AI/EPS/PDF) passam fácil do limite padrão de 2 MB
const UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = app_state.settings.bind_addr.clone();
    let app = router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas de usuário
    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    // Assets, logos, personas e seções de um cliente
    let client_routes = Router::new()
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            "/assets/{id}",
            get(handlers::assets::get_asset)
                .patch(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        .route(
            "/brand-assets/{id}",
            get(handlers::assets::get_asset)
                .patch(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        .route(
            "/brand-assets/{id}/description",
            patch(handlers::assets::schedule_description),
        )
        .route(
            "/brand-assets/{id}/description/pending",
            delete(handlers::assets::cancel_description),
        )
        .route("/assets/{id}/download-url", get(handlers::assets::download_url))
        .route("/assets/{id}/package", get(handlers::assets::download_package))
        .route("/logos", get(handlers::assets::list_logo_sections))
        .route(
            "/personas",
            get(handlers::personas::list_personas).post(handlers::personas::create_persona),
        )
        .route(
            "/personas/{id}",
            get(handlers::personas::get_persona)
                .patch(handlers::personas::update_persona)
                .delete(handlers::personas::delete_persona),
        )
        .route(
            "/hidden-sections",
            get(handlers::sections::list_hidden_sections).post(handlers::sections::hide_section),
        )
        .route(
            "/hidden-sections/{sectionType}",
            delete(handlers::sections::show_section),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES));

    let color_routes = Router::new()
        .route("/derive", post(handlers::colors::derive_color))
        .route("/neutral-ramp", post(handlers::colors::neutral_ramp))
        .route("/container", post(handlers::colors::container_colors));

    // Tudo que exige o Bearer
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/clients/{clientId}", client_routes)
        .nest("/colors", color_routes)
        .route("/google-fonts", get(handlers::fonts::list_google_fonts))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Públicas: health, docs e o arquivo (isolado pelo clientId da URL)
    let public = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/assets/{id}/file", get(handlers::assets::get_asset_file));

    Router::new()
        .nest("/api", protected.merge(public))
        .with_state(app_state)
}
