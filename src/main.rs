mod config;
mod db;
mod domain;
mod middleware;
mod mirror;
mod services;
mod state;
mod web;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get_service, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::{services::ServeDir, services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::domain::catalog::QuizCatalog;
use crate::domain::quests::QuestBook;
use crate::middleware::RateLimiter;
use crate::mirror::LocalMirror;
use crate::services::ai::AiService;
use crate::services::bank::QuestionBank;
use crate::services::generator::QuestionProvider;
use crate::services::progress::ProgressLedger;
use crate::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        e
    })?;

    let catalog = Arc::new(QuizCatalog::standard());
    let quest_book = Arc::new(QuestBook::standard());
    let bank = QuestionBank::default();
    let mirror = Arc::new(LocalMirror::new(config.data_dir.clone()));
    let provider = Arc::new(QuestionProvider::new(config.generator.clone(), bank));
    let ledger = Arc::new(ProgressLedger::new(pool.clone(), mirror, quest_book.clone()));
    let ai = config
        .openai_api_key
        .clone()
        .map(|key| Arc::new(AiService::new(key, config.openai_model.clone())));

    if !config.generator.is_configured() {
        tracing::info!("question generator not configured; quiz loads serve bank questions");
    }
    if ai.is_none() {
        tracing::info!("OPENAI_API_KEY not set; generation endpoint serves bank questions");
    }

    let shared: SharedState = Arc::new(AppState {
        pool,
        catalog,
        quest_book,
        bank,
        provider,
        ai,
        ledger,
        generator_configured: config.generator.is_configured(),
        generate_token: config.generator.credentials().map(|(_, token)| token.to_string()),
        session_key: config.session_key.clone(),
        auth_limiter: RateLimiter::new(5, 60),
    });

    let static_handler = ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .fallback_service(get_service(static_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
