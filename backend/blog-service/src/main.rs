use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use blog_service::config::StoreKind;
use blog_service::db::{MemoryStore, PgStore, Store};
use blog_service::handlers::errors::error_handlers;
use blog_service::{routes, AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match config.store {
        StoreKind::Postgres => {
            let store = PgStore::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            if config.database.run_migrations {
                store.run_migrations().await?;
            }
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(env = %config.app.env, store = ?config.store, "Starting blog-service");

    let store = build_store(&config).await?;
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let workers = config.app.workers;
    let state = web::Data::new(AppState::new(store, config));

    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(error_handlers())
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .workers(workers)
    .run()
    .await?;

    tracing::info!("blog-service stopped");
    Ok(())
}
