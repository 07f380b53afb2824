use actix_middleware::{CallerIdentity, IdentityResolver};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use crypto_core::JwtKeys;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_service::config::Config;
use social_service::{configure, AppState, ContentRepository, MemoryRepository, PostgresRepository};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_repository(config: &Config) -> Result<Arc<dyn ContentRepository>> {
    if let Some(db) = &config.database {
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .min_connections(db.min_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect(&db.url)
            .await
            .context("Failed to connect to database")?;

        let repo = PostgresRepository::new(pool);
        repo.health_check()
            .await
            .context("Failed to verify database connection")?;
        repo.migrate()
            .await
            .context("Failed to run database migrations")?;
        info!("Database pool created and migrations applied");
        return Ok(Arc::new(repo));
    }

    let repo = match &config.seed_file {
        Some(path) => MemoryRepository::load_seed_file(path)
            .await
            .with_context(|| format!("Failed to load seed file {}", path.display()))?,
        None => MemoryRepository::new(),
    };
    warn!("DATABASE_URL not set; using in-memory repository");
    Ok(Arc::new(repo))
}

fn build_resolver(config: &Config) -> Result<IdentityResolver> {
    match &config.auth.jwt_public_key_pem {
        Some(pem) => {
            let keys = JwtKeys::validation_only(pem).context("Invalid JWT_PUBLIC_KEY_PEM")?;
            Ok(IdentityResolver::new(keys))
        }
        None => {
            warn!("JWT_PUBLIC_KEY_PEM not set; every caller is anonymous");
            Ok(IdentityResolver::anonymous_only())
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.json_logs);

    info!(
        env = %config.app.env,
        port = config.app.http_port,
        "Starting social-service"
    );

    let repo = build_repository(&config).await?;
    let resolver = build_resolver(&config)?;
    let state = web::Data::new(AppState::new(repo, config.feed));

    let addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("HTTP server listening on http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(CallerIdentity::new(resolver.clone()))
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {addr}"))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("social-service shutting down");
    Ok(())
}
