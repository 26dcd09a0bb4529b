use coffee_shop::{
    AppState,
    auth::AuthGuard,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, connects to Postgres, prepares the
/// `drinks` table and serves the API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing required variables)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coffee_shop=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let postgres = PostgresRepository::new(pool);
    if config.reset_db {
        let seeded = postgres
            .reset()
            .await
            .expect("FATAL: Failed to reset the drinks table.");
        tracing::warn!(drink_id = seeded.id, "RESET_DB set: drinks table recreated and seeded");
    } else {
        postgres
            .ensure_schema()
            .await
            .expect("FATAL: Failed to create the drinks table.");
    }
    let repo = Arc::new(postgres) as RepositoryState;

    // 4. Auth: signing keys are fetched lazily on the first protected request.
    let auth = AuthGuard::from_config(&config);
    tracing::info!(
        issuer = %config.issuer(),
        audience = %config.api_audience,
        "verifying tokens against {}",
        config.jwks_url()
    );

    // 5. Router and server
    let app = create_router(AppState::new(repo, auth));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
