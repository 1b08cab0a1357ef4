pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use srs_core::{ComponentIndex, Scheduler};

use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// Component overlap index, built once from the bundled dataset.
    pub components: Arc<ComponentIndex>,
    pub scheduler: Scheduler,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    tracing::info!("Seeding kanji catalog...");
    let (created, components) = services::catalog::initialize(&db).await?;
    if created > 0 {
        tracing::info!("Inserted {} new catalog entries", created);
    }

    let state = AppState {
        db: Arc::new(db),
        components,
        scheduler: Scheduler::default(),
    };

    let app = router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full router. Exposed so integration tests can drive the
/// API without binding a port.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Study routes
        .route("/api/study/queue", get(routes::study::queue))
        .route("/api/study/answer", post(routes::study::answer))
        .route("/api/study/seed", post(routes::study::seed))
        .route("/api/study/reset", post(routes::study::reset))
        // Lesson routes
        .route("/api/learn/next", get(routes::learn::next))
        .route("/api/learn/complete", post(routes::learn::complete))
        // Deck routes
        .route("/api/decks", get(routes::decks::list))
        .route("/api/decks/:deck/stats", get(routes::decks::stats))
        // Kanji routes
        .route("/api/kanji/:character", get(routes::kanji::detail))
        .route("/api/kanji/:character/related", get(routes::kanji::related))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
