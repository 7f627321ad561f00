use axum::{
    routing::{get, post},
    Router,
};
use migration::MigratorTrait;
use sea_orm::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keeprates_backend::config::AppConfig;
use keeprates_backend::handlers::rates;
use keeprates_backend::jobs::rate_sync::start_rate_sync_job;
use keeprates_backend::services::combank::CombankService;
use keeprates_backend::services::mailjet::MailjetService;
use keeprates_backend::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,keeprates_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let combank = CombankService::new(config.rates_url.clone());
    let mailjet = MailjetService::new(
        config.mailjet_api_key.clone(),
        config.mailjet_secret_key.clone(),
    );

    // Scheduled fetch/notify cycle
    start_rate_sync_job(db.clone(), combank.clone(), mailjet.clone(), config.clone()).await;

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        db,
        combank,
        mailjet,
        config,
    };

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .route("/api/rates", get(rates::get_rate_series))
        .route("/api/rates/report", get(rates::get_rate_report))
        .route("/api/rates/fetch", post(rates::trigger_fetch_rate))
        .route("/api/rates/email", post(rates::trigger_send_email))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(
        "Server listening on {}",
        listener.local_addr().expect("no local address")
    );

    axum::serve(listener, app).await.expect("Server error");
}

async fn health() -> &'static str {
    "KeepRates backend is running"
}
