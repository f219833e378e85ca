use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use climbtime::infrastructure::AppState;
use climbtime::{auth, config, db, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climbtime=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = config::Config::from_env();

    if !auth::jwt_secret_configured() {
        if cfg!(debug_assertions) {
            tracing::warn!("JWT_SECRET not set, using the development fallback secret");
        } else {
            tracing::error!("JWT_SECRET not set: sign-in and protected routes will fail");
        }
    }

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Prediction service: {} (timeout {:?})",
        config.prediction_service_url,
        config.prediction_timeout
    );

    let state = match AppState::new(db, config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to build application state: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(state).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
