use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PREDICTION_SERVICE_URL: &str = "https://specialbarnacle.onrender.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub prediction_service_url: String,
    pub prediction_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://climbtime.db?mode=rwc".to_string());

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            prediction_service_url: env::var("PREDICTION_SERVICE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_PREDICTION_SERVICE_URL.to_string()),
            prediction_timeout: Duration::from_secs(
                env::var("PREDICTION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Configuration for tests: in-memory database, temp upload dir.
    pub fn for_tests(prediction_service_url: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
            upload_dir: env::temp_dir().join(format!("climbtime-uploads-{}", uuid::Uuid::new_v4())),
            prediction_service_url: prediction_service_url.trim_end_matches('/').to_string(),
            prediction_timeout: Duration::from_secs(5),
        }
    }
}
