//! Application state shared by all handlers

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::modules::integrations::prediction::PredictionClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Retrying client for the grade page's prediction service
    pub prediction: Arc<PredictionClient>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, String> {
        let prediction =
            PredictionClient::new(&config.prediction_service_url, config.prediction_timeout)?;
        Ok(Self::with_prediction(db, config, prediction))
    }

    /// Build the state around an already configured prediction client.
    pub fn with_prediction(
        db: DatabaseConnection,
        config: Config,
        prediction: PredictionClient,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            prediction: Arc::new(prediction),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
