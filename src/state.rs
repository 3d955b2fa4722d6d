use std::sync::Arc;

use crate::backend::{HttpTrainingApi, TrainingApi};
use crate::config::ClientConfig;
use crate::db::{SessionRepository, SqliteSessionStore};
use crate::error::AppError;
use crate::services::{AuthService, ProgramsService};

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn TrainingApi>,
    pub sessions: Arc<dyn SessionRepository>,
    pub auth: AuthService,
    pub programs: ProgramsService,
}

impl AppState {
    pub fn new(
        api: Arc<dyn TrainingApi>,
        sessions: Arc<dyn SessionRepository>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            auth: AuthService::new(api.clone(), sessions.clone()),
            programs: ProgramsService::new(api.clone(), config.fallback_to_all_trainings),
            api,
            sessions,
        }
    }

    pub async fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let api = Arc::new(HttpTrainingApi::new(config)?);
        let sessions = Arc::new(SqliteSessionStore::connect(&config.storage_url).await?);
        Ok(Self::new(api, sessions, config))
    }
}
