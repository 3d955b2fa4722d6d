use std::env;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8090/api";
pub const DEFAULT_STORAGE_URL: &str = "sqlite://training_client.db";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub storage_url: String,
    /// Show the full training list when the per-user list comes back empty.
    pub fallback_to_all_trainings: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            fallback_to_all_trainings: true,
        }
    }
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = read("TRAINING_API_URL").unwrap_or(defaults.api_url);
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "TRAINING_API_URL must be an http(s) address, got {}",
                api_url
            )));
        }

        let storage_url = read("TRAINING_STORAGE_URL").unwrap_or(defaults.storage_url);

        let fallback_to_all_trainings = match read("TRAINING_FALLBACK_TO_ALL_TRAININGS") {
            None => defaults.fallback_to_all_trainings,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "TRAINING_FALLBACK_TO_ALL_TRAININGS must be true or false, got {}",
                    raw
                ))
            })?,
        };

        Ok(Self {
            api_url,
            storage_url,
            fallback_to_all_trainings,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
