use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::backend::{AdminResource, TrainingApi};
use crate::error::AppError;
use crate::models::{Program, UserSummary};
use crate::services::normalizer::{normalize_program, normalize_programs};

pub const STATS_FAILED_MESSAGE: &str = "Failed to fetch stats";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub users: usize,
    pub trainings: usize,
    pub allocations: usize,
}

/// All three listings are requested at once; any failure fails the whole card.
pub async fn fetch_stats(api: &dyn TrainingApi) -> Result<DashboardStats, AppError> {
    let fetched = tokio::try_join!(
        api.list_users(),
        api.list_trainings(),
        api.list_allocations()
    );

    match fetched {
        Ok((users, trainings, allocations)) => Ok(DashboardStats {
            users: array_len(&users),
            trainings: array_len(&trainings),
            allocations: array_len(&allocations),
        }),
        Err(e) => {
            error!("Error fetching stats: {}", e);
            Err(AppError::Rejected(STATS_FAILED_MESSAGE.to_string()))
        }
    }
}

pub async fn list_users(api: &dyn TrainingApi) -> Result<Vec<UserSummary>, AppError> {
    let body = api.list_users().await?;
    Ok(rows(&body).iter().map(UserSummary::from_value).collect())
}

pub async fn list_trainings(api: &dyn TrainingApi) -> Result<Vec<Program>, AppError> {
    let body = api.list_trainings().await?;
    Ok(normalize_programs(Some(&body)))
}

/// Allocation rows are backend-defined and passed through untouched.
pub async fn list_allocations(api: &dyn TrainingApi) -> Result<Vec<Value>, AppError> {
    let body = api.list_allocations().await?;
    Ok(rows(&body).to_vec())
}

/// A single record of one of the managed collections.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminRecord {
    User(UserSummary),
    Training(Program),
    /// Allocation rows are backend-defined.
    Allocation(Value),
}

impl AdminRecord {
    pub fn from_value(resource: AdminResource, body: &Value) -> Self {
        match resource {
            AdminResource::User => AdminRecord::User(UserSummary::from_value(body)),
            AdminResource::Training => AdminRecord::Training(normalize_program(0, body)),
            AdminResource::Allocation => AdminRecord::Allocation(body.clone()),
        }
    }
}

pub async fn fetch_record(
    api: &dyn TrainingApi,
    resource: AdminResource,
    id: &str,
) -> Result<AdminRecord, AppError> {
    let id = required_id(resource, id)?;
    let body = api
        .get_record(resource, id)
        .await
        .map_err(|e| rejected(e, "load", resource))?;
    Ok(AdminRecord::from_value(resource, &body))
}

/// Posts the record to its collection. The saved record comes back when the
/// backend echoes one.
pub async fn save_record(
    api: &dyn TrainingApi,
    resource: AdminResource,
    record: &Value,
) -> Result<Option<AdminRecord>, AppError> {
    if !record.is_object() {
        return Err(AppError::BadRequest(format!(
            "A {} must be a JSON object",
            resource
        )));
    }

    let body = api
        .save_record(resource, record)
        .await
        .map_err(|e| rejected(e, "save", resource))?;
    info!("saved {}", resource);
    Ok(body
        .is_object()
        .then(|| AdminRecord::from_value(resource, &body)))
}

pub async fn delete_record(
    api: &dyn TrainingApi,
    resource: AdminResource,
    id: &str,
) -> Result<(), AppError> {
    let id = required_id(resource, id)?;
    api.delete_record(resource, id)
        .await
        .map_err(|e| rejected(e, "delete", resource))?;
    info!("deleted {} {}", resource, id);
    Ok(())
}

fn required_id(resource: AdminResource, id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest(format!("{} id required", resource)));
    }
    Ok(id)
}

/// Backend rejections keep their message; the rest read "Failed to <action> <resource>".
fn rejected(err: AppError, action: &str, resource: AdminResource) -> AppError {
    match err {
        AppError::Status {
            message: Some(message),
            ..
        } => AppError::Rejected(message),
        AppError::Status { status, .. } => {
            error!("{} {} failed with {}", action, resource, status);
            AppError::Rejected(format!("Failed to {} {}", action, resource))
        }
        other => other,
    }
}

fn array_len(body: &Value) -> usize {
    body.as_array().map(Vec::len).unwrap_or(0)
}

fn rows(body: &Value) -> &[Value] {
    body.as_array().map(Vec::as_slice).unwrap_or(&[])
}
