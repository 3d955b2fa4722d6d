use serde_json::Value;

use crate::backend::TrainingApi;
use crate::error::AppError;
use crate::models::{Enrollment, UserId};

pub const FETCH_FAILED_MESSAGE: &str = "Error fetching enrollments";

pub async fn fetch_enrollments(
    api: &dyn TrainingApi,
    user_id: &UserId,
) -> Result<Vec<Enrollment>, AppError> {
    let body = api.my_trainings(user_id).await?;

    let rows = match body.get("trainings") {
        Some(Value::Array(rows)) => rows.iter().map(Enrollment::from_value).collect(),
        _ => Vec::new(),
    };
    Ok(rows)
}

/// Text for a failed enrollments fetch.
pub fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Status { message: None, .. } => FETCH_FAILED_MESSAGE.to_string(),
        other => other.user_message(),
    }
}
