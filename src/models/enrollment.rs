use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{ProgramId, UserId};

/// One row of `/user/my-trainings/{userId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub program_id: Option<String>,
    pub program_name: Option<String>,
    pub allocation_date: Option<String>,
}

impl Enrollment {
    pub fn from_value(row: &Value) -> Self {
        Self {
            program_id: scalar_text(row.get("programId")),
            program_name: scalar_text(row.get("programName")),
            allocation_date: scalar_text(row.get("allocationDate")),
        }
    }

    pub fn program_id_label(&self) -> &str {
        self.program_id.as_deref().unwrap_or("-")
    }

    pub fn program_name_label(&self) -> &str {
        self.program_name.as_deref().unwrap_or("Unnamed Program")
    }

    pub fn allocation_date_label(&self) -> &str {
        self.allocation_date.as_deref().unwrap_or("-")
    }
}

/// A single logical enrollment: one user, one program.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollRequest {
    user_id: UserId,
    program_id: ProgramId,
}

impl EnrollRequest {
    pub fn new(user_id: UserId, program_id: ProgramId) -> Result<Self, AppError> {
        if user_id.is_empty() || program_id.is_empty() {
            return Err(AppError::BadRequest(
                "userId and trainingId required".to_string(),
            ));
        }
        Ok(Self {
            user_id,
            program_id,
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }
}

pub(crate) fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
