use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ProgramId;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
    pub user_id: String,
    pub training_id: ProgramId,
}

/// `{success, message}` envelope. Both fields are optional since the legacy
/// allocation endpoint answers with whatever it likes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiMessage {
    pub fn from_value(body: &Value) -> Self {
        Self {
            success: body.get("success").and_then(Value::as_bool),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}
