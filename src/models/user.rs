use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::enrollment::scalar_text;

/// Opaque user identifier as handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// Accepts the JSON forms the backend has been seen to use for ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        scalar_text(Some(value))
            .map(UserId::new)
            .filter(|id| !id.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Row of the admin user listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserSummary {
    pub fn from_value(row: &Value) -> Self {
        Self {
            id: scalar_text(row.get("id").or_else(|| row.get("userId"))),
            name: scalar_text(row.get("name").or_else(|| row.get("userName"))),
            email: scalar_text(row.get("email")),
            role: scalar_text(row.get("role")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: String,
}
