use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramId {
    Int(i64),
    Text(String),
}

impl ProgramId {
    /// Numeric text becomes `Int` so ids typed at the prompt match ids read from the backend.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => ProgramId::Int(n),
            Err(_) => ProgramId::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ProgramId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramId::Int(n) => write!(f, "{}", n),
            ProgramId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramStatus {
    Active,
    Enrolled,
    Other(String),
}

impl ProgramStatus {
    /// Expects an already upper-cased value.
    pub fn from_upper(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => ProgramStatus::Active,
            "ENROLLED" => ProgramStatus::Enrolled,
            _ => ProgramStatus::Other(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProgramStatus::Active => "ACTIVE",
            ProgramStatus::Enrolled => "ENROLLED",
            ProgramStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProgramStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProgramStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProgramStatus::from_upper(raw.to_uppercase()))
    }
}

/// Canonical program record shown in every program view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub status: ProgramStatus,
}

impl Program {
    pub fn is_active(&self) -> bool {
        self.status == ProgramStatus::Active
    }
}
