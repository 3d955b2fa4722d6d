//! Turns whatever program rows the backend returns into canonical [`Program`]s.
//!
//! Different endpoints name the same concept differently (`id` / `programId` /
//! `trainingId`, `name` / `title`, ...). Every alias list is tried in order and
//! the first present value wins; anything missing degrades to a default, so
//! normalization never fails.

use serde_json::Value;

use crate::models::{Program, ProgramId, ProgramStatus};

const ID_KEYS: &[&str] = &["id", "programId", "trainingId"];
const NAME_KEYS: &[&str] = &["name", "programName", "title"];
const DESCRIPTION_KEYS: &[&str] = &["description", "details"];
const PRICE_KEYS: &[&str] = &["price", "cost", "amount"];
const STATUS_KEYS: &[&str] = &["status", "state"];

pub const DEFAULT_NAME: &str = "Unnamed Program";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_STATUS: &str = "ACTIVE";

/// Anything that is not a JSON array normalizes to an empty list.
pub fn normalize_programs(source: Option<&Value>) -> Vec<Program> {
    match source {
        Some(Value::Array(rows)) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| normalize_program(index, row))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_program(index: usize, row: &Value) -> Program {
    let id = first_present(row, ID_KEYS)
        .map(program_id_from)
        .unwrap_or(ProgramId::Int(index as i64));

    let name = first_present(row, NAME_KEYS)
        .map(text_from)
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    let description = first_present(row, DESCRIPTION_KEYS)
        .map(text_from)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let price = first_present(row, PRICE_KEYS)
        .and_then(price_from)
        .unwrap_or(0.0);

    let status = STATUS_KEYS
        .iter()
        .find_map(|key| row.get(*key).and_then(truthy_text))
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Program {
        id,
        name,
        description,
        price,
        status: ProgramStatus::from_upper(status.to_uppercase()),
    }
}

/// First alias that exists and is not null.
fn first_present<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

fn program_id_from(value: &Value) -> ProgramId {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => ProgramId::Int(i),
            None => ProgramId::Text(n.to_string()),
        },
        Value::String(s) => ProgramId::Text(s.clone()),
        other => ProgramId::Text(other.to_string()),
    }
}

fn text_from(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn price_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        _ => None,
    }
}

/// Status aliases skip empty and falsy values, not just missing ones.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
