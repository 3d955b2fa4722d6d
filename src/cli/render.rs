use serde_json::Value;

use crate::models::{Enrollment, Program, UserId, UserSummary};
use crate::services::catalog::NO_ACTIVE_PROGRAMS_MESSAGE;
use crate::services::{AdminRecord, DashboardStats, Notice, NoticeKind};

pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

pub fn price(value: f64) -> String {
    format!("₹{:.2}", value)
}

/// Only ACTIVE programs are listed; anything else is hidden from this view.
pub fn active_programs(programs: &[Program]) -> String {
    let rows: Vec<Vec<String>> = programs
        .iter()
        .filter(|p| p.is_active())
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.description.clone(),
                price(p.price),
                p.status.to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        return NO_ACTIVE_PROGRAMS_MESSAGE.to_string();
    }
    table(&["ID", "Name", "Description", "Price", "Status"], &rows)
}

pub fn programs(programs: &[Program]) -> String {
    let rows: Vec<Vec<String>> = programs
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.description.clone(),
                price(p.price),
                p.status.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Name", "Description", "Price", "Status"], &rows)
}

pub fn enrollments(user_id: &UserId, rows: &[Enrollment]) -> String {
    if rows.is_empty() {
        return format!("No enrollments found for user {}.", user_id);
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.program_id_label().to_string(),
                r.program_name_label().to_string(),
                r.allocation_date_label().to_string(),
            ]
        })
        .collect();
    table(&["Program ID", "Program Name", "Allocation Date"], &rows)
}

pub fn users(rows: &[UserSummary]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|u| {
            [&u.id, &u.name, &u.email, &u.role]
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("-").to_string())
                .collect()
        })
        .collect();
    table(&["ID", "Name", "Email", "Role"], &rows)
}

pub fn allocations(rows: &[Value]) -> String {
    if rows.is_empty() {
        return "No allocations found.".to_string();
    }
    rows.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn record(record: &AdminRecord) -> String {
    match record {
        AdminRecord::User(user) => users(std::slice::from_ref(user)),
        AdminRecord::Training(program) => programs(std::slice::from_ref(program)),
        AdminRecord::Allocation(row) => row.to_string(),
    }
}

pub fn stats(stats: &DashboardStats) -> String {
    format!(
        "Total Users:        {}\nTraining Programs:  {}\nActive Allocations: {}",
        stats.users, stats.trainings, stats.allocations
    )
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Info => "info",
        NoticeKind::Error => "error",
    };
    format!("[{}] {}", tag, notice.text)
}
