// 📋 Project Progress - One row per project attempt, merged per project path
//
// Merge rule: a successful attempt (grade > 0) wins over the latest attempt;
// the merged row counts every attempt and keeps an audit trail of them.

use crate::category::CategoryMap;
use crate::format::{format_grade, format_short_date};
use crate::records::{Auditor, RawProgress};
use crate::rules::RuleEngine;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub path: String,
    pub date: DateTime<Utc>,
    pub formatted_date: String,
    pub grade: Option<f64>,
    pub is_completed: bool,
    pub captain_login: Option<String>,
    pub auditors: Vec<Auditor>,
    /// Number of raw rows merged into this one
    pub attempts: usize,
    /// `"<date>: <grade>"` per attempt, newline-joined, when attempts > 1
    pub attempt_dates: Option<String>,
}

impl ProgressEntry {
    fn from_raw(raw: &RawProgress, date: DateTime<Utc>) -> Self {
        let group = raw.group.clone().unwrap_or_default();
        ProgressEntry {
            path: raw.path.clone(),
            date,
            formatted_date: format_short_date(&date),
            grade: raw.grade,
            is_completed: raw.grade.map_or(false, |g| g > 0.0),
            captain_login: group.captain_login,
            auditors: group.auditors,
            attempts: 1,
            attempt_dates: None,
        }
    }

    /// Last path segment
    pub fn project_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn auditor_list(&self) -> String {
        self.auditors
            .iter()
            .map(|a| a.auditor_login.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Split raw rows by category (unmerged). Rows without a date or without a
/// matching rule are dropped.
pub fn classify_progress(records: &[RawProgress], rules: &RuleEngine) -> CategoryMap<Vec<ProgressEntry>> {
    let mut out: CategoryMap<Vec<ProgressEntry>> = CategoryMap::default();

    for raw in records {
        let Some(date) = raw.date() else {
            warn!("progress row for {} has no date, skipping", raw.path);
            continue;
        };
        if let Some(category) = rules.classify(&raw.path) {
            out.get_mut(category).push(ProgressEntry::from_raw(raw, date));
        }
    }

    debug!(
        "progress rows: go={} js={} module={}",
        out.piscine_go.len(),
        out.piscine_js.len(),
        out.module.len()
    );
    out
}

/// Collapse rows sharing a path into one entry; result is newest first.
pub fn merge_by_project(entries: &[ProgressEntry]) -> Vec<ProgressEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ProgressEntry>> = HashMap::new();
    for entry in entries {
        groups
            .entry(entry.path.as_str())
            .or_insert_with(|| {
                order.push(entry.path.as_str());
                Vec::new()
            })
            .push(entry);
    }

    let mut merged: Vec<ProgressEntry> = order
        .into_iter()
        .filter_map(|path| groups.remove(path))
        .filter_map(|mut group| {
            group.sort_by(|a, b| b.date.cmp(&a.date));
            if group.len() == 1 {
                return group.first().map(|e| (*e).clone());
            }

            let chosen = group
                .iter()
                .find(|e| e.is_completed)
                .or_else(|| group.first())?;

            let mut result = (*chosen).clone();
            result.attempts = group.len();
            result.attempt_dates = Some(
                group
                    .iter()
                    .map(|e| format!("{}: {}", e.formatted_date, format_grade(e.grade, "No Grade")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
            Some(result)
        })
        .collect();

    merged.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.path.cmp(&b.path)));
    merged
}

/// `classify_progress` followed by `merge_by_project` per category
pub fn merged_progress(records: &[RawProgress], rules: &RuleEngine) -> CategoryMap<Vec<ProgressEntry>> {
    classify_progress(records, rules).map(|_, entries| merge_by_project(&entries))
}

pub fn count_completed(entries: &[ProgressEntry]) -> usize {
    entries.iter().filter(|e| e.is_completed).count()
}
