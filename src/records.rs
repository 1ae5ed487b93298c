// 📥 Raw Records - What the GraphQL layer hands us
//
// Every query result has the shape `{ "user": [ { <field>: [...] } ] }`.
// Extraction is lenient: a missing level yields an empty list and a record
// that fails to decode is skipped, never an error.

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// CORE TYPES
// ============================================================================

/// XP transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub path: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Skill transaction; `kind` is the skill id (`skill_js`) and `amount` the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSkill {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auditor {
    pub auditor_login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressGroup {
    pub captain_login: Option<String>,
    #[serde(default)]
    pub auditors: Vec<Auditor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgress {
    pub path: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub group: Option<ProgressGroup>,
}

impl RawProgress {
    /// Attempt date: creation time, falling back to last update
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.updated_at)
    }
}

/// Profile attributes from the basic-info query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub total_up: f64,
    #[serde(default)]
    pub total_down: f64,
    #[serde(default)]
    pub audit_ratio: Option<f64>,
}

impl UserInfo {
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

fn first_user(data: &Value) -> Option<&Value> {
    match data.get("user")? {
        Value::Array(users) => users.first(),
        // Some endpoints return the object directly
        obj @ Value::Object(_) => Some(obj),
        _ => None,
    }
}

/// Decode `data.user[0].<field>[*]`, skipping records that do not decode
pub fn nested_records<T: DeserializeOwned>(data: &Value, field: &str) -> Vec<T> {
    let items = match first_user(data).and_then(|u| u.get(field)).and_then(Value::as_array) {
        Some(items) => items,
        None => {
            warn!("payload has no user[0].{} array, treating as empty", field);
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("skipping malformed {} record #{}: {}", field, i, e);
                None
            }
        })
        .collect()
}

pub fn xp_transactions(data: &Value) -> Vec<RawTransaction> {
    nested_records(data, "transactions")
}

pub fn skill_records(data: &Value) -> Vec<RawSkill> {
    nested_records(data, "skills")
}

pub fn progress_records(data: &Value) -> Vec<RawProgress> {
    nested_records(data, "progresses")
}

pub fn user_info(data: &Value) -> Option<UserInfo> {
    let user = first_user(data)?;
    match serde_json::from_value::<UserInfo>(user.clone()) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("malformed user info: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xp_transactions_decode() {
        let data = json!({"user": [{"transactions": [
            {"amount": 400, "createdAt": "2024-01-05T10:00:00+00:00", "path": "/bahrain/bh-piscine/a"},
            {"amount": 900, "createdAt": "2024-01-06T10:00:00.123456+00:00", "path": "/bahrain/bh-module/b"}
        ]}]});

        let txs = xp_transactions(&data);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, 400);
        assert_eq!(txs[1].path, "/bahrain/bh-module/b");
        assert_eq!(txs[0].kind, "");
    }

    #[test]
    fn test_missing_levels_yield_empty() {
        assert!(xp_transactions(&json!(null)).is_empty());
        assert!(xp_transactions(&json!({})).is_empty());
        assert!(xp_transactions(&json!({"user": []})).is_empty());
        assert!(skill_records(&json!({"user": [{}]})).is_empty());
        assert!(progress_records(&json!({"user": [{"progresses": null}]})).is_empty());
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let data = json!({"user": [{"skills": [
            {"type": "skill_go", "amount": 10, "createdAt": "2024-01-05T10:00:00Z"},
            {"type": "skill_js", "amount": "ten"},
            {"type": "skill_js", "amount": 5, "createdAt": "2024-02-05T10:00:00Z"}
        ]}]});

        let skills = skill_records(&data);
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[1].kind, "skill_js");
    }

    #[test]
    fn test_progress_with_group() {
        let data = json!({"user": [{"progresses": [
            {"path": "/bahrain/bh-module/ascii-art", "createdAt": "2024-03-01T08:00:00Z", "grade": 1.2,
             "group": {"captainLogin": "ali", "auditors": [{"auditorLogin": "sara"}]}},
            {"path": "/bahrain/bh-module/ascii-art", "updatedAt": "2024-03-02T08:00:00Z", "grade": null, "group": null}
        ]}]});

        let rows = progress_records(&data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group.as_ref().unwrap().auditors[0].auditor_login, "sara");
        assert_eq!(rows[1].grade, None);
        assert!(rows[1].date().is_some());
    }

    #[test]
    fn test_user_info() {
        let data = json!({"user": [{"id": 42, "login": "jdoe", "firstName": "Jane", "lastName": "Doe",
            "totalUp": 1500000, "totalDown": 1000000, "auditRatio": 1.5}]});

        let info = user_info(&data).unwrap();
        assert_eq!(info.login, "jdoe");
        assert_eq!(info.full_name(), "Jane Doe");
        assert_eq!(info.total_up, 1_500_000.0);
        assert!(user_info(&json!({"user": []})).is_none());
    }
}
