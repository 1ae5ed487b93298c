// 📈 Skill Series - Per-skill level history
//
// Skill transactions are cumulative levels, not deltas: the current value of a
// skill is the amount of its chronologically latest record.

use crate::format::{format_short_date, skill_display_name};
use crate::records::RawSkill;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current level of one skill (ranked bar chart row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSummary {
    pub id: String,
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPoint {
    /// Human-formatted date (`Jan 5, 2024`)
    pub date: String,
    pub value: i64,
    /// Exact instant, used for axis placement
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillHistory {
    pub name: String,
    /// Ascending by date
    pub data: Vec<SkillPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSeries {
    /// Descending by value
    pub latest: Vec<SkillSummary>,
    pub history: BTreeMap<String, SkillHistory>,
}

impl SkillSeries {
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn summary(&self, id: &str) -> Option<&SkillSummary> {
        self.latest.iter().find(|s| s.id == id)
    }
}

/// Group by skill type, sort each group by time, take the last amount as the
/// current level. Empty input gives an empty series.
pub fn classify_skill_series(records: &[RawSkill]) -> SkillSeries {
    let mut groups: BTreeMap<&str, Vec<&RawSkill>> = BTreeMap::new();
    for record in records {
        groups.entry(record.kind.as_str()).or_default().push(record);
    }

    let mut series = SkillSeries::default();

    for (skill_type, mut group) in groups {
        group.sort_by_key(|r| r.created_at);

        let name = skill_display_name(skill_type);
        let data: Vec<SkillPoint> = group
            .iter()
            .map(|r| SkillPoint {
                date: format_short_date(&r.created_at),
                value: r.amount,
                timestamp: r.created_at,
            })
            .collect();

        if let Some(last) = data.last() {
            series.latest.push(SkillSummary {
                id: skill_type.to_string(),
                name: name.clone(),
                value: last.value,
            });
        }

        series.history.insert(skill_type.to_string(), SkillHistory { name, data });
    }

    // Ties keep id order from the BTreeMap walk
    series.latest.sort_by(|a, b| b.value.cmp(&a.value));

    debug!("classified {} skill records into {} skills", records.len(), series.latest.len());
    series
}
