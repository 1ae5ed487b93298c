// 🏷️ Classification Rules - Rules as Data
// Ordered path-pattern rules that assign a transaction or progress row to a Category.
// Exact-path overrides carry the highest priority so they are evaluated first.

use crate::category::Category;
use crate::error::{DashboardError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Path that the XP feed files under piscine-js but that belongs to Module.
/// Data correction for one record, kept removable through configuration.
pub const DEFAULT_XP_OVERRIDE_PATH: &str = "/bahrain/bh-module/piscine-js";

const OVERRIDE_PRIORITY: i32 = 100;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Path contains the pattern
    Contains,
    /// Path equals the pattern
    Exact,
    /// Pattern with `*` wildcards, anchored at both ends
    Wildcard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Rule ID for tracking
    pub id: String,

    pub pattern: String,

    #[serde(default = "default_match_kind")]
    pub match_kind: MatchKind,

    pub category: Category,

    /// Priority (higher = applied first)
    #[serde(default)]
    pub priority: i32,

    pub description: Option<String>,
}

fn default_match_kind() -> MatchKind {
    MatchKind::Contains
}

impl CategoryRule {
    pub fn contains(id: &str, pattern: &str, category: Category, priority: i32) -> Self {
        CategoryRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            match_kind: MatchKind::Contains,
            category,
            priority,
            description: None,
        }
    }

    /// Exact-path override, evaluated before every general rule
    pub fn exact_override(path: &str, category: Category) -> Self {
        CategoryRule {
            id: format!("override:{}", path),
            pattern: path.to_string(),
            match_kind: MatchKind::Exact,
            category,
            priority: OVERRIDE_PRIORITY,
            description: Some("exact-path data correction".to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.match_kind {
            MatchKind::Contains => path.contains(&self.pattern),
            MatchKind::Exact => path == self.pattern,
            MatchKind::Wildcard => wildcard_match(&self.pattern, path),
        }
    }
}

fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || !text.ends_with(last) {
        return false;
    }
    if first.len() + last.len() > text.len() {
        return false;
    }

    // Middle parts must appear in order between the anchors
    let mut current_pos = first.len();
    let end_limit = text.len() - last.len();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match text[current_pos..end_limit].find(part) {
            Some(pos) => current_pos += pos + part.len(),
            None => return false,
        }
    }

    true
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<CategoryRule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Create engine from a list of rules
    pub fn from_rules(mut rules: Vec<CategoryRule>) -> Self {
        // Stable sort keeps declaration order among equal priorities
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RuleEngine { rules }
    }

    /// Load rules from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let rules: Vec<CategoryRule> = serde_json::from_str(&content).map_err(|e| {
            DashboardError::Config(format!("Failed to parse rules file {:?}: {}", path.as_ref(), e))
        })?;
        Ok(RuleEngine::from_rules(rules))
    }

    /// General substring rules shared by XP and progress classification
    pub fn general_rules() -> Vec<CategoryRule> {
        vec![
            CategoryRule::contains("piscine-go", "bh-piscine", Category::PiscineGo, 10),
            CategoryRule::contains("piscine-js", "piscine-js", Category::PiscineJs, 10),
            CategoryRule::contains("module", "bh-module", Category::Module, 5),
        ]
    }

    /// Progress rows: general rules only
    pub fn progress_defaults() -> Self {
        RuleEngine::from_rules(Self::general_rules())
    }

    /// XP rows: general rules plus the given exact-path overrides
    pub fn xp_with_overrides(overrides: &[(String, Category)]) -> Self {
        let mut rules = Self::general_rules();
        rules.extend(
            overrides
                .iter()
                .map(|(path, category)| CategoryRule::exact_override(path, *category)),
        );
        RuleEngine::from_rules(rules)
    }

    /// XP rows with the built-in override
    pub fn xp_defaults() -> Self {
        Self::xp_with_overrides(&[(DEFAULT_XP_OVERRIDE_PATH.to_string(), Category::Module)])
    }

    /// Add a single rule
    pub fn add_rule(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// First matching rule wins; `None` when nothing matches
    pub fn classify(&self, path: &str) -> Option<Category> {
        let hit = self.rules.iter().find(|rule| rule.matches(path));
        if let Some(rule) = hit {
            debug!("path {} classified as {} by rule {}", path, rule.category.key(), rule.id);
        }
        hit.map(|rule| rule.category)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_rules() {
        let engine = RuleEngine::progress_defaults();

        assert_eq!(engine.classify("/bahrain/bh-piscine/checkpoint-01"), Some(Category::PiscineGo));
        assert_eq!(engine.classify("/bahrain/bh-module/piscine-js/quest-03"), Some(Category::PiscineJs));
        assert_eq!(engine.classify("/bahrain/bh-module/groupie-tracker"), Some(Category::Module));
        assert_eq!(engine.classify("/bahrain/onboarding/games"), None);
    }

    #[test]
    fn test_override_evaluated_before_general_rules() {
        let engine = RuleEngine::xp_defaults();

        assert_eq!(engine.classify(DEFAULT_XP_OVERRIDE_PATH), Some(Category::Module));
        // Only the exact path is reassigned
        assert_eq!(
            engine.classify("/bahrain/bh-module/piscine-js/quest-01"),
            Some(Category::PiscineJs)
        );
    }

    #[test]
    fn test_progress_engine_has_no_override() {
        let engine = RuleEngine::progress_defaults();
        assert_eq!(engine.classify(DEFAULT_XP_OVERRIDE_PATH), Some(Category::PiscineJs));
    }

    #[test]
    fn test_overrides_are_removable() {
        let engine = RuleEngine::xp_with_overrides(&[]);
        assert_eq!(engine.rule_count(), 3);
        assert_eq!(engine.classify(DEFAULT_XP_OVERRIDE_PATH), Some(Category::PiscineJs));
    }

    #[test]
    fn test_rule_priority() {
        let mut engine = RuleEngine::new();
        engine.add_rule(CategoryRule::contains("low", "bh-", Category::Module, 1));
        engine.add_rule(CategoryRule::contains("high", "bh-piscine", Category::PiscineGo, 50));

        assert_eq!(engine.rules()[0].id, "high");
        assert_eq!(engine.classify("/x/bh-piscine/a"), Some(Category::PiscineGo));
        assert_eq!(engine.classify("/x/bh-module/a"), Some(Category::Module));
    }

    #[test]
    fn test_wildcard_pattern() {
        let rule = CategoryRule {
            id: "quests".to_string(),
            pattern: "/bahrain/*/quest-*".to_string(),
            match_kind: MatchKind::Wildcard,
            category: Category::PiscineJs,
            priority: 0,
            description: None,
        };

        assert!(rule.matches("/bahrain/bh-piscine/quest-02"));
        assert!(!rule.matches("/bahrain/bh-piscine/raid-02"));
        assert!(!rule.matches("/madrid/bh-piscine/quest-02"));
    }

    #[test]
    fn test_rules_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(
            &path,
            r#"[
                {"id": "go", "pattern": "bh-piscine", "category": "piscineGo", "priority": 1},
                {"id": "fix", "pattern": "/a/bh-piscine/x", "match_kind": "exact", "category": "module", "priority": 9}
            ]"#,
        )
        .unwrap();

        let engine = RuleEngine::from_file(&path).unwrap();
        assert_eq!(engine.rule_count(), 2);
        assert_eq!(engine.classify("/a/bh-piscine/x"), Some(Category::Module));
        assert_eq!(engine.classify("/a/bh-piscine/y"), Some(Category::PiscineGo));
    }
}
