// ⚙️ Configuration - TOML file with defaults and environment overrides
//
// Every field has a default, so an empty file (or no file) is a valid config.

use crate::category::Category;
use crate::charts::ViewportSettings;
use crate::error::{DashboardError, Result};
use crate::responsive::DEFAULT_DEBOUNCE_MS;
use crate::rules::{RuleEngine, DEFAULT_XP_OVERRIDE_PATH};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "LEARN_DASHBOARD_TOKEN";
pub const DOMAIN_ENV: &str = "LEARN_DASHBOARD_DOMAIN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub charts: ChartsConfig,
    pub classification: ClassificationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub domain: String,
    pub graphql_path: String,
    pub signin_path: String,
    /// Session JWT; usually supplied through the environment instead
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            domain: "learn.reboot01.com".to_string(),
            graphql_path: "/api/graphql-engine/v1/graphql".to_string(),
            signin_path: "/api/auth/signin".to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn graphql_endpoint(&self) -> String {
        format!("https://{}{}", self.domain, self.graphql_path)
    }

    pub fn signin_endpoint(&self) -> String {
        format!("https://{}{}", self.domain, self.signin_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub debounce_ms: u64,
    pub mobile_breakpoint: f64,
    pub fallback_width: f64,
    /// Container width assumed by static renders
    pub render_width: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        let viewport = ViewportSettings::default();
        ChartsConfig {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            mobile_breakpoint: viewport.mobile_breakpoint,
            fallback_width: viewport.fallback_width,
            render_width: 900.0,
        }
    }
}

impl ChartsConfig {
    pub fn viewport_settings(&self) -> ViewportSettings {
        ViewportSettings { mobile_breakpoint: self.mobile_breakpoint, fallback_width: self.fallback_width }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOverride {
    pub path: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Exact XP paths forced into a category
    pub xp_overrides: Vec<PathOverride>,
    /// Optional JSON file of extra rules, added to both engines
    pub rules_file: Option<PathBuf>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        ClassificationConfig {
            xp_overrides: vec![PathOverride {
                path: DEFAULT_XP_OVERRIDE_PATH.to_string(),
                category: Category::Module,
            }],
            rules_file: None,
        }
    }
}

impl ClassificationConfig {
    pub fn xp_rules(&self) -> Result<RuleEngine> {
        let overrides: Vec<(String, Category)> =
            self.xp_overrides.iter().map(|o| (o.path.clone(), o.category)).collect();
        self.with_extra_rules(RuleEngine::xp_with_overrides(&overrides))
    }

    pub fn progress_rules(&self) -> Result<RuleEngine> {
        self.with_extra_rules(RuleEngine::progress_defaults())
    }

    fn with_extra_rules(&self, mut engine: RuleEngine) -> Result<RuleEngine> {
        if let Some(path) = &self.rules_file {
            let extra = RuleEngine::from_file(path)?;
            for rule in extra.rules() {
                engine.add_rule(rule.clone());
            }
        }
        Ok(engine)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { bind: "127.0.0.1:3000".to_string() }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// File (when given) then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(std::env::var(TOKEN_ENV).ok(), std::env::var(DOMAIN_ENV).ok());
        Ok(config)
    }

    /// Non-empty values replace the configured token and domain
    pub fn apply_overrides(&mut self, token: Option<String>, domain: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            debug!("session token taken from {}", TOKEN_ENV);
            self.api.token = Some(token);
        }
        if let Some(domain) = domain.filter(|d| !d.trim().is_empty()) {
            debug!("API domain taken from {}", DOMAIN_ENV);
            self.api.domain = domain.trim().to_string();
        }
    }
}
