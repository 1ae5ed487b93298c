// Learn Dashboard - Core Library
// Classification, layout and chart rendering pipeline shared by the CLI, TUI and web server

pub mod error;
pub mod category;
pub mod format;
pub mod records;        // Raw GraphQL records + lenient extraction
pub mod rules;          // Path classification rules
pub mod skills;         // Skill series
pub mod xp;             // XP series, date buckets
pub mod progress;       // Project progress + merge
pub mod scale;          // Scales, date/value axes
pub mod scene;          // Declarative element tree
pub mod charts;         // Chart components
pub mod mount;          // Mount points
pub mod responsive;     // Debounced resize handling
pub mod auth;
pub mod api;
pub mod config;
pub mod dashboard;

// Re-export commonly used types
pub use error::{DashboardError, Result};
pub use category::{Category, CategoryMap};
pub use records::{RawTransaction, RawSkill, RawProgress, UserInfo};
pub use rules::{CategoryRule, MatchKind, RuleEngine};
pub use skills::{classify_skill_series, SkillHistory, SkillPoint, SkillSeries, SkillSummary};
pub use xp::{classify_xp_series, DateBucket, XpSeries};
pub use progress::{classify_progress, merge_by_project, merged_progress, ProgressEntry};
pub use scale::{
    date_axis_layout, linear_scale, value_axis_layout,
    DateAxis, LayoutRegime, ValueAxis,
};
pub use scene::{Action, Element, HoverEffect, Interaction};
pub use charts::{
    Chart, Viewport,
    ProjectTable, RatioChart, SkillBarsChart, SkillHistoryChart, XpTimelineChart,
};
pub use mount::Document;
pub use responsive::{debounce, Clock, Debounced, ManualClock, ResponsiveController, SystemClock};
pub use auth::{AuthProvider, TokenAuth};
pub use api::{GraphQlClient, QueryExecutor};
pub use config::DashboardConfig;
pub use dashboard::{
    error_page, fetch_all, html_document, Dashboard, DashboardView, LiveDashboard, RawDashboard, Update,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
