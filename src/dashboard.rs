// 🧭 Dashboard - Fetch, classify, render and react to user actions
//
// All four queries must succeed before anything renders. Drill-down and tab
// switches work on the already-fetched view and never hit the network.

use crate::api::{unwrap_envelope, QueryExecutor, BASIC_INFO_QUERY, PROGRESS_QUERY, SKILLS_QUERY, XP_QUERY};
use crate::category::CategoryMap;
use crate::charts::{
    Chart, ProjectTable, RatioChart, SkillBarsChart, SkillHistoryChart, Viewport, XpTimelineChart,
};
use crate::config::ClassificationConfig;
use crate::error::Result;
use crate::format::format_xp;
use crate::mount::Document;
use crate::progress::{merged_progress, ProgressEntry};
use crate::records::{progress_records, skill_records, user_info, xp_transactions, UserInfo};
use crate::responsive::{Clock, ResponsiveController};
use crate::rules::RuleEngine;
use crate::scene::{Action, Element};
use crate::skills::{classify_skill_series, SkillSeries};
use crate::xp::{classify_xp_series, XpSeries};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

const PAGE_STYLE: &str = include_str!("../web/dashboard.css");
const HOST_SCRIPT: &str = include_str!("../web/host.js");

/// Chart sections in page order: (mount id, heading)
pub const SECTIONS: [(&str, &str); 5] = [
    ("auditRatio-graph", "Audit Ratio"),
    ("skills-graph", "Skills"),
    ("skill-detail-graph", "Skill Details"),
    ("xp-graph", "XP Progress"),
    ("progress-graph", "Projects"),
];

// ============================================================================
// RAW DATA
// ============================================================================

/// `data` payloads of the four queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDashboard {
    pub basic_info: Value,
    pub progress: Value,
    pub xp: Value,
    pub skills: Value,
}

const DATA_FILES: [&str; 4] = ["basic_info.json", "progress.json", "xp.json", "skills.json"];

/// Issue the four queries concurrently; the first failure fails the whole fetch
pub async fn fetch_all(executor: &dyn QueryExecutor) -> Result<RawDashboard> {
    let (basic_info, progress, xp, skills) = tokio::try_join!(
        executor.execute(BASIC_INFO_QUERY, None),
        executor.execute(PROGRESS_QUERY, None),
        executor.execute(XP_QUERY, None),
        executor.execute(SKILLS_QUERY, None),
    )?;
    info!("fetched dashboard data");
    Ok(RawDashboard { basic_info, progress, xp, skills })
}

impl RawDashboard {
    /// Load saved query results. Each file holds either the bare `data`
    /// payload or a full response envelope.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut payloads = Vec::with_capacity(DATA_FILES.len());
        for name in DATA_FILES {
            let content = fs::read_to_string(dir.join(name))?;
            let value: Value = serde_json::from_str(&content)?;
            let data = if value.get("data").is_some() || value.get("errors").is_some() {
                unwrap_envelope(value)?
            } else {
                value
            };
            payloads.push(data);
        }

        let mut payloads = payloads.into_iter();
        let mut next = || payloads.next().unwrap_or(Value::Null);
        Ok(RawDashboard { basic_info: next(), progress: next(), xp: next(), skills: next() })
    }

    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let payloads = [&self.basic_info, &self.progress, &self.xp, &self.skills];
        for (name, payload) in DATA_FILES.iter().zip(payloads) {
            fs::write(dir.join(name), serde_json::to_string_pretty(payload)?)?;
        }
        Ok(())
    }
}

// ============================================================================
// VIEW MODEL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub user: Option<UserInfo>,
    pub skills: SkillSeries,
    pub xp: XpSeries,
    pub progress: CategoryMap<Vec<ProgressEntry>>,
}

impl DashboardView {
    pub fn build(raw: &RawDashboard, xp_rules: &RuleEngine, progress_rules: &RuleEngine) -> Self {
        let user = user_info(&raw.basic_info);
        if user.is_none() {
            warn!("no user profile in basic info payload");
        }
        let view = DashboardView {
            user,
            skills: classify_skill_series(&skill_records(&raw.skills)),
            xp: classify_xp_series(&xp_transactions(&raw.xp), xp_rules),
            progress: merged_progress(&progress_records(&raw.progress), progress_rules),
        };
        debug!(
            "view built: {} skills, {} total xp",
            view.skills.latest.len(),
            view.xp.grand_total()
        );
        view
    }

    pub fn build_with(raw: &RawDashboard, classification: &ClassificationConfig) -> Result<Self> {
        Ok(Self::build(raw, &classification.xp_rules()?, &classification.progress_rules()?))
    }

    /// Configured ratio, or up/down when the backend did not supply one
    pub fn audit_ratio(&self) -> Option<f64> {
        let user = self.user.as_ref()?;
        user.audit_ratio.or_else(|| {
            if user.total_down > 0.0 {
                Some(user.total_up / user.total_down)
            } else {
                None
            }
        })
    }
}

// ============================================================================
// DASHBOARD COMPONENT
// ============================================================================

/// Replacement content for one mount
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub mount_id: String,
    pub content: Element,
    pub scroll_into_view: bool,
}

pub struct Dashboard {
    view: DashboardView,
    ratio: RatioChart,
    skill_bars: SkillBarsChart,
    skill_detail: SkillHistoryChart,
    xp: XpTimelineChart,
    projects: ProjectTable,
}

impl Dashboard {
    pub fn new(view: DashboardView) -> Self {
        let (up, down) = view.user.as_ref().map_or((0.0, 0.0), |u| (u.total_up, u.total_down));
        Dashboard {
            ratio: RatioChart::new(up, down),
            skill_bars: SkillBarsChart::new(view.skills.latest.clone()),
            skill_detail: SkillHistoryChart::new(),
            xp: XpTimelineChart::new(view.xp.clone()),
            projects: ProjectTable::new(view.progress.clone()),
            view,
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn charts(&self) -> [&dyn Chart; 5] {
        [&self.ratio, &self.skill_bars, &self.skill_detail, &self.xp, &self.projects]
    }

    fn chart(&self, mount_id: &str) -> Option<&dyn Chart> {
        self.charts().into_iter().find(|c| c.mount_id() == mount_id)
    }

    /// Render every chart into `document`; returns how many mounts were found
    pub fn render_all(&self, document: &mut Document) -> usize {
        self.charts().into_iter().filter(|chart| document.render_chart(*chart)).count()
    }

    /// React to a click. Retry and Logout belong to the host and yield no updates.
    pub fn handle(&mut self, action: &Action, document: &Document) -> Vec<Update> {
        let changed: Vec<(&'static str, bool)> = match action {
            Action::DrillDown { skill_id } => {
                let Some(summary) = self.view.skills.summary(skill_id).cloned() else {
                    warn!("drill-down on unknown skill {}", skill_id);
                    return Vec::new();
                };
                self.skill_bars.activate(skill_id);
                let history = self.view.skills.history.get(skill_id).cloned();
                self.skill_detail.show(summary, history);
                vec![(self.skill_bars.mount_id(), false), (self.skill_detail.mount_id(), true)]
            }
            Action::SelectXpTab(category) => {
                self.xp.select_tab(*category);
                vec![(self.xp.mount_id(), false)]
            }
            Action::SelectProjectTab(category) => {
                self.projects.select_tab(*category);
                vec![(self.projects.mount_id(), false)]
            }
            Action::Retry | Action::Logout => {
                debug!("{} is handled by the host", action.encode());
                return Vec::new();
            }
        };

        changed
            .into_iter()
            .filter_map(|(mount_id, scroll_into_view)| {
                let viewport = document.viewport_for(mount_id)?;
                let chart = self.chart(mount_id)?;
                Some(Update { mount_id: mount_id.to_string(), content: chart.render(&viewport), scroll_into_view })
            })
            .collect()
    }

    /// Full profile page with every chart rendered at `viewport`
    pub fn render_page(&self, viewport: &Viewport) -> Element {
        self.page(|chart| Some(chart.render(viewport)))
    }

    /// Full profile page reusing whatever each mount of `document` currently shows
    pub fn render_page_in(&self, document: &Document) -> Element {
        self.page(|chart| document.content(chart.mount_id()).cloned())
    }

    fn page<F: Fn(&dyn Chart) -> Option<Element>>(&self, mount_content: F) -> Element {
        let user = self.view.user.as_ref();
        let login = user.map_or("unknown", |u| u.login.as_str());

        let header = Element::new("header")
            .class("profile-header")
            .child(
                Element::new("div")
                    .child(Element::new("h1").text(format!("Welcome, {}", login)))
                    .child(
                        Element::new("p")
                            .class("full-name")
                            .text(user.map(|u| u.full_name()).unwrap_or_default()),
                    ),
            )
            .child(
                Element::new("button")
                    .class("logout-btn")
                    .on_click(Action::Logout)
                    .text("Logout"),
            );

        let ratio = self
            .view
            .audit_ratio()
            .map_or_else(|| "-".to_string(), |r| format!("{:.2}", r));
        let info = Element::new("section")
            .class("user-info")
            .child(Element::new("p").text(format!("Audit ratio: {}", ratio)))
            .child(Element::new("p").text(format!(
                "User ID: {}",
                user.map_or_else(|| "-".to_string(), |u| u.id.to_string())
            )))
            .child(Element::new("p").text(format!("Total XP: {}", format_xp(self.view.xp.grand_total()))));

        let mut page = Element::new("div").class("profile-page").child(header).child(info);
        for (mount_id, heading) in SECTIONS {
            let mut mount = Element::new("div").id(mount_id).class("chart-container");
            if let Some(content) = self.chart(mount_id).and_then(|chart| mount_content(chart)) {
                mount.push(content);
            }
            page.push(
                Element::new("section")
                    .class("chart-section")
                    .child(Element::new("h2").text(heading))
                    .child(mount),
            );
        }
        page
    }
}

// ============================================================================
// LIVE DASHBOARD
// ============================================================================

/// A dashboard bound to one measured document. Resize reports go through a
/// debounced `ResponsiveController`; only mounts whose width changed are redrawn.
pub struct LiveDashboard<C: Clock> {
    dashboard: Dashboard,
    document: Document,
    responsive: ResponsiveController<C>,
}

impl<C: Clock> LiveDashboard<C> {
    /// Watches every mount of `document` and renders all charts into it
    pub fn new(dashboard: Dashboard, mut document: Document, clock: C, debounce_ms: u64) -> Self {
        let mut responsive = ResponsiveController::new(clock, debounce_ms);
        let ids: Vec<String> = document.mount_ids().map(str::to_string).collect();
        for id in &ids {
            responsive.watch(id);
        }
        let rendered = dashboard.render_all(&mut document);
        debug!("live dashboard: {} of {} mounts rendered", rendered, ids.len());
        LiveDashboard { dashboard, document, responsive }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn render_page(&self) -> Element {
        self.dashboard.render_page_in(&self.document)
    }

    /// Run a click and keep the document in step with what the host will show
    pub fn handle(&mut self, action: &Action) -> Vec<Update> {
        let updates = self.dashboard.handle(action, &self.document);
        for update in &updates {
            let width = self.document.measure(&update.mount_id);
            self.document.replace(&update.mount_id, update.content.clone(), width);
        }
        updates
    }

    /// New measurements from the host; arms the debounce for every mount
    pub fn report_resize(&mut self, window_width: f64, container_widths: &[(&str, f64)]) {
        self.document.resize(window_width, container_widths);
        self.responsive.on_resize();
    }

    pub fn has_pending(&self) -> bool {
        self.responsive.has_pending()
    }

    /// Fire expired triggers; one update per redrawn mount
    pub fn poll(&mut self) -> Vec<Update> {
        let charts = self.dashboard.charts();
        let redrawn = self.responsive.poll(&mut self.document, &charts);
        redrawn
            .into_iter()
            .filter_map(|mount_id| {
                let content = self.document.content(&mount_id)?.clone();
                Some(Update { mount_id, content, scroll_into_view: false })
            })
            .collect()
    }
}

/// Full-page error state with user-initiated recovery
pub fn error_page(message: &str) -> Element {
    Element::new("div")
        .class("error-container")
        .child(Element::new("h2").text("Error Loading Profile"))
        .child(Element::new("p").class("error-message").text(message))
        .child(
            Element::new("div")
                .class("error-actions")
                .child(Element::new("button").class("retry-btn").on_click(Action::Retry).text("Retry"))
                .child(Element::new("button").class("logout-btn").on_click(Action::Logout).text("Logout")),
        )
}

/// Standalone HTML document around a rendered page
pub fn html_document(title: &str, body: &Element) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n<script>\n{}</script>\n</body>\n</html>\n",
        crate::scene::escape_xml(title),
        PAGE_STYLE,
        body.to_markup(),
        HOST_SCRIPT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::error::DashboardError;
    use crate::responsive::ManualClock;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_raw() -> RawDashboard {
        RawDashboard {
            basic_info: json!({"user": [{
                "id": 77, "login": "noor", "firstName": "Noor", "lastName": "Ali",
                "totalUp": 1_500_000.0, "totalDown": 1_000_000.0, "auditRatio": 1.5
            }]}),
            progress: json!({"user": [{"progresses": [
                {"path": "/bahrain/bh-module/forum", "createdAt": "2024-03-02T10:00:00Z", "grade": 1.2,
                 "group": {"captainLogin": "noor", "auditors": [{"auditorLogin": "sam"}]}},
                {"path": "/bahrain/bh-piscine/quest-01", "createdAt": "2024-01-10T10:00:00Z", "grade": null, "group": null}
            ]}]}),
            xp: json!({"user": [{"transactions": [
                {"amount": 1000, "createdAt": "2024-01-10T10:00:00Z", "path": "/bahrain/bh-piscine/quest-01"},
                {"amount": 25000, "createdAt": "2024-03-02T10:00:00Z", "path": "/bahrain/bh-module/forum"}
            ]}]}),
            skills: json!({"user": [{"skills": [
                {"amount": 10, "type": "skill_go", "createdAt": "2024-01-10T10:00:00Z"},
                {"amount": 25, "type": "skill_go", "createdAt": "2024-02-10T10:00:00Z"},
                {"amount": 15, "type": "skill_js", "createdAt": "2024-03-01T10:00:00Z"}
            ]}]}),
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardView::build(&sample_raw(), &RuleEngine::xp_defaults(), &RuleEngine::progress_defaults()))
    }

    fn document() -> Document {
        SECTIONS.iter().fold(Document::new(1280.0), |doc, (id, _)| doc.with_mount(id, 800.0))
    }

    struct FakeExecutor {
        fail_on: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryExecutor for FakeExecutor {
        async fn execute(&self, query: &str, _variables: Option<Value>) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.map_or(false, |q| q == query) {
                return Err(DashboardError::GraphQl("boom".to_string()));
            }
            let raw = sample_raw();
            Ok(match query {
                q if q == BASIC_INFO_QUERY => raw.basic_info,
                q if q == PROGRESS_QUERY => raw.progress,
                q if q == XP_QUERY => raw.xp,
                _ => raw.skills,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_all_collects_four_payloads() {
        let executor = FakeExecutor { fail_on: None, calls: AtomicUsize::new(0) };
        let raw = fetch_all(&executor).await.unwrap();
        assert_eq!(raw, sample_raw());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fetch_all_is_all_or_nothing() {
        let executor = FakeExecutor { fail_on: Some(XP_QUERY), calls: AtomicUsize::new(0) };
        let err = fetch_all(&executor).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_view_build() {
        let view = dashboard().view().clone();
        assert_eq!(view.user.as_ref().map(|u| u.login.as_str()), Some("noor"));
        assert_eq!(view.skills.latest[0].id, "skill_go");
        assert_eq!(view.xp.total(Category::Module), 25_000);
        assert_eq!(view.progress.piscine_go.len(), 1);
        assert_eq!(view.audit_ratio(), Some(1.5));
    }

    #[test]
    fn test_render_all_skips_missing_mounts() {
        let dash = dashboard();
        let mut doc = document();
        assert_eq!(dash.render_all(&mut doc), 5);

        let mut partial = Document::new(1280.0).with_mount("xp-graph", 800.0);
        assert_eq!(dash.render_all(&mut partial), 1);
    }

    #[test]
    fn test_drill_down_updates_bars_and_detail() {
        let mut dash = dashboard();
        let updates = dash.handle(&Action::DrillDown { skill_id: "skill_go".into() }, &document());

        let ids: Vec<(&str, bool)> = updates.iter().map(|u| (u.mount_id.as_str(), u.scroll_into_view)).collect();
        assert_eq!(ids, vec![("skills-graph", false), ("skill-detail-graph", true)]);
        assert_eq!(updates[0].content.find_by_class("selected").len(), 1);
        assert_eq!(
            updates[1].content.find_by_class("chart-title")[0].text_content(),
            "Skill Progress: Go"
        );
    }

    #[test]
    fn test_unknown_skill_and_host_actions_yield_nothing() {
        let mut dash = dashboard();
        assert!(dash.handle(&Action::DrillDown { skill_id: "skill_none".into() }, &document()).is_empty());
        assert!(dash.handle(&Action::Retry, &document()).is_empty());
        assert!(dash.handle(&Action::Logout, &document()).is_empty());
    }

    #[test]
    fn test_tab_actions_rerender_one_mount() {
        let mut dash = dashboard();
        let updates = dash.handle(&Action::SelectXpTab(Category::Module), &document());
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].content.get_attr("data-active"), Some("module"));

        let updates = dash.handle(&Action::SelectProjectTab(Category::PiscineGo), &document());
        assert_eq!(updates[0].mount_id, "progress-graph");
        assert_eq!(updates[0].content.find_by_class("status-incomplete").len(), 1);
    }

    #[test]
    fn test_render_page() {
        let page = dashboard().render_page(&Viewport::new(800.0, 1280.0));
        let text = page.text_content();

        assert!(text.contains("Welcome, noor"));
        assert!(text.contains("Noor Ali"));
        assert!(text.contains("Audit ratio: 1.50"));
        assert!(text.contains("User ID: 77"));
        assert!(text.contains("Total XP: 26.0KB"));
        for (id, _) in SECTIONS {
            assert!(page.find_by_id(id).is_some(), "missing mount {}", id);
        }
    }

    #[test]
    fn test_error_page_offers_retry_and_logout() {
        let page = error_page("GraphQL request failed: 500 Internal Server Error");
        let actions: Vec<Action> = page
            .find_by_tag("button")
            .iter()
            .filter_map(|b| b.click_action().cloned())
            .collect();
        assert_eq!(actions, vec![Action::Retry, Action::Logout]);
        assert!(page.text_content().starts_with("Error Loading Profile"));
    }

    #[test]
    fn test_data_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let raw = sample_raw();
        raw.write_dir(dir.path()).unwrap();
        assert_eq!(RawDashboard::from_dir(dir.path()).unwrap(), raw);

        // Envelopes are unwrapped on load
        fs::write(dir.path().join("xp.json"), json!({"data": raw.xp}).to_string()).unwrap();
        assert_eq!(RawDashboard::from_dir(dir.path()).unwrap().xp, raw.xp);
    }

    fn live(clock: &ManualClock) -> LiveDashboard<ManualClock> {
        LiveDashboard::new(dashboard(), document(), clock.clone(), 250)
    }

    #[test]
    fn test_live_dashboard_renders_every_mount() {
        let clock = ManualClock::new();
        let live = live(&clock);
        for (id, _) in SECTIONS {
            assert_eq!(live.document().mount(id).map(|m| m.render_count), Some(1), "mount {}", id);
        }
        let page = live.render_page();
        assert!(page.find_by_id("xp-graph").map_or(false, |m| !m.children.is_empty()));
    }

    #[test]
    fn test_resize_report_redraws_changed_mounts_after_quiet_period() {
        let clock = ManualClock::new();
        let mut live = live(&clock);

        live.report_resize(400.0, &[("auditRatio-graph", 360.0), ("xp-graph", 360.0)]);
        clock.advance(100);
        assert!(live.poll().is_empty());
        assert!(live.has_pending());

        clock.advance(150);
        let mut ids: Vec<String> = live.poll().into_iter().map(|u| u.mount_id).collect();
        ids.sort();
        assert_eq!(ids, vec!["auditRatio-graph".to_string(), "xp-graph".to_string()]);
        assert!(!live.has_pending());

        // Window under the breakpoint: the ratio legend switches to its mobile form
        let legend = live.document().content("auditRatio-graph").map(|c| c.text_content()).unwrap_or_default();
        assert!(legend.contains("Given: "), "{}", legend);
        assert_eq!(live.document().mount("skills-graph").map(|m| m.render_count), Some(1));
    }

    #[test]
    fn test_resize_burst_and_unchanged_widths() {
        let clock = ManualClock::new();
        let mut live = live(&clock);

        for width in [700.0, 650.0, 600.0] {
            live.report_resize(1000.0, &[("skills-graph", width)]);
            clock.advance(100);
            assert!(live.poll().is_empty());
        }
        clock.advance(250);
        let updates = live.poll();
        assert_eq!(updates.len(), 1);
        assert_eq!(live.document().mount("skills-graph").and_then(|m| m.rendered_width), Some(600.0));

        live.report_resize(1000.0, &[("skills-graph", 600.0)]);
        clock.advance(250);
        assert!(live.poll().is_empty());
    }

    #[test]
    fn test_live_handle_keeps_document_in_step() {
        let clock = ManualClock::new();
        let mut live = live(&clock);
        let updates = live.handle(&Action::SelectXpTab(Category::Module));
        assert_eq!(updates.len(), 1);
        assert_eq!(
            live.document().content("xp-graph").and_then(|c| c.get_attr("data-active")),
            Some("module")
        );
        assert_eq!(live.document().mount("xp-graph").map(|m| m.render_count), Some(2));
    }

    #[test]
    fn test_html_document_embeds_markup() {
        let html = html_document("Profile <noor>", &error_page("x"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Profile &lt;noor&gt;</title>"));
        assert!(html.contains("data-action=\"retry\""));
    }
}
