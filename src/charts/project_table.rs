// Tabbed project table, one table per category. Only the active tab's table
// is part of the rendered scene.

use super::{Chart, Viewport};
use crate::category::{Category, CategoryMap};
use crate::format::format_grade;
use crate::progress::ProgressEntry;
use crate::scene::{Action, Element};

/// Module first: it is the default tab
pub const TAB_ORDER: [Category; 3] = [Category::Module, Category::PiscineGo, Category::PiscineJs];
const COLUMNS: [&str; 7] = ["Project", "Date", "Grade", "Status", "Attempts", "Captain", "Auditors"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTable {
    entries: CategoryMap<Vec<ProgressEntry>>,
    active: Category,
}

impl ProjectTable {
    /// `entries` are merged rows per category (`merged_progress`)
    pub fn new(entries: CategoryMap<Vec<ProgressEntry>>) -> Self {
        ProjectTable { entries, active: TAB_ORDER[0] }
    }

    pub fn select_tab(&mut self, category: Category) {
        self.active = category;
    }

    pub fn active(&self) -> Category {
        self.active
    }

    fn tabs(&self) -> Element {
        let mut tabs = Element::new("div").class("progress-tabs");
        for category in TAB_ORDER {
            let class = if category == self.active { "progress-tab active" } else { "progress-tab" };
            tabs.push(
                Element::new("button")
                    .class(class)
                    .attr("data-category", category.key())
                    .on_click(Action::SelectProjectTab(category))
                    .text(category.label()),
            );
        }
        tabs
    }

    fn table(entries: &[ProgressEntry]) -> Element {
        let header = Element::new("thead").child(
            Element::new("tr").children(COLUMNS.iter().map(|c| Element::new("th").text(*c))),
        );
        let body = Element::new("tbody").children(entries.iter().map(row));
        Element::new("table").class("progress-data-table").child(header).child(body)
    }
}

fn row(entry: &ProgressEntry) -> Element {
    let status = if entry.is_completed {
        Element::new("span").class("status-completed").text("Completed")
    } else {
        Element::new("span").class("status-incomplete").text("In Progress")
    };

    let mut attempts = Element::new("span")
        .class("attempts-count")
        .text(entry.attempts.to_string());
    if let Some(trail) = &entry.attempt_dates {
        attempts = attempts.attr("title", trail.as_str());
    }

    let auditors = match entry.auditors.len() {
        0 => Element::new("span").text("-"),
        n => Element::new("span")
            .class("auditor-count")
            .attr("title", entry.auditor_list())
            .text(if n == 1 { "1 auditor".to_string() } else { format!("{} auditors", n) }),
    };

    let cell = |content: Element| Element::new("td").child(content);
    let text_cell = |text: String| Element::new("td").text(text);

    Element::new("tr")
        .child(text_cell(entry.project_name().to_string()))
        .child(text_cell(entry.formatted_date.clone()))
        .child(text_cell(format_grade(entry.grade, "-")))
        .child(cell(status))
        .child(cell(attempts))
        .child(text_cell(entry.captain_login.clone().unwrap_or_else(|| "-".to_string())))
        .child(cell(auditors))
}

impl Chart for ProjectTable {
    fn mount_id(&self) -> &'static str {
        "progress-graph"
    }

    fn render(&self, _viewport: &Viewport) -> Element {
        let entries = self.entries.get(self.active);
        let section = if entries.is_empty() {
            Element::new("p")
                .class("no-data")
                .text(format!("No {} projects found.", self.active.label()))
        } else {
            Self::table(entries)
        };

        Element::new("div")
            .class("progress-container")
            .child(self.tabs())
            .child(
                Element::new("div")
                    .class("progress-section")
                    .attr("data-category", self.active.key())
                    .child(section),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::merged_progress;
    use crate::records::{Auditor, ProgressGroup, RawProgress};
    use crate::rules::RuleEngine;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn raw(path: &str, day: u32, grade: Option<f64>, auditors: &[&str]) -> RawProgress {
        RawProgress {
            path: path.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 7, day, 9, 0, 0).unwrap()),
            updated_at: None,
            grade,
            group: Some(ProgressGroup {
                captain_login: if auditors.is_empty() { None } else { Some("lead".to_string()) },
                auditors: auditors.iter().map(|a| Auditor { auditor_login: a.to_string() }).collect(),
            }),
        }
    }

    fn table() -> ProjectTable {
        let rows = vec![
            raw("/bahrain/bh-module/forum", 3, None, &["ali"]),
            raw("/bahrain/bh-module/forum", 10, Some(1.5), &["ali", "sara"]),
            raw("/bahrain/bh-module/ascii-art", 12, None, &[]),
            raw("/bahrain/bh-piscine/quest-01", 1, Some(1.0), &["zed"]),
        ];
        ProjectTable::new(merged_progress(&rows, &RuleEngine::progress_defaults()))
    }

    fn cells(row: &Element) -> Vec<String> {
        row.find_by_tag("td").iter().map(|td| td.text_content()).collect()
    }

    #[test]
    fn test_module_tab_is_default_and_only_table_rendered() {
        let scene = table().render(&Viewport::new(800.0, 1280.0));

        let tabs: Vec<String> = scene.find_by_class("progress-tab").iter().map(|t| t.text_content()).collect();
        assert_eq!(tabs, vec!["Module", "Piscine Go", "Piscine JS"]);
        assert_eq!(scene.find_by_class("active")[0].text_content(), "Module");
        assert_eq!(scene.find_by_class("progress-data-table").len(), 1);
        assert_eq!(scene.find_by_class("progress-section")[0].get_attr("data-category"), Some("module"));
    }

    #[test]
    fn test_row_columns() {
        let scene = table().render(&Viewport::new(800.0, 1280.0));
        let rows = scene.find_by_tag("tr");
        // Header + two merged module projects, newest first
        assert_eq!(rows.len(), 3);

        assert_eq!(
            cells(rows[1]),
            vec!["ascii-art", "Jul 12, 2024", "-", "In Progress", "1", "-", "-"]
        );
        assert_eq!(
            cells(rows[2]),
            vec!["forum", "Jul 10, 2024", "1.50", "Completed", "2", "lead", "2 auditors"]
        );

        let attempts = rows[2].find_by_class("attempts-count")[0];
        assert_eq!(attempts.get_attr("title"), Some("Jul 10, 2024: 1.50\nJul 3, 2024: No Grade"));
        let auditors = rows[2].find_by_class("auditor-count")[0];
        assert_eq!(auditors.get_attr("title"), Some("ali, sara"));
    }

    #[test]
    fn test_switching_tabs() {
        let mut chart = table();
        chart.select_tab(Category::PiscineGo);
        let scene = chart.render(&Viewport::new(800.0, 1280.0));
        assert_eq!(scene.find_by_tag("tr").len(), 2);
        assert_eq!(scene.find_by_class("status-completed").len(), 1);

        chart.select_tab(Category::PiscineJs);
        let scene = chart.render(&Viewport::new(800.0, 1280.0));
        assert!(scene.find_by_class("progress-data-table").is_empty());
        assert_eq!(scene.find_by_class("no-data")[0].text_content(), "No Piscine JS projects found.");
    }
}
