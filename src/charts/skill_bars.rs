// Ranked horizontal bars, one per skill. Clicking a bar drills down into
// its history.

use super::{placeholder, svg_root, translate, Chart, Margin, Viewport};
use crate::format::fmt_num;
use crate::scale::linear_scale;
use crate::scene::{Action, Element, HoverEffect};
use crate::skills::SkillSummary;

const MARGIN: Margin = Margin { top: 20.0, right: 30.0, bottom: 40.0, left: 150.0 };
const ROW_HEIGHT: f64 = 35.0;
const MIN_HEIGHT: f64 = 300.0;
const BAR_GAP: f64 = 10.0;
const FADED_OPACITY: &str = "0.6";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillBarsChart {
    skills: Vec<SkillSummary>,
    selected: Option<String>,
}

impl SkillBarsChart {
    /// Bars are drawn highest value first, ties broken by skill id
    pub fn new(mut skills: Vec<SkillSummary>) -> Self {
        skills.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.id.cmp(&b.id)));
        SkillBarsChart { skills, selected: None }
    }

    /// Mark a skill as the active drill-down target. Unknown ids are ignored.
    pub fn activate(&mut self, skill_id: &str) -> bool {
        if self.skills.iter().any(|s| s.id == skill_id) {
            self.selected = Some(skill_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

fn bar_color(index: usize, count: usize) -> String {
    let hue = (index * 220 / count.max(1)) % 360;
    format!("hsl({}, 70%, 60%)", hue)
}

impl Chart for SkillBarsChart {
    fn mount_id(&self) -> &'static str {
        "skills-graph"
    }

    fn render(&self, viewport: &Viewport) -> Element {
        if self.skills.is_empty() {
            return placeholder("No skills data available");
        }

        let n = self.skills.len();
        let width = viewport.width();
        let inner_width = MARGIN.inner_width(width);
        let inner_height = MIN_HEIGHT.max(n as f64 * ROW_HEIGHT);
        let row = inner_height / n as f64;
        let bar_height = row - BAR_GAP;
        let max_value = self.skills.iter().map(|s| s.value).max().unwrap_or(0).max(1) as f64;

        let mut plot = Element::new("g").attr("transform", translate(MARGIN.left, MARGIN.top));

        for (i, skill) in self.skills.iter().enumerate() {
            let bar_y = i as f64 * row + BAR_GAP / 2.0;
            let bar_width = linear_scale(skill.value.max(0) as f64, 0.0, max_value, inner_width);
            let is_selected = self.selected.as_deref() == Some(skill.id.as_str());

            let mut bar = Element::new("rect")
                .class("bar")
                .attr("x", "0")
                .num("y", bar_y)
                .num("width", bar_width)
                .num("height", bar_height)
                .attr("fill", bar_color(i, n))
                .attr("rx", "3");
            if is_selected {
                bar = bar.attr("stroke", "#333").attr("stroke-width", "2");
            } else if self.selected.is_some() {
                bar = bar.attr("opacity", FADED_OPACITY);
            }

            let idle_opacity = if self.selected.is_some() && !is_selected { FADED_OPACITY } else { "1" };
            let group_class = if is_selected { "skill-bar selected" } else { "skill-bar" };

            plot.push(
                Element::new("g")
                    .class(group_class)
                    .attr("data-skill-id", skill.id.as_str())
                    .attr("cursor", "pointer")
                    .on_click(Action::DrillDown { skill_id: skill.id.clone() })
                    .on_hover(HoverEffect::SetAttr {
                        name: "opacity".into(),
                        idle: idle_opacity.into(),
                        hovered: "0.8".into(),
                    })
                    .child(
                        Element::new("rect")
                            .class("bar-background")
                            .attr("x", "0")
                            .num("y", bar_y)
                            .num("width", inner_width)
                            .num("height", bar_height)
                            .attr("fill", "#f0f0f0")
                            .attr("rx", "3"),
                    )
                    .child(bar)
                    .child(
                        Element::new("text")
                            .class("bar-name")
                            .attr("x", "-10")
                            .num("y", bar_y + bar_height / 2.0)
                            .attr("dy", "0.35em")
                            .attr("text-anchor", "end")
                            .text(skill.name.clone()),
                    )
                    .child(
                        Element::new("text")
                            .class("bar-value")
                            .num("x", bar_width + 5.0)
                            .num("y", bar_y + bar_height / 2.0)
                            .attr("dy", "0.35em")
                            .text(fmt_num(skill.value as f64)),
                    ),
            );
        }

        Element::new("div")
            .class("skills-chart")
            .child(svg_root(width, inner_height + MARGIN.top + MARGIN.bottom).child(plot))
    }
}
