// Drill-down detail: level history of one skill over time.
//
// The line shape follows the date-axis regime: a flat line for a single
// record, a staircase for same-day level ups, a polyline otherwise.

use super::{placeholder, svg_root, tooltip, translate, x_tick, y_gridline, Chart, Margin, Viewport};
use crate::format::{fmt_num, format_axis_date};
use crate::scale::{date_axis_layout, value_axis_layout, DateAxis, LayoutRegime, ValueAxis};
use crate::scene::{Element, HoverEffect};
use crate::skills::{SkillHistory, SkillSummary};

const MARGIN: Margin = Margin { top: 30.0, right: 30.0, bottom: 60.0, left: 60.0 };
const HEIGHT: f64 = 300.0;
const LINE_COLOR: &str = "#4285f4";

#[derive(Debug, Clone, PartialEq)]
struct Selection {
    summary: SkillSummary,
    history: Option<SkillHistory>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillHistoryChart {
    selection: Option<Selection>,
}

impl SkillHistoryChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, summary: SkillSummary, history: Option<SkillHistory>) {
        self.selection = Some(Selection { summary, history });
    }

    pub fn skill_id(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.summary.id.as_str())
    }

    fn no_history(summary: &SkillSummary) -> Element {
        Element::new("div")
            .class("skill-details")
            .child(Element::new("h3").text(format!("Skill Details: {}", summary.name)))
            .child(Element::new("p").text(format!("Current value: {}", summary.value)))
            .child(Element::new("p").class("no-data").text("No historical data available"))
    }
}

impl Chart for SkillHistoryChart {
    fn mount_id(&self) -> &'static str {
        "skill-detail-graph"
    }

    fn render(&self, viewport: &Viewport) -> Element {
        let Some(selection) = &self.selection else {
            return placeholder("Click a skill bar to see its progress");
        };
        let Some(history) = selection.history.as_ref().filter(|h| !h.data.is_empty()) else {
            return Self::no_history(&selection.summary);
        };

        let width = viewport.width();
        let inner_width = MARGIN.inner_width(width);
        let inner_height = HEIGHT - MARGIN.top - MARGIN.bottom;

        let dates: Vec<_> = history.data.iter().map(|p| p.timestamp).collect();
        let values: Vec<f64> = history.data.iter().map(|p| p.value as f64).collect();
        let (Some(x_axis), Some(y_axis)) = (
            date_axis_layout(&dates, inner_width),
            value_axis_layout(&values, inner_height),
        ) else {
            return Self::no_history(&selection.summary);
        };

        let count = history.data.len();
        let points: Vec<(f64, f64)> = history
            .data
            .iter()
            .enumerate()
            .map(|(i, p)| (x_axis.point_x(i, count, &p.timestamp), y_axis.y(p.value as f64)))
            .collect();

        let mut plot = Element::new("g").attr("transform", translate(MARGIN.left, MARGIN.top));
        plot.push(
            Element::new("text")
                .class("chart-title")
                .num("x", inner_width / 2.0)
                .attr("y", "-10")
                .attr("text-anchor", "middle")
                .attr("font-weight", "bold")
                .text(format!("Skill Progress: {}", history.name)),
        );
        plot.push(axes(&x_axis, &y_axis, inner_width, inner_height));
        plot.push(
            Element::new("path")
                .class("skill-line")
                .attr("d", line_path(x_axis.regime, &points, inner_width, inner_height))
                .attr("fill", "none")
                .attr("stroke", LINE_COLOR)
                .attr("stroke-width", "2"),
        );

        for (i, ((x, y), point)) in points.iter().zip(&history.data).enumerate() {
            let tip_id = format!("skill-tip-{}", i);
            let label = match x_axis.regime {
                LayoutRegime::SameDay => format!("Milestone {}: {}", i + 1, point.value),
                _ => format!("Value: {}", point.value),
            };
            plot.push(
                Element::new("circle")
                    .class("milestone")
                    .num("cx", *x)
                    .num("cy", *y)
                    .attr("r", "5")
                    .attr("fill", LINE_COLOR)
                    .on_hover(HoverEffect::SetAttr { name: "r".into(), idle: "5".into(), hovered: "7".into() })
                    .on_hover(HoverEffect::Reveal { target: tip_id.clone() }),
            );
            plot.push(tooltip(&tip_id, x - 50.0, y - 40.0, 100.0, 30.0, &[label]));
        }

        if let Some(caption) = caption(&x_axis, history) {
            let caption_y = match x_axis.regime {
                LayoutRegime::SinglePoint => inner_height / 2.0 - 20.0,
                _ => 20.0,
            };
            plot.push(
                Element::new("text")
                    .class("regime-caption")
                    .num("x", inner_width / 2.0)
                    .num("y", caption_y)
                    .attr("text-anchor", "middle")
                    .attr("font-style", "italic")
                    .text(caption),
            );
        }

        Element::new("div")
            .class("skill-detail-chart")
            .child(svg_root(width, HEIGHT).child(plot))
    }
}

fn axes(x_axis: &DateAxis, y_axis: &ValueAxis, width: f64, height: f64) -> Element {
    let mut group = Element::new("g").class("axes");
    for tick in &y_axis.ticks {
        group.push(y_gridline(tick.y, width, fmt_num(tick.value.round())));
    }
    for tick in &x_axis.ticks {
        group.push(x_tick(x_axis.x(tick), height, format_axis_date(tick)));
    }
    group
        .child(
            Element::new("text")
                .class("axis-label")
                .num("x", width / 2.0)
                .num("y", height + 50.0)
                .attr("text-anchor", "middle")
                .text("Date"),
        )
        .child(
            Element::new("text")
                .class("axis-label")
                .attr("transform", "rotate(-90)")
                .num("x", -height / 2.0)
                .attr("y", "-45")
                .attr("text-anchor", "middle")
                .text("Skill Level"),
        )
}

fn line_path(regime: LayoutRegime, points: &[(f64, f64)], width: f64, height: f64) -> String {
    let Some(&(first_x, first_y)) = points.first() else {
        return String::new();
    };
    match regime {
        LayoutRegime::SinglePoint => {
            format!("M 0 {} L {} {}", fmt_num(first_y), fmt_num(width), fmt_num(first_y))
        }
        LayoutRegime::SameDay => {
            // Staircase from the baseline, one riser per level up
            let mut d = format!("M 0 {}", fmt_num(height));
            let mut current = height;
            for &(x, y) in points {
                d.push_str(&format!(" L {} {} L {} {}", fmt_num(x), fmt_num(current), fmt_num(x), fmt_num(y)));
                current = y;
            }
            d.push_str(&format!(" L {} {}", fmt_num(width), fmt_num(current)));
            d
        }
        LayoutRegime::General => {
            let mut d = format!("M {} {}", fmt_num(first_x), fmt_num(first_y));
            for &(x, y) in &points[1..] {
                d.push_str(&format!(" L {} {}", fmt_num(x), fmt_num(y)));
            }
            d
        }
    }
}

fn caption(x_axis: &DateAxis, history: &SkillHistory) -> Option<String> {
    match x_axis.regime {
        LayoutRegime::SinglePoint => Some("Constant skill level since acquisition".to_string()),
        LayoutRegime::SameDay => history
            .data
            .first()
            .map(|p| format!("Multiple level ups on {}", p.date)),
        LayoutRegime::General => None,
    }
}
