// Cumulative XP over time with one tab per category

use super::{placeholder, svg_root, tooltip, translate, x_tick, y_gridline, Chart, Margin, Viewport};
use crate::category::Category;
use crate::format::{fmt_num, format_axis_date, format_xp};
use crate::scale::{date_axis_layout, value_axis_layout};
use crate::scene::{Action, Element, HoverEffect};
use crate::xp::XpSeries;
use chrono::{TimeZone, Utc};

const MARGIN: Margin = Margin { top: 30.0, right: 30.0, bottom: 50.0, left: 60.0 };
const HEIGHT: f64 = 300.0;
const ACTIVE_TAB: &str = "#4CAF50";
const INACTIVE_TAB: &str = "#f0f0f0";
const AREA_FILL: &str = "rgba(76, 175, 80, 0.2)";

#[derive(Debug, Clone, PartialEq)]
pub struct XpTimelineChart {
    series: XpSeries,
    active: Category,
}

impl XpTimelineChart {
    pub fn new(series: XpSeries) -> Self {
        XpTimelineChart { series, active: Category::ALL[0] }
    }

    /// Switching tabs discards nothing but the active category; the next
    /// render draws the new category from scratch.
    pub fn select_tab(&mut self, category: Category) {
        self.active = category;
    }

    pub fn active(&self) -> Category {
        self.active
    }

    fn tabs(&self, viewport: &Viewport) -> Element {
        let mut tabs = Element::new("div").class("xp-tabs");
        for category in Category::ALL {
            let is_active = category == self.active;
            let label = if viewport.is_mobile() {
                category.label().to_string()
            } else {
                format!("{} ({})", category.label(), format_xp(self.series.total(category)))
            };
            tabs.push(
                Element::new("button")
                    .class(if is_active { "xp-tab active" } else { "xp-tab" })
                    .attr("data-category", category.key())
                    .attr(
                        "style",
                        format!(
                            "background-color: {}; color: {}",
                            if is_active { ACTIVE_TAB } else { INACTIVE_TAB },
                            if is_active { "white" } else { "black" }
                        ),
                    )
                    .on_click(Action::SelectXpTab(category))
                    .text(label),
            );
        }
        tabs
    }

    fn plot(&self, viewport: &Viewport) -> Option<Element> {
        let buckets = self.series.buckets(self.active);
        let width = viewport.width();
        let inner_width = MARGIN.inner_width(width);
        let inner_height = HEIGHT - MARGIN.top - MARGIN.bottom;

        let dates = buckets
            .iter()
            .map(|b| Utc.timestamp_millis_opt(b.timestamp).single())
            .collect::<Option<Vec<_>>>()?;
        let cumulative: Vec<f64> = buckets.iter().map(|b| b.cumulative_after_bucket as f64).collect();
        let x_axis = date_axis_layout(&dates, inner_width)?;
        let y_axis = value_axis_layout(&cumulative, inner_height)?;

        let count = buckets.len();
        let points: Vec<(f64, f64)> = dates
            .iter()
            .zip(&cumulative)
            .enumerate()
            .map(|(i, (date, value))| (x_axis.point_x(i, count, date), y_axis.y(*value)))
            .collect();

        let mut plot = Element::new("g").attr("transform", translate(MARGIN.left, MARGIN.top));
        for tick in &y_axis.ticks {
            plot.push(y_gridline(tick.y, inner_width, format_xp(tick.value.round() as i64)));
        }
        for tick in &x_axis.ticks {
            plot.push(x_tick(x_axis.x(tick), inner_height, format_axis_date(tick)));
        }

        let line = polyline(&points);
        let area = match (points.first(), points.last()) {
            (Some(first), Some(last)) => format!(
                "{} L {} {} L {} {} Z",
                line,
                fmt_num(last.0),
                fmt_num(inner_height),
                fmt_num(first.0),
                fmt_num(inner_height)
            ),
            _ => String::new(),
        };
        plot.push(Element::new("path").class("xp-area").attr("d", area).attr("fill", AREA_FILL));
        plot.push(
            Element::new("path")
                .class("xp-line")
                .attr("d", line)
                .attr("fill", "none")
                .attr("stroke", ACTIVE_TAB)
                .attr("stroke-width", "2"),
        );

        for (i, (&(x, y), bucket)) in points.iter().zip(buckets).enumerate() {
            let tip_id = format!("xp-tip-{}", i);
            plot.push(
                Element::new("circle")
                    .class("xp-point")
                    .num("cx", x)
                    .num("cy", y)
                    .attr("r", "4")
                    .attr("fill", ACTIVE_TAB)
                    .on_hover(HoverEffect::SetAttr { name: "r".into(), idle: "4".into(), hovered: "6".into() })
                    .on_hover(HoverEffect::Reveal { target: tip_id.clone() }),
            );
            plot.push(tooltip(
                &tip_id,
                x - 75.0,
                y - 65.0,
                150.0,
                50.0,
                &[
                    bucket.formatted_date.clone(),
                    format!(
                        "+{} XP (Total: {})",
                        format_xp(bucket.amount_sum),
                        format_xp(bucket.cumulative_after_bucket)
                    ),
                ],
            ));
        }

        Some(svg_root(width, HEIGHT).child(plot))
    }
}

fn polyline(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| format!("{} {} {}", if i == 0 { "M" } else { "L" }, fmt_num(*x), fmt_num(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Chart for XpTimelineChart {
    fn mount_id(&self) -> &'static str {
        "xp-graph"
    }

    fn render(&self, viewport: &Viewport) -> Element {
        let body = if self.series.buckets(self.active).is_empty() {
            placeholder("No data available for this category.")
        } else {
            self.plot(viewport)
                .unwrap_or_else(|| placeholder("No data available for this category."))
        };

        Element::new("div")
            .class("xp-chart")
            .attr("data-active", self.active.key())
            .child(self.tabs(viewport))
            .child(body)
    }
}
