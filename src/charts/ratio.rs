// Audit ratio pie: XP given vs XP received

use super::{placeholder, svg_root, translate, Chart, Viewport};
use crate::format::{byte_unit_for, fmt_num, ByteUnit};
use crate::scene::{Element, HoverEffect};
use std::f64::consts::PI;

const HEIGHT: f64 = 300.0;
const GIVEN_COLOR: &str = "#3b82f6";
const RECEIVED_COLOR: &str = "#10b981";
const LEGEND_SPACING: f64 = 150.0;
const MOBILE_ROW: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RatioChart {
    given: f64,
    received: f64,
}

struct Slice {
    label: &'static str,
    value: f64,
    color: &'static str,
}

impl RatioChart {
    pub fn new(total_up: f64, total_down: f64) -> Self {
        RatioChart { given: total_up, received: total_down }
    }

    fn slices(&self) -> [Slice; 2] {
        [
            Slice { label: "Given", value: self.given.max(0.0), color: GIVEN_COLOR },
            Slice { label: "Received", value: self.received.max(0.0), color: RECEIVED_COLOR },
        ]
    }

    fn legend(&self, unit: ByteUnit, viewport: &Viewport, height: f64) -> Element {
        let slices = self.slices();
        let mobile = viewport.is_mobile();
        let n = slices.len() as f64;

        let origin_y = if mobile { height - 60.0 } else { height - 30.0 };
        let mut legend = Element::new("g")
            .class("legend")
            .attr("transform", translate(viewport.width() / 2.0, origin_y));

        for (i, slice) in slices.iter().enumerate() {
            let scaled = fmt_one_decimal(slice.value / unit.divisor);
            let (offset, rect_x, text_x, label) = if mobile {
                (
                    (0.0, i as f64 * MOBILE_ROW),
                    -40.0,
                    -20.0,
                    format!("{}: {}", slice.label, scaled),
                )
            } else {
                (
                    ((i as f64 - n / 2.0) * LEGEND_SPACING + LEGEND_SPACING / 2.0, 0.0),
                    -70.0,
                    -50.0,
                    format!("{} ({} {})", slice.label, scaled, unit.name),
                )
            };

            legend.push(
                Element::new("g")
                    .class("legend-item")
                    .attr("transform", translate(offset.0, offset.1))
                    .child(
                        Element::new("rect")
                            .num("x", rect_x)
                            .attr("y", "-10")
                            .attr("width", "15")
                            .attr("height", "15")
                            .attr("fill", slice.color),
                    )
                    .child(
                        Element::new("text")
                            .num("x", text_x)
                            .attr("y", "2")
                            .attr("font-size", "12px")
                            .text(label),
                    ),
            );
        }
        legend
    }
}

impl Chart for RatioChart {
    fn mount_id(&self) -> &'static str {
        "auditRatio-graph"
    }

    fn render(&self, viewport: &Viewport) -> Element {
        let total = self.given.max(0.0) + self.received.max(0.0);
        if total <= 0.0 || !total.is_finite() {
            return placeholder("No audit data available");
        }

        let width = viewport.width();
        let radius = width.min(HEIGHT) / 2.8;
        let unit = byte_unit_for(self.given.max(self.received));

        let mut pie = Element::new("g")
            .class("pie")
            .attr("transform", translate(width / 2.0, HEIGHT / 2.0 - 15.0));

        // Angles run clockwise from 12 o'clock
        let mut start = 0.0;
        for slice in self.slices() {
            if slice.value <= 0.0 {
                continue;
            }
            let fraction = slice.value / total;
            let end = start + fraction * 2.0 * PI;

            let shape = if fraction >= 1.0 {
                Element::new("circle").attr("r", fmt_num(radius))
            } else {
                Element::new("path").attr("d", arc_path(radius, start, end))
            };
            pie.push(
                shape
                    .class("slice")
                    .attr("fill", slice.color)
                    .attr("stroke", "white")
                    .attr("stroke-width", "2")
                    .on_hover(HoverEffect::SetAttr {
                        name: "opacity".into(),
                        idle: "1".into(),
                        hovered: "0.8".into(),
                    }),
            );

            let (lx, ly) = polar(radius * 0.7, (start + end) / 2.0);
            let (lx, ly) = if fraction >= 1.0 { (0.0, 0.0) } else { (lx, ly) };
            pie.push(
                Element::new("text")
                    .class("slice-label")
                    .num("x", lx)
                    .num("y", ly)
                    .attr("text-anchor", "middle")
                    .attr("fill", "white")
                    .attr("font-weight", "bold")
                    .text(format!("{:.1}%", fraction * 100.0)),
            );
            start = end;
        }

        Element::new("div").class("ratio-chart").child(
            svg_root(width, HEIGHT)
                .child(pie)
                .child(self.legend(unit, viewport, HEIGHT)),
        )
    }
}

fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

fn arc_path(radius: f64, start: f64, end: f64) -> String {
    let (x0, y0) = polar(radius, start);
    let (x1, y1) = polar(radius, end);
    let large_arc = if end - start > PI { 1 } else { 0 };
    format!(
        "M 0 0 L {} {} A {} {} 0 {} 1 {} {} Z",
        fmt_num(x0),
        fmt_num(y0),
        fmt_num(radius),
        fmt_num(radius),
        large_arc,
        fmt_num(x1),
        fmt_num(y1)
    )
}

fn fmt_one_decimal(value: f64) -> String {
    format!("{:.1}", value)
}
