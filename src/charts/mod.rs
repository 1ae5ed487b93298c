// 📊 Charts - One component per dashboard visualization
//
// Each component owns its render state and produces a fresh `Element` on
// every render. Hosts replace the whole mount content with the result.

pub mod project_table;
pub mod ratio;
pub mod skill_bars;
pub mod skill_history;
pub mod xp_timeline;

pub use project_table::ProjectTable;
pub use ratio::RatioChart;
pub use skill_bars::SkillBarsChart;
pub use skill_history::SkillHistoryChart;
pub use xp_timeline::XpTimelineChart;

use crate::format::fmt_num;
use crate::scene::Element;

pub const MOBILE_BREAKPOINT: f64 = 480.0;
/// Used when a container reports no width
pub const FALLBACK_WIDTH: f64 = 350.0;
/// Inner plots never collapse below this
const MIN_PLOT_WIDTH: f64 = 50.0;

// ============================================================================
// VIEWPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub mobile_breakpoint: f64,
    pub fallback_width: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        ViewportSettings { mobile_breakpoint: MOBILE_BREAKPOINT, fallback_width: FALLBACK_WIDTH }
    }
}

/// Measured size of a mount point plus the window it sits in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub container_width: f64,
    pub window_width: f64,
    pub settings: ViewportSettings,
}

impl Viewport {
    pub fn new(container_width: f64, window_width: f64) -> Self {
        Viewport { container_width, window_width, settings: ViewportSettings::default() }
    }

    pub fn with_settings(mut self, settings: ViewportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn width(&self) -> f64 {
        if self.container_width > 0.0 && self.container_width.is_finite() {
            self.container_width
        } else {
            self.settings.fallback_width
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.window_width < self.settings.mobile_breakpoint
    }
}

// ============================================================================
// CHART TRAIT
// ============================================================================

pub trait Chart {
    /// Id of the container this chart renders into
    fn mount_id(&self) -> &'static str;

    fn render(&self, viewport: &Viewport) -> Element;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn inner_width(&self, total: f64) -> f64 {
        (total - self.left - self.right).max(MIN_PLOT_WIDTH)
    }
}

// ============================================================================
// SHARED BUILDING BLOCKS
// ============================================================================

pub(crate) fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", fmt_num(x), fmt_num(y))
}

pub(crate) fn svg_root(width: f64, height: f64) -> Element {
    Element::new("svg")
        .num("width", width)
        .num("height", height)
        .attr("viewBox", format!("0 0 {} {}", fmt_num(width), fmt_num(height)))
}

/// Explicit empty state shown instead of an empty chart
pub fn placeholder(message: &str) -> Element {
    Element::new("p").class("no-data").text(message)
}

/// Hidden tooltip group revealed by a hover effect targeting `id`
pub(crate) fn tooltip(id: &str, x: f64, y: f64, width: f64, height: f64, lines: &[String]) -> Element {
    let mut group = Element::new("g")
        .id(id)
        .class("tooltip")
        .attr("opacity", "0")
        .attr("pointer-events", "none")
        .child(
            Element::new("rect")
                .num("x", x)
                .num("y", y)
                .num("width", width)
                .num("height", height)
                .attr("fill", "white")
                .attr("stroke", "#ccc")
                .attr("rx", "5"),
        );

    let line_height = height / (lines.len().max(1) as f64 + 1.0);
    for (i, line) in lines.iter().enumerate() {
        group.push(
            Element::new("text")
                .num("x", x + width / 2.0)
                .num("y", y + line_height * (i as f64 + 1.0) + 4.0)
                .attr("text-anchor", "middle")
                .attr("font-size", "12px")
                .text(line.clone()),
        );
    }
    group
}

/// Horizontal grid line plus its left-hand label
pub(crate) fn y_gridline(y: f64, width: f64, label: String) -> Element {
    Element::new("g")
        .class("y-tick")
        .child(
            Element::new("line")
                .attr("x1", "0")
                .num("x2", width)
                .num("y1", y)
                .num("y2", y)
                .attr("stroke", "#e0e0e0"),
        )
        .child(
            Element::new("text")
                .attr("x", "-10")
                .num("y", y)
                .attr("dy", "0.32em")
                .attr("text-anchor", "end")
                .attr("font-size", "12px")
                .text(label),
        )
}

pub(crate) fn x_tick(x: f64, height: f64, label: String) -> Element {
    Element::new("text")
        .class("x-tick")
        .num("x", x)
        .num("y", height + 20.0)
        .attr("text-anchor", "middle")
        .attr("font-size", "12px")
        .text(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_fallback_and_breakpoint() {
        let vp = Viewport::new(0.0, 1024.0);
        assert_eq!(vp.width(), FALLBACK_WIDTH);
        assert!(!vp.is_mobile());

        let phone = Viewport::new(320.0, 360.0);
        assert_eq!(phone.width(), 320.0);
        assert!(phone.is_mobile());
    }

    #[test]
    fn test_tooltip_starts_hidden() {
        let tip = tooltip("tip-0", 10.0, 20.0, 100.0, 30.0, &["Value: 5".to_string()]);
        assert_eq!(tip.get_attr("opacity"), Some("0"));
        assert_eq!(tip.text_content(), "Value: 5");
    }

    #[test]
    fn test_margin_never_collapses() {
        let margin = Margin { top: 0.0, right: 30.0, bottom: 0.0, left: 150.0 };
        assert_eq!(margin.inner_width(100.0), MIN_PLOT_WIDTH);
        assert_eq!(margin.inner_width(480.0), 300.0);
    }
}
