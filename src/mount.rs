// Mount points: named containers that charts render into.
// Rendering replaces a mount's content as a whole; a missing mount is logged
// and skipped so sibling charts still render.

use crate::charts::{Chart, Viewport, ViewportSettings};
use crate::scene::Element;
use log::{debug, error};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MountPoint {
    pub width: f64,
    pub content: Option<Element>,
    /// Width used by the last render
    pub rendered_width: Option<f64>,
    pub render_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    mounts: BTreeMap<String, MountPoint>,
    window_width: f64,
    settings: ViewportSettings,
    scroll_target: Option<String>,
}

impl Document {
    pub fn new(window_width: f64) -> Self {
        Document {
            mounts: BTreeMap::new(),
            window_width,
            settings: ViewportSettings::default(),
            scroll_target: None,
        }
    }

    pub fn with_settings(mut self, settings: ViewportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_mount(mut self, id: &str, width: f64) -> Self {
        self.add_mount(id, width);
        self
    }

    pub fn add_mount(&mut self, id: &str, width: f64) {
        self.mounts.insert(
            id.to_string(),
            MountPoint { width, content: None, rendered_width: None, render_count: 0 },
        );
    }

    pub fn remove_mount(&mut self, id: &str) -> Option<MountPoint> {
        self.mounts.remove(id)
    }

    pub fn mount(&self, id: &str) -> Option<&MountPoint> {
        self.mounts.get(id)
    }

    pub fn mount_ids(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    pub fn content(&self, id: &str) -> Option<&Element> {
        self.mounts.get(id).and_then(|m| m.content.as_ref())
    }

    pub fn window_width(&self) -> f64 {
        self.window_width
    }

    /// Simulates a window resize: the window and every mount take new widths
    pub fn resize(&mut self, window_width: f64, container_widths: &[(&str, f64)]) {
        self.window_width = window_width;
        for (id, width) in container_widths {
            if let Some(mount) = self.mounts.get_mut(*id) {
                mount.width = *width;
            }
        }
    }

    pub fn measure(&self, id: &str) -> Option<f64> {
        self.mounts.get(id).map(|m| m.width)
    }

    pub fn viewport_for(&self, id: &str) -> Option<Viewport> {
        self.measure(id)
            .map(|width| Viewport::new(width, self.window_width).with_settings(self.settings))
    }

    /// Render `chart` into its mount. Returns `false` when the mount is absent.
    pub fn render_chart(&mut self, chart: &dyn Chart) -> bool {
        let id = chart.mount_id();
        let Some(viewport) = self.viewport_for(id) else {
            error!("mount point '{}' not found, skipping chart", id);
            return false;
        };
        let scene = chart.render(&viewport);
        self.replace(id, scene, Some(viewport.container_width))
    }

    /// Replace a mount's content with an already-rendered element
    pub fn replace(&mut self, id: &str, content: Element, rendered_width: Option<f64>) -> bool {
        match self.mounts.get_mut(id) {
            Some(mount) => {
                mount.content = Some(content);
                mount.rendered_width = rendered_width.or(mount.rendered_width);
                mount.render_count += 1;
                debug!("rendered '{}' (#{})", id, mount.render_count);
                true
            }
            None => {
                error!("mount point '{}' not found, skipping update", id);
                false
            }
        }
    }

    pub fn scroll_into_view(&mut self, id: &str) {
        if self.mounts.contains_key(id) {
            self.scroll_target = Some(id.to_string());
        }
    }

    pub fn scroll_target(&self) -> Option<&str> {
        self.scroll_target.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RatioChart;

    #[test]
    fn test_render_into_existing_mount() {
        let mut doc = Document::new(1280.0).with_mount("auditRatio-graph", 600.0);
        assert!(doc.render_chart(&RatioChart::new(10.0, 20.0)));

        let mount = doc.mount("auditRatio-graph").unwrap();
        assert_eq!(mount.render_count, 1);
        assert_eq!(mount.rendered_width, Some(600.0));
        assert!(doc.content("auditRatio-graph").is_some());
    }

    #[test]
    fn test_missing_mount_is_skipped() {
        let mut doc = Document::new(1280.0).with_mount("xp-graph", 600.0);
        assert!(!doc.render_chart(&RatioChart::new(10.0, 20.0)));
        assert!(doc.content("xp-graph").is_none());
    }

    #[test]
    fn test_rerender_replaces_content() {
        let mut doc = Document::new(1280.0).with_mount("auditRatio-graph", 600.0);
        doc.render_chart(&RatioChart::new(10.0, 20.0));
        doc.render_chart(&RatioChart::new(0.0, 0.0));

        let content = doc.content("auditRatio-graph").unwrap();
        assert!(content.has_class("no-data"));
        assert_eq!(doc.mount("auditRatio-graph").unwrap().render_count, 2);
    }

    #[test]
    fn test_resize_and_viewport() {
        let mut doc = Document::new(1280.0).with_mount("xp-graph", 600.0);
        doc.resize(400.0, &[("xp-graph", 380.0), ("missing", 10.0)]);

        let vp = doc.viewport_for("xp-graph").unwrap();
        assert_eq!(vp.container_width, 380.0);
        assert!(vp.is_mobile());
    }

    #[test]
    fn test_scroll_target_requires_mount() {
        let mut doc = Document::new(1280.0).with_mount("skill-detail-graph", 600.0);
        doc.scroll_into_view("nowhere");
        assert_eq!(doc.scroll_target(), None);
        doc.scroll_into_view("skill-detail-graph");
        assert_eq!(doc.scroll_target(), Some("skill-detail-graph"));
    }
}
