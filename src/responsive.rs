// ⏱️ Responsive Controller - Debounced re-render on container resize
//
// Time is injected through `Clock` so the debounce window can be driven
// by hand in tests.

use crate::charts::Chart;
use crate::mount::Document;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

// ============================================================================
// CLOCK
// ============================================================================

pub trait Clock: Send + Sync {
    /// Monotonic milliseconds
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// DEBOUNCE
// ============================================================================

/// Trailing-edge debounce: every `trigger` pushes the deadline out; `poll`
/// runs the callback once after `interval_ms` of quiet.
pub struct Debounced<F> {
    callback: F,
    interval_ms: u64,
    deadline: Option<u64>,
}

pub fn debounce<F, R>(callback: F, interval_ms: u64) -> Debounced<F>
where
    F: FnMut() -> R,
{
    Debounced { callback, interval_ms, deadline: None }
}

impl<F, R> Debounced<F>
where
    F: FnMut() -> R,
{
    pub fn trigger(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.interval_ms));
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<R> {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                Some((self.callback)())
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

type MountTrigger = Debounced<Box<dyn FnMut() -> String + Send + Sync>>;

/// One debounced trigger per watched mount. A fired trigger re-measures its
/// mount and re-renders only when the width changed since the last render.
pub struct ResponsiveController<C: Clock> {
    clock: C,
    interval_ms: u64,
    triggers: Vec<MountTrigger>,
}

impl<C: Clock> ResponsiveController<C> {
    pub fn new(clock: C, interval_ms: u64) -> Self {
        ResponsiveController { clock, interval_ms, triggers: Vec::new() }
    }

    pub fn watch(&mut self, mount_id: &str) {
        let id = mount_id.to_string();
        let callback: Box<dyn FnMut() -> String + Send + Sync> = Box::new(move || id.clone());
        self.triggers.push(debounce(callback, self.interval_ms));
    }

    /// Window resized: arm every trigger
    pub fn on_resize(&mut self) {
        let now = self.clock.now_ms();
        for trigger in &mut self.triggers {
            trigger.trigger(now);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.triggers.iter().any(|t| t.is_pending())
    }

    /// Fire expired triggers and re-render their charts. Returns the ids of
    /// the mounts that were redrawn.
    pub fn poll(&mut self, document: &mut Document, charts: &[&dyn Chart]) -> Vec<String> {
        let now = self.clock.now_ms();
        let fired: Vec<String> = self.triggers.iter_mut().filter_map(|t| t.poll(now)).collect();

        let mut redrawn = Vec::new();
        for id in fired {
            let Some(mount) = document.mount(&id) else {
                continue;
            };
            if mount.rendered_width == Some(mount.width) {
                debug!("'{}' width unchanged, skipping re-render", id);
                continue;
            }
            if let Some(chart) = charts.iter().find(|c| c.mount_id() == id) {
                if document.render_chart(*chart) {
                    redrawn.push(id);
                }
            }
        }
        redrawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RatioChart;
    use std::cell::Cell;

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let calls = Cell::new(0);
        let mut debounced = debounce(|| calls.set(calls.get() + 1), 250);

        debounced.trigger(0);
        debounced.trigger(100);
        debounced.trigger(200);
        assert_eq!(debounced.poll(300), None);
        assert_eq!(debounced.poll(449), None);
        assert_eq!(debounced.poll(450), Some(()));
        assert_eq!(debounced.poll(1000), None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_debounce_cancel() {
        let mut debounced = debounce(|| 42, 10);
        debounced.trigger(0);
        debounced.cancel();
        assert!(!debounced.is_pending());
        assert_eq!(debounced.poll(100), None);
    }

    fn setup() -> (ManualClock, ResponsiveController<ManualClock>, Document, RatioChart) {
        let clock = ManualClock::new();
        let mut controller = ResponsiveController::new(clock.clone(), DEFAULT_DEBOUNCE_MS);
        controller.watch("auditRatio-graph");

        let mut doc = Document::new(1280.0).with_mount("auditRatio-graph", 600.0);
        let chart = RatioChart::new(100.0, 200.0);
        doc.render_chart(&chart);
        (clock, controller, doc, chart)
    }

    #[test]
    fn test_resize_rerenders_after_debounce() {
        let (clock, mut controller, mut doc, chart) = setup();

        doc.resize(900.0, &[("auditRatio-graph", 450.0)]);
        controller.on_resize();
        clock.advance(100);
        assert!(controller.poll(&mut doc, &[&chart]).is_empty());

        clock.advance(150);
        assert_eq!(controller.poll(&mut doc, &[&chart]), vec!["auditRatio-graph".to_string()]);
        assert_eq!(doc.mount("auditRatio-graph").unwrap().render_count, 2);
        assert!(!controller.has_pending());
    }

    #[test]
    fn test_unchanged_width_skips_render() {
        let (clock, mut controller, mut doc, chart) = setup();

        controller.on_resize();
        clock.advance(DEFAULT_DEBOUNCE_MS);
        assert!(controller.poll(&mut doc, &[&chart]).is_empty());
        assert_eq!(doc.mount("auditRatio-graph").unwrap().render_count, 1);
    }

    #[test]
    fn test_continuous_resize_renders_once() {
        let (clock, mut controller, mut doc, chart) = setup();

        for width in [580.0, 560.0, 540.0, 520.0] {
            doc.resize(1200.0, &[("auditRatio-graph", width)]);
            controller.on_resize();
            clock.advance(50);
            assert!(controller.poll(&mut doc, &[&chart]).is_empty());
        }
        clock.advance(DEFAULT_DEBOUNCE_MS);
        assert_eq!(controller.poll(&mut doc, &[&chart]).len(), 1);
        assert_eq!(doc.mount("auditRatio-graph").unwrap().rendered_width, Some(520.0));
    }
}
