//! Molecular layer: ScrollTimeline engine
//!
//! Pins a section of a scrollable surface for a span proportional to its
//! slide count and turns the surface's scroll offset into a normalized
//! progress value for that section.
//!
//! Scroll and resize notifications only mark bindings dirty. Progress is
//! recomputed and delivered from `frame`, at most once per binding per frame,
//! no matter how many raw scroll events arrived in between.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace, warn};

use super::timing::{clamp01, smoothing_factor};
use super::window::{rest_point_at, uniform_rest_points, RestPoint};
use crate::error::{Error, Result};

/// Identity of a pinnable section on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u32);

/// Section placement in surface coordinates, before any pin spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    pub top: f64,
    pub height: f64,
}

/// Host that owns the scroll position and the section layout
///
/// A browser document, a terminal canvas or a test fixture.
pub trait ScrollSurface {
    /// Height of the visible viewport
    fn viewport_height(&self) -> f64;

    /// Current scroll offset from the top of the surface
    fn scroll_offset(&self) -> f64;

    /// Geometry of a section, or `None` if it is not part of the surface
    fn section_geometry(&self, section: SectionId) -> Option<SectionGeometry>;

    /// Keep `section` stuck to the viewport for `span` units of scrolling
    fn pin(&mut self, section: SectionId, span: f64);

    /// Release a pin created by `pin`
    fn unpin(&mut self, section: SectionId);

    /// Scroll to an absolute offset
    fn scroll_to(&mut self, offset: f64);
}

/// Timeline configuration for one section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    /// Pinned span in viewport heights
    pub total_units: f64,
    /// Slides sharing the span; snapping picks the middle of one share
    pub slides: usize,
    /// Time constant in seconds for easing delivered progress toward the
    /// scroll position; 0 tracks the scroll position exactly
    pub scrub_smoothing: f64,
    /// Request a scroll to the nearest slide once scrolling goes idle
    pub snap_to_slide: bool,
    /// Frames without scroll input before a snap is requested
    pub snap_idle_frames: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            total_units: 1.0,
            slides: 1,
            scrub_smoothing: 0.0,
            snap_to_slide: false,
            snap_idle_frames: 8,
        }
    }
}

/// Identity of one attach call
///
/// A handle from an earlier attach never matches a later binding of the same
/// section, so stale handles cannot detach a newer timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineHandle {
    id: u64,
    section: SectionId,
}

impl TimelineHandle {
    #[inline]
    pub fn section(&self) -> SectionId {
        self.section
    }
}

/// Scroll offset a timeline wants the host to move to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapRequest {
    pub handle: TimelineHandle,
    pub offset: f64,
    pub progress: f64,
}

/// Progress listener
pub type ProgressCallback = Box<dyn FnMut(f64)>;

struct Binding {
    handle: TimelineHandle,
    config: TimelineConfig,
    top: f64,
    span: f64,
    /// Progress derived from the current scroll offset
    target: f64,
    /// Progress last handed to the callback
    delivered: Option<f64>,
    dirty: bool,
    idle_frames: u32,
    snapped: bool,
    rest_points: Vec<RestPoint>,
    on_progress: ProgressCallback,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("handle", &self.handle)
            .field("config", &self.config)
            .field("top", &self.top)
            .field("span", &self.span)
            .field("target", &self.target)
            .field("delivered", &self.delivered)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Binding {
    fn progress_for(&self, scroll_offset: f64) -> f64 {
        if self.span <= 0.0 {
            return 0.0;
        }
        clamp01((scroll_offset - self.top) / self.span)
    }

    /// Rest point of the slide current at `progress`, and its scroll offset
    ///
    /// A single slide has nothing to snap between.
    fn snap_point(&self, progress: f64) -> Option<(f64, f64)> {
        if self.rest_points.len() < 2 {
            return None;
        }
        let point = rest_point_at(&self.rest_points, progress)?;
        Some((point.progress, self.top + point.progress * self.span))
    }
}

/// Registry of scroll-linked timelines over one surface
#[derive(Debug)]
pub struct ScrollTimeline<S> {
    surface: S,
    bindings: BTreeMap<SectionId, Binding>,
    next_id: u64,
    scrolled: bool,
    snap_request: Option<SnapRequest>,
}

impl<S: ScrollSurface> ScrollTimeline<S> {
    /// Threshold under which smoothed progress lands on its target
    const SETTLE_EPSILON: f64 = 1e-4;

    pub fn new(surface: S) -> Self {
        Self {
            surface,
            bindings: BTreeMap::new(),
            next_id: 1,
            scrolled: false,
            snap_request: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the host; call `notify_scroll` / `notify_resize`
    /// after changing its scroll offset or layout
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_bound(&self, section: SectionId) -> bool {
        self.bindings.contains_key(&section)
    }

    /// Whether `handle` still names an active binding
    pub fn is_live(&self, handle: TimelineHandle) -> bool {
        self.bindings
            .get(&handle.section)
            .is_some_and(|b| b.handle == handle)
    }

    /// Progress most recently delivered for `handle`
    pub fn progress(&self, handle: TimelineHandle) -> Option<f64> {
        self.bindings
            .get(&handle.section)
            .filter(|b| b.handle == handle)
            .and_then(|b| b.delivered)
    }

    /// Pinned span in surface units
    pub fn span(&self, handle: TimelineHandle) -> Option<f64> {
        self.bindings
            .get(&handle.section)
            .filter(|b| b.handle == handle)
            .map(|b| b.span)
    }

    /// Bind `section` and pin it for `total_units` viewport heights
    ///
    /// Fails with `NotAttachable` when the section is missing, has no height
    /// or would get no scroll span, and with `DoubleAttach` when it is
    /// already bound. Nothing is registered or pinned on failure.
    pub fn attach(
        &mut self,
        section: SectionId,
        config: TimelineConfig,
        on_progress: ProgressCallback,
    ) -> Result<TimelineHandle> {
        if self.bindings.contains_key(&section) {
            return Err(Error::DoubleAttach(format!("section {}", section.0)));
        }
        if !(config.total_units.is_finite() && config.total_units > 0.0) {
            return Err(Error::NotAttachable(format!(
                "section {} has no scroll span (total_units {})",
                section.0, config.total_units
            )));
        }

        let geometry = self
            .surface
            .section_geometry(section)
            .ok_or_else(|| Error::NotAttachable(format!("section {} is not on the surface", section.0)))?;
        if !(geometry.height > 0.0) {
            return Err(Error::NotAttachable(format!(
                "section {} has zero height",
                section.0
            )));
        }
        let viewport = self.surface.viewport_height();
        if !(viewport > 0.0) {
            return Err(Error::NotAttachable(format!(
                "viewport has zero height while attaching section {}",
                section.0
            )));
        }

        let span = config.total_units * viewport;
        self.surface.pin(section, span);

        let handle = TimelineHandle {
            id: self.next_id,
            section,
        };
        self.next_id += 1;

        let mut binding = Binding {
            handle,
            config,
            top: geometry.top,
            span,
            target: 0.0,
            delivered: None,
            dirty: true,
            idle_frames: 0,
            snapped: false,
            rest_points: uniform_rest_points(config.slides),
            on_progress,
        };
        binding.target = binding.progress_for(self.surface.scroll_offset());
        self.bindings.insert(section, binding);

        debug!(section = section.0, span, "Attached scroll timeline");
        Ok(handle)
    }

    /// Release the pin and listener behind `handle`
    ///
    /// Returns `false` without side effects when the handle is unknown or was
    /// already detached.
    pub fn detach(&mut self, handle: TimelineHandle) -> bool {
        if !self.is_live(handle) {
            trace!(section = handle.section.0, "Ignoring detach of stale handle");
            return false;
        }
        self.bindings.remove(&handle.section);
        self.surface.unpin(handle.section);
        if self.snap_request.is_some_and(|r| r.handle == handle) {
            self.snap_request = None;
        }
        debug!(section = handle.section.0, "Detached scroll timeline");
        true
    }

    /// Replace the slide shares `handle` snaps between
    ///
    /// Plans with unequal shares pass their own rest points; the default is
    /// `config.slides` equal shares.
    pub fn set_rest_points(&mut self, handle: TimelineHandle, points: Vec<RestPoint>) -> bool {
        match self.bindings.get_mut(&handle.section) {
            Some(binding) if binding.handle == handle => {
                binding.rest_points = points;
                binding.snapped = false;
                true
            }
            _ => false,
        }
    }

    /// Detach every binding
    pub fn detach_all(&mut self) {
        let handles: Vec<_> = self.bindings.values().map(|b| b.handle).collect();
        for handle in handles {
            self.detach(handle);
        }
    }

    /// Record that the scroll offset changed
    pub fn notify_scroll(&mut self) {
        self.scrolled = true;
        for binding in self.bindings.values_mut() {
            binding.dirty = true;
        }
    }

    /// Re-read viewport and section geometry and re-pin every binding
    ///
    /// This is the one place progress may jump discontinuously. Returns the
    /// handles whose section lost its geometry; they keep their previous pin
    /// until the owner detaches them.
    pub fn notify_resize(&mut self) -> Vec<TimelineHandle> {
        let viewport = self.surface.viewport_height();
        let mut lost = Vec::new();
        for binding in self.bindings.values_mut() {
            let section = binding.handle.section;
            match self.surface.section_geometry(section) {
                Some(geometry) if geometry.height > 0.0 && viewport > 0.0 => {
                    binding.top = geometry.top;
                    binding.span = binding.config.total_units * viewport;
                    self.surface.pin(section, binding.span);
                    binding.dirty = true;
                    binding.snapped = false;
                }
                _ => {
                    warn!(
                        section = section.0,
                        "Section lost its geometry on resize, keeping previous pin"
                    );
                    lost.push(binding.handle);
                }
            }
        }
        lost
    }

    /// Take the pending snap request, if any
    pub fn take_snap_request(&mut self) -> Option<SnapRequest> {
        self.snap_request.take()
    }

    /// Advance one frame of `dt` seconds and deliver progress
    ///
    /// Each binding's callback runs at most once, and only when the
    /// delivered value changed.
    pub fn frame(&mut self, dt: f64) {
        let scrolled = std::mem::take(&mut self.scrolled);
        let scroll_offset = self.surface.scroll_offset();

        for binding in self.bindings.values_mut() {
            if binding.dirty {
                binding.target = binding.progress_for(scroll_offset);
                binding.dirty = false;
            }

            let value = match binding.delivered {
                Some(previous) if binding.config.scrub_smoothing > 0.0 => {
                    let k = smoothing_factor(dt, binding.config.scrub_smoothing);
                    let next = previous + (binding.target - previous) * k;
                    if (binding.target - next).abs() < Self::SETTLE_EPSILON {
                        binding.target
                    } else {
                        next
                    }
                }
                _ => binding.target,
            };

            if binding.delivered != Some(value) {
                binding.delivered = Some(value);
                (binding.on_progress)(value);
            }

            if scrolled {
                binding.idle_frames = 0;
                binding.snapped = false;
            } else {
                binding.idle_frames = binding.idle_frames.saturating_add(1);
            }

            let settled = binding.delivered == Some(binding.target);
            if binding.config.snap_to_slide
                && !binding.snapped
                && settled
                && binding.idle_frames >= binding.config.snap_idle_frames
            {
                binding.snapped = true;
                if let Some((progress, offset)) = binding.snap_point(binding.target) {
                    if (progress - binding.target).abs() > 1e-6 {
                        trace!(section = binding.handle.section.0, progress, "Requesting slide snap");
                        self.snap_request = Some(SnapRequest {
                            handle: binding.handle,
                            offset,
                            progress,
                        });
                    }
                }
            }
        }
    }

    /// Scroll the surface to a pending snap target and mark bindings dirty
    pub fn apply_snap(&mut self) -> bool {
        match self.snap_request.take() {
            Some(request) if self.is_live(request.handle) => {
                self.surface.scroll_to(request.offset);
                for binding in self.bindings.values_mut() {
                    binding.dirty = true;
                }
                true
            }
            _ => false,
        }
    }
}
