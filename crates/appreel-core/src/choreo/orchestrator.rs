//! Molecular layer: Choreography Orchestrator
//!
//! Turns progress ticks from a `ScrollTimeline` into per-slide visual state
//! and a discrete current index. Every value it produces is a pure function
//! of progress; the only side effects are writes to the bound `VisualTarget`
//! and snapshot notifications.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::circular::{CircularLayout, CircularPosition};
use super::timeline::{ScrollSurface, ScrollTimeline, SectionId, TimelineConfig, TimelineHandle};
use super::timing::{lerp, Spring};
use super::window::{
    current_index, format_counter, index_at, rest_points, PhaseSample, SlidePhase, SlideWindow,
};
use crate::config::EasingType;
use crate::error::{Error, Result};

/// One slide of a choreography; its payload lives with the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slide {
    pub index: usize,
    /// Fraction of the progress range this slide owns
    pub duration_share: f64,
}

impl Slide {
    /// `total` slides sharing the range equally
    pub fn uniform(total: usize) -> Vec<Slide> {
        (0..total)
            .map(|index| Slide {
                index,
                duration_share: 1.0 / total as f64,
            })
            .collect()
    }

    /// Slides with shares proportional to `weights`
    pub fn weighted(weights: &[f64]) -> Vec<Slide> {
        let sum: f64 = weights.iter().sum();
        weights
            .iter()
            .enumerate()
            .map(|(index, w)| Slide {
                index,
                duration_share: if sum > 0.0 { w / sum } else { 0.0 },
            })
            .collect()
    }
}

/// Animatable properties of one slide or card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    /// Degrees
    pub rotation: f64,
}

impl VisualState {
    /// Fully visible, in place
    pub const REST: Self = Self {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
    };

    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            opacity: lerp(self.opacity, to.opacity, t),
            translate_x: lerp(self.translate_x, to.translate_x, t),
            translate_y: lerp(self.translate_y, to.translate_y, t),
            scale: lerp(self.scale, to.scale, t),
            rotation: lerp(self.rotation, to.rotation, t),
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::REST
    }
}

/// How slides move into and out of their rest state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideMotion {
    pub enter_from: VisualState,
    pub exit_to: VisualState,
    pub easing: EasingType,
    /// Animate the first slide in from the start of the range
    pub enter_first: bool,
    /// Animate the last slide out at the end of the range
    pub exit_last: bool,
}

impl Default for SlideMotion {
    fn default() -> Self {
        let hidden = VisualState {
            opacity: 0.0,
            ..VisualState::REST
        };
        Self {
            enter_from: hidden,
            exit_to: hidden,
            easing: EasingType::Linear,
            enter_first: false,
            exit_last: false,
        }
    }
}

impl SlideMotion {
    /// Slides rise in from below and leave upward
    pub fn vertical(offset: f64, easing: EasingType) -> Self {
        Self {
            enter_from: VisualState {
                opacity: 0.0,
                translate_y: offset,
                scale: 0.96,
                ..VisualState::REST
            },
            exit_to: VisualState {
                opacity: 0.0,
                translate_y: -offset,
                scale: 0.96,
                ..VisualState::REST
            },
            easing,
            ..Self::default()
        }
    }

    /// Slides fade and grow in, then fade and shrink out
    pub fn fade_scale(scale: f64, easing: EasingType) -> Self {
        let hidden = VisualState {
            opacity: 0.0,
            scale,
            ..VisualState::REST
        };
        Self {
            enter_from: hidden,
            exit_to: hidden,
            easing,
            ..Self::default()
        }
    }

    /// Visual state for a phase sample
    pub fn state_for(&self, sample: PhaseSample) -> VisualState {
        match sample.phase {
            SlidePhase::Pending => self.enter_from,
            SlidePhase::Entering => self
                .enter_from
                .lerp(&VisualState::REST, self.easing.apply(sample.t)),
            SlidePhase::Held => VisualState::REST,
            SlidePhase::Exiting => VisualState::REST.lerp(&self.exit_to, self.easing.apply(sample.t)),
            SlidePhase::Done => self.exit_to,
        }
    }
}

/// Side-effecting boundary: receives computed state for one slide
pub trait VisualTarget {
    fn apply(&mut self, index: usize, state: &VisualState);
}

impl<F> VisualTarget for F
where
    F: FnMut(usize, &VisualState),
{
    fn apply(&mut self, index: usize, state: &VisualState) {
        self(index, state)
    }
}

/// Visual target that keeps the latest state of every slide
///
/// Views read it at render time.
#[derive(Debug, Clone, Default)]
pub struct VisualBuffer {
    states: Vec<VisualState>,
    writes: Vec<usize>,
}

impl VisualBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![VisualState::REST; len],
            writes: vec![0; len],
        }
    }

    pub fn get(&self, index: usize) -> Option<&VisualState> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[VisualState] {
        &self.states
    }

    /// Number of times slide `index` has been written
    pub fn write_count(&self, index: usize) -> usize {
        self.writes.get(index).copied().unwrap_or(0)
    }
}

impl VisualTarget for VisualBuffer {
    fn apply(&mut self, index: usize, state: &VisualState) {
        if index >= self.states.len() {
            self.states.resize(index + 1, VisualState::REST);
            self.writes.resize(index + 1, 0);
        }
        self.states[index] = *state;
        self.writes[index] += 1;
    }
}

/// What subscribers see after each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChoreoSnapshot {
    pub progress: f64,
    pub current_index: usize,
    pub total: usize,
}

impl ChoreoSnapshot {
    /// `"01 / 08"` style label
    pub fn counter_label(&self) -> String {
        format_counter(self.current_index, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Subscriber = Box<dyn FnMut(&ChoreoSnapshot)>;

/// Carousel ring state: layout plus the reference slot facing the viewer
#[derive(Debug, Clone)]
struct Ring {
    layout: CircularLayout,
    spring: Option<Spring>,
    reference: f64,
}

impl Ring {
    fn reference(&self) -> f64 {
        self.spring.as_ref().map_or(self.reference, Spring::value)
    }
}

/// Scroll-driven slide choreographer
pub struct Choreographer<T> {
    target: T,
    motion: SlideMotion,
    slides: Vec<Slide>,
    /// Windows as used for phase sampling (last exit removed unless animated)
    windows: Vec<SlideWindow>,
    enter_spans: Vec<f64>,
    uniform: bool,
    /// Phase last written for slides outside the live neighbourhood
    settled: Vec<Option<SlidePhase>>,
    snapshot: Option<ChoreoSnapshot>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    handle: Option<TimelineHandle>,
    disposed: bool,
    ring: Option<Ring>,
}

impl<T: fmt::Debug> fmt::Debug for Choreographer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choreographer")
            .field("target", &self.target)
            .field("slides", &self.slides.len())
            .field("snapshot", &self.snapshot)
            .field("subscribers", &self.subscribers.len())
            .field("handle", &self.handle)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<T: VisualTarget> Choreographer<T> {
    pub fn new(target: T, motion: SlideMotion) -> Self {
        Self {
            target,
            motion,
            slides: Vec::new(),
            windows: Vec::new(),
            enter_spans: Vec::new(),
            uniform: true,
            settled: Vec::new(),
            snapshot: None,
            subscribers: Vec::new(),
            next_subscription: 1,
            handle: None,
            disposed: false,
            ring: None,
        }
    }

    /// Also lay slides out on a ring whose reference follows the current
    /// index, through `spring` when given or directly from progress otherwise
    pub fn with_ring(mut self, layout: CircularLayout, spring: Option<Spring>) -> Self {
        self.ring = Some(Ring {
            layout,
            spring,
            reference: 0.0,
        });
        self
    }

    /// Bind slides to their planned windows
    ///
    /// Resets all derived state; the next tick writes every slide.
    pub fn bind_slides(&mut self, slides: Vec<Slide>, windows: Vec<SlideWindow>) -> Result<()> {
        if slides.len() != windows.len() {
            return Err(Error::InvalidPlan(format!(
                "{} slides but {} windows",
                slides.len(),
                windows.len()
            )));
        }
        for (i, w) in windows.iter().enumerate() {
            let ordered = w.start < w.hold_end && w.hold_end <= w.end;
            let in_range = w.start >= 0.0 && w.end <= 1.0;
            if !(ordered && in_range) {
                return Err(Error::InvalidPlan(format!("window {i} is malformed: {w:?}")));
            }
        }

        let total = slides.len();
        let last = total.saturating_sub(1);
        // A slide enters while its predecessor's exit overlaps its window, so
        // both transitions finish together at `end(i - 1)`. Without overlap it
        // enters over as long as the predecessor took to leave.
        let enter_spans = (0..total)
            .map(|i| match i.checked_sub(1).map(|p| &windows[p]) {
                Some(prev) if prev.end > windows[i].start => prev.end - windows[i].start,
                Some(prev) => prev.exit_span(),
                None if self.motion.enter_first => windows[i].exit_span(),
                None => 0.0,
            })
            .collect();
        let windows = windows
            .into_iter()
            .enumerate()
            .map(|(i, w)| {
                if i == last && !self.motion.exit_last {
                    w.without_exit()
                } else {
                    w
                }
            })
            .collect();

        let first_share = slides.first().map_or(0.0, |s| s.duration_share);
        self.uniform = slides
            .iter()
            .all(|s| (s.duration_share - first_share).abs() < 1e-12);
        self.slides = slides;
        self.windows = windows;
        self.enter_spans = enter_spans;
        self.settled = vec![None; total];
        self.snapshot = None;
        if let Some(ring) = self.ring.as_mut() {
            ring.reference = 0.0;
            if let Some(spring) = ring.spring.as_mut() {
                spring.snap_to(0.0);
            }
        }

        debug!(slides = total, uniform = self.uniform, "Bound slides");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn windows(&self) -> &[SlideWindow] {
        &self.windows
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn motion(&self) -> &SlideMotion {
        &self.motion
    }

    pub fn handle(&self) -> Option<TimelineHandle> {
        self.handle
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn snapshot(&self) -> Option<ChoreoSnapshot> {
        self.snapshot
    }

    pub fn progress(&self) -> f64 {
        self.snapshot.map_or(0.0, |s| s.progress)
    }

    pub fn current_index(&self) -> usize {
        self.snapshot.map_or(0, |s| s.current_index)
    }

    fn index_for(&self, progress: f64) -> usize {
        if self.uniform {
            current_index(progress, self.slides.len())
        } else {
            index_at(&self.windows, progress)
        }
    }

    fn sample(&self, index: usize, progress: f64) -> PhaseSample {
        self.windows[index].sample(progress, self.enter_spans[index])
    }

    /// Phase of slide `index` at the last delivered progress
    pub fn phase(&self, index: usize) -> Option<SlidePhase> {
        (index < self.slides.len()).then(|| self.sample(index, self.progress()).phase)
    }

    /// Visual state of slide `index` at `progress`
    pub fn visual_state_at(&self, index: usize, progress: f64) -> Option<VisualState> {
        (index < self.slides.len()).then(|| self.motion.state_for(self.sample(index, progress)))
    }

    /// Visual state of slide `index` at the last delivered progress
    pub fn visual_state(&self, index: usize) -> Option<VisualState> {
        self.visual_state_at(index, self.progress())
    }

    /// Only the current slide takes pointer input
    pub fn accepts_pointer(&self, index: usize) -> bool {
        !self.disposed
            && index < self.slides.len()
            && self.snapshot.map_or(index == 0, |s| s.current_index == index)
    }

    /// Reference slot currently facing the viewer, if a ring is configured
    pub fn reference(&self) -> Option<f64> {
        self.ring.as_ref().map(Ring::reference)
    }

    pub fn ring_layout(&self) -> Option<&CircularLayout> {
        self.ring.as_ref().map(|r| &r.layout)
    }

    /// Update the ring radius after a viewport change
    pub fn set_ring_radius(&mut self, radius: f64) {
        if let Some(ring) = self.ring.as_mut() {
            ring.layout.radius = radius;
        }
    }

    /// Per-card ring placement around the current reference
    pub fn circular_positions(&self) -> Vec<CircularPosition> {
        match &self.ring {
            Some(ring) => ring.layout.layout_all(self.slides.len(), ring.reference()),
            None => Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Write every slide at rest, with no animation
    ///
    /// Degraded presentation for when no timeline could be attached.
    pub fn render_static(&mut self) {
        for i in 0..self.slides.len() {
            self.target.apply(i, &VisualState::REST);
            self.settled[i] = None;
        }
    }

    /// Apply one progress value
    ///
    /// The current slide and its neighbours are written every tick. Other
    /// slides are written once when they settle into `Pending` or `Done` and
    /// left alone afterwards.
    pub fn on_progress_tick(&mut self, progress: f64) {
        if self.disposed {
            trace!(progress, "Dropping progress tick after dispose");
            return;
        }
        if self.slides.is_empty() {
            return;
        }
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let total = self.slides.len();
        let current = self.index_for(progress);

        for i in 0..total {
            let sample = self.sample(i, progress);
            let live = i.abs_diff(current) <= 1 || !sample.phase.is_settled();
            if live {
                let state = self.motion.state_for(sample);
                self.target.apply(i, &state);
                self.settled[i] = None;
            } else if self.settled[i] != Some(sample.phase) {
                let state = self.motion.state_for(sample);
                self.target.apply(i, &state);
                self.settled[i] = Some(sample.phase);
            }
        }

        if let Some(ring) = self.ring.as_mut() {
            match ring.spring.as_mut() {
                Some(spring) => spring.set_target(current as f64),
                None => ring.reference = CircularLayout::reference_from_progress(progress, total),
            }
        }

        let snapshot = ChoreoSnapshot {
            progress,
            current_index: current,
            total,
        };
        if self.snapshot != Some(snapshot) {
            self.snapshot = Some(snapshot);
            for (_, subscriber) in self.subscribers.iter_mut() {
                subscriber(&snapshot);
            }
        }
    }

    /// Advance in-flight interpolations by `dt` seconds
    ///
    /// Returns `true` while something is still moving.
    pub fn frame(&mut self, dt: f64) -> bool {
        if self.disposed {
            return false;
        }
        match self.ring.as_mut().and_then(|r| r.spring.as_mut()) {
            Some(spring) => {
                spring.step(dt);
                !spring.is_settled()
            }
            None => false,
        }
    }

    /// Tear down: detach from the timeline, stop the ring spring and drop
    /// subscribers. Safe to call any number of times.
    pub fn dispose<S: ScrollSurface>(&mut self, timeline: &mut ScrollTimeline<S>) {
        if let Some(handle) = self.handle.take() {
            timeline.detach(handle);
        }
        if let Some(spring) = self.ring.as_mut().and_then(|r| r.spring.as_mut()) {
            spring.cancel();
        }
        self.subscribers.clear();
        if !self.disposed {
            debug!(slides = self.slides.len(), "Disposed choreographer");
        }
        self.disposed = true;
    }
}

impl<T: VisualTarget + 'static> Choreographer<T> {
    /// Attach `section` on `timeline` and route its progress into `this`
    ///
    /// The timeline only holds a weak reference, so ticks queued after the
    /// choreographer is dropped are ignored. Connecting while a live handle
    /// is held fails with `DoubleAttach`.
    pub fn connect<S: ScrollSurface>(
        this: &Rc<RefCell<Self>>,
        timeline: &mut ScrollTimeline<S>,
        section: SectionId,
        config: TimelineConfig,
    ) -> Result<TimelineHandle> {
        if let Some(handle) = this.borrow().handle {
            if timeline.is_live(handle) {
                return Err(Error::DoubleAttach(format!(
                    "choreographer already bound to section {}",
                    handle.section().0
                )));
            }
        }

        let weak = Rc::downgrade(this);
        let handle = timeline.attach(
            section,
            config,
            Box::new(move |progress| match weak.upgrade() {
                Some(choreo) => match choreo.try_borrow_mut() {
                    Ok(mut choreo) => choreo.on_progress_tick(progress),
                    Err(_) => trace!(progress, "Choreographer busy, skipping tick"),
                },
                None => trace!(progress, "Dropping tick for released choreographer"),
            }),
        )?;

        let mut choreo = this.borrow_mut();
        timeline.set_rest_points(handle, rest_points(&choreo.windows));
        choreo.handle = Some(handle);
        choreo.disposed = false;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreo::timeline::tests::FakeSurface;
    use crate::choreo::window::plan;

    fn slideshow(total: usize) -> Choreographer<VisualBuffer> {
        let mut choreo = Choreographer::new(
            VisualBuffer::new(total),
            SlideMotion::vertical(20.0, EasingType::Linear),
        );
        choreo
            .bind_slides(Slide::uniform(total), plan(total, 0.85, 0.0).unwrap())
            .unwrap();
        choreo
    }

    #[test]
    fn test_current_index_follows_progress() {
        let mut choreo = slideshow(8);
        choreo.on_progress_tick(0.49);
        assert_eq!(choreo.current_index(), 3);
        choreo.on_progress_tick(1.0);
        assert_eq!(choreo.current_index(), 7);
        assert_eq!(choreo.snapshot().unwrap().counter_label(), "08 / 08");
    }

    #[test]
    fn test_index_is_monotonic_and_reversible() {
        let values: Vec<f64> = (0..=500).map(|i| i as f64 / 500.0).collect();

        let mut choreo = slideshow(8);
        let forward: Vec<usize> = values
            .iter()
            .map(|&p| {
                choreo.on_progress_tick(p);
                choreo.current_index()
            })
            .collect();
        assert!(forward.windows(2).all(|w| w[1] >= w[0]));

        let backward: Vec<usize> = values
            .iter()
            .rev()
            .map(|&p| {
                choreo.on_progress_tick(p);
                choreo.current_index()
            })
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(backward, reversed);
    }

    #[test]
    fn test_visual_state_has_no_hysteresis() {
        let mut a = slideshow(5);
        let mut b = slideshow(5);

        a.on_progress_tick(0.585);
        // Arrive at the same value from the other direction
        b.on_progress_tick(0.95);
        b.on_progress_tick(0.7);
        b.on_progress_tick(0.585);

        for i in 0..5 {
            assert_eq!(a.visual_state(i), b.visual_state(i), "slide {}", i);
        }
        assert_eq!(a.target().get(2), b.target().get(2));
        assert_eq!(a.target().get(3), b.target().get(3));
    }

    #[test]
    fn test_phases_across_window() {
        let mut choreo = slideshow(5);
        choreo.on_progress_tick(0.5);
        assert_eq!(choreo.phase(0), Some(SlidePhase::Done));
        assert_eq!(choreo.phase(2), Some(SlidePhase::Held));
        assert_eq!(choreo.phase(4), Some(SlidePhase::Pending));

        choreo.on_progress_tick(0.585);
        assert_eq!(choreo.phase(2), Some(SlidePhase::Exiting));
        let state = choreo.visual_state(2).unwrap();
        assert!(state.opacity > 0.0 && state.opacity < 1.0);
        assert!(state.translate_y < 0.0);
    }

    #[test]
    fn test_cross_fade_is_bounded_by_overlap() {
        let windows = plan(4, 0.8, 0.2).unwrap();
        let (start, end) = (windows[1].start, windows[0].end);
        let mut choreo = Choreographer::new(VisualBuffer::new(4), SlideMotion::default());
        choreo.bind_slides(Slide::uniform(4), windows).unwrap();
        let opacity = |c: &Choreographer<VisualBuffer>, i: usize, p: f64| {
            c.visual_state_at(i, p).unwrap().opacity
        };

        // Outside the overlap at most one slide shows
        for p in [0.1, 0.22, start - 1e-9, end + 1e-9, 0.4] {
            let visible = (0..4).filter(|&i| opacity(&choreo, i, p) > 0.0).count();
            assert_eq!(visible, 1, "progress {}", p);
        }

        // Inside it the outgoing slide fades while the incoming one rises
        let mid = (start + end) / 2.0;
        assert_eq!(opacity(&choreo, 1, start), 0.0);
        assert!(opacity(&choreo, 0, mid) > 0.0 && opacity(&choreo, 0, mid) < 1.0);
        assert!(opacity(&choreo, 1, mid) > 0.0 && opacity(&choreo, 1, mid) < 1.0);
        assert!(opacity(&choreo, 1, mid) > opacity(&choreo, 1, start));

        // Both transitions settle together at the end of the overlap
        assert_eq!(opacity(&choreo, 0, end), 0.0);
        assert!((opacity(&choreo, 1, end) - 1.0).abs() < 1e-6);
        assert_eq!(choreo.visual_state_at(1, end + 0.01), Some(VisualState::REST));
    }

    #[test]
    fn test_first_slide_visible_and_last_slide_stays() {
        let mut choreo = slideshow(4);
        choreo.on_progress_tick(0.0);
        assert_eq!(choreo.visual_state(0), Some(VisualState::REST));
        choreo.on_progress_tick(1.0);
        assert_eq!(choreo.phase(3), Some(SlidePhase::Held));
        assert_eq!(choreo.visual_state(3), Some(VisualState::REST));
    }

    #[test]
    fn test_far_slides_written_once_when_settled() {
        let mut choreo = slideshow(8);
        choreo.on_progress_tick(0.05);
        let first_writes = choreo.target().write_count(6);
        assert_eq!(first_writes, 1);

        for step in 1..10 {
            choreo.on_progress_tick(0.05 + step as f64 * 0.01);
        }
        // Slide 6 stayed pending and far away: no further writes
        assert_eq!(choreo.target().write_count(6), 1);
        // The active slide is rewritten every tick
        assert_eq!(choreo.target().write_count(0), 10);
    }

    #[test]
    fn test_subscribers_receive_changes_only() {
        let mut choreo = slideshow(4);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        choreo.subscribe(Box::new(move |s| sink.borrow_mut().push(s.current_index)));

        choreo.on_progress_tick(0.1);
        choreo.on_progress_tick(0.1);
        choreo.on_progress_tick(0.6);
        assert_eq!(*seen.borrow(), vec![0, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut choreo = slideshow(4);
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = choreo.subscribe(Box::new(move |_| *sink.borrow_mut() += 1));
        assert!(choreo.unsubscribe(id));
        assert!(!choreo.unsubscribe(id));
        choreo.on_progress_tick(0.3);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_bind_rejects_mismatched_windows() {
        let mut choreo = Choreographer::new(VisualBuffer::default(), SlideMotion::default());
        let err = choreo
            .bind_slides(Slide::uniform(3), plan(4, 0.8, 0.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPlan(_)));
    }

    #[test]
    fn test_pointer_gating() {
        let mut choreo = slideshow(4);
        assert!(choreo.accepts_pointer(0));
        choreo.on_progress_tick(0.55);
        assert!(choreo.accepts_pointer(2));
        assert!(!choreo.accepts_pointer(1));
        assert!(!choreo.accepts_pointer(3));
    }

    #[test]
    fn test_ring_follows_index_through_spring() {
        let mut choreo = Choreographer::new(VisualBuffer::new(6), SlideMotion::default())
            .with_ring(CircularLayout::default(), Some(Spring::new(0.0, 170.0, 26.0)));
        choreo
            .bind_slides(Slide::uniform(6), plan(6, 0.8, 0.1).unwrap())
            .unwrap();

        choreo.on_progress_tick(0.55);
        assert_eq!(choreo.reference(), Some(0.0));
        assert!(choreo.frame(1.0 / 60.0));
        let mut frames = 0;
        while choreo.frame(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 600, "spring never settled");
        }
        assert_eq!(choreo.reference(), Some(3.0));

        let positions = choreo.circular_positions();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[3].opacity, 1.0);
        assert!(positions[3].offset_z.abs() < 1e-9);
    }

    #[test]
    fn test_ring_without_spring_tracks_progress() {
        let mut choreo = Choreographer::new(VisualBuffer::new(4), SlideMotion::default())
            .with_ring(CircularLayout::default(), None);
        choreo
            .bind_slides(Slide::uniform(4), plan(4, 0.8, 0.0).unwrap())
            .unwrap();
        choreo.on_progress_tick(0.5);
        assert_eq!(choreo.reference(), Some(1.5));
        assert!(!choreo.frame(0.016));
    }

    #[test]
    fn test_connect_dispose_and_stale_ticks() {
        let section = SectionId(1);
        let surface = FakeSurface::with_section(section, 0.0, 100.0);
        let mut timeline = ScrollTimeline::new(surface);
        let choreo = Rc::new(RefCell::new(slideshow(4)));
        let config = TimelineConfig {
            total_units: 4.0,
            ..Default::default()
        };

        let handle = Choreographer::connect(&choreo, &mut timeline, section, config).unwrap();
        timeline.surface_mut().scroll = 200.0;
        timeline.notify_scroll();
        timeline.frame(0.016);
        assert_eq!(choreo.borrow().current_index(), 2);

        // A second connect while live is rejected and keeps the binding
        let err = Choreographer::connect(&choreo, &mut timeline, section, config).unwrap_err();
        assert!(matches!(err, Error::DoubleAttach(_)));
        assert!(timeline.is_live(handle));

        choreo.borrow_mut().dispose(&mut timeline);
        choreo.borrow_mut().dispose(&mut timeline);
        assert!(!timeline.is_live(handle));
        assert_eq!(timeline.surface().unpin_calls, 1);

        // Ticks after dispose are ignored
        choreo.borrow_mut().on_progress_tick(0.9);
        assert_eq!(choreo.borrow().current_index(), 2);
        assert!(!choreo.borrow().accepts_pointer(2));

        // Remount on the same section works
        Choreographer::connect(&choreo, &mut timeline, section, config).unwrap();
        assert!(!choreo.borrow().is_disposed());
    }

    #[test]
    fn test_idle_snap_keeps_weighted_slide_current() {
        let section = SectionId(2);
        let surface = FakeSurface::with_section(section, 0.0, 100.0);
        let mut timeline = ScrollTimeline::new(surface);
        let weights = [1.0, 3.0];
        let mut choreo = Choreographer::new(VisualBuffer::new(2), SlideMotion::default());
        choreo
            .bind_slides(
                Slide::weighted(&weights),
                crate::choreo::window::plan_weighted(&weights, 0.85, 0.0).unwrap(),
            )
            .unwrap();
        let choreo = Rc::new(RefCell::new(choreo));
        let config = TimelineConfig {
            total_units: 2.0,
            slides: 2,
            snap_to_slide: true,
            snap_idle_frames: 2,
            ..Default::default()
        };
        Choreographer::connect(&choreo, &mut timeline, section, config).unwrap();

        timeline.surface_mut().scroll = 20.0;
        timeline.notify_scroll();
        timeline.frame(0.016);
        assert_eq!(choreo.borrow().current_index(), 0);

        for _ in 0..3 {
            timeline.frame(0.016);
        }
        assert!(timeline.apply_snap());
        timeline.frame(0.016);
        assert_eq!(choreo.borrow().current_index(), 0);
        assert!((choreo.borrow().progress() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_dropped_choreographer_ignores_ticks() {
        let section = SectionId(3);
        let surface = FakeSurface::with_section(section, 0.0, 100.0);
        let mut timeline = ScrollTimeline::new(surface);
        let choreo = Rc::new(RefCell::new(slideshow(3)));
        Choreographer::connect(&choreo, &mut timeline, section, TimelineConfig::default()).unwrap();
        drop(choreo);

        timeline.surface_mut().scroll = 50.0;
        timeline.notify_scroll();
        timeline.frame(0.016);
        timeline.detach_all();
        assert_eq!(timeline.binding_count(), 0);
    }

    #[test]
    fn test_closure_target() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&writes);
        let mut choreo = Choreographer::new(
            move |i: usize, s: &VisualState| sink.borrow_mut().push((i, s.opacity)),
            SlideMotion::default(),
        );
        choreo
            .bind_slides(Slide::uniform(2), plan(2, 0.8, 0.0).unwrap())
            .unwrap();
        choreo.on_progress_tick(0.0);
        assert_eq!(writes.borrow().len(), 2);
        assert_eq!(writes.borrow()[0], (0, 1.0));
    }

    #[test]
    fn test_weighted_slides_use_window_lookup() {
        let mut choreo = Choreographer::new(VisualBuffer::new(3), SlideMotion::default());
        let weights = [1.0, 2.0, 1.0];
        choreo
            .bind_slides(
                Slide::weighted(&weights),
                crate::choreo::window::plan_weighted(&weights, 0.8, 0.0).unwrap(),
            )
            .unwrap();
        choreo.on_progress_tick(0.6);
        assert_eq!(choreo.current_index(), 1);
        choreo.on_progress_tick(0.8);
        assert_eq!(choreo.current_index(), 2);
    }
}
