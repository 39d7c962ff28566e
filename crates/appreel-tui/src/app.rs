use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use appreel_core::choreo::{
    rest_points, ChoreoSnapshot, Choreographer, CircularPosition, ScrollSurface, ScrollTimeline,
    SectionId, VisualBuffer, VisualState,
};
use appreel_core::viewport::{tilt_for, Rect as ViewRect, Tilt};
use appreel_core::{
    AppConfig, Catalogue, CatalogueEntry, Error, LayoutMetrics, PointerKind, Route, RouteTable,
    SceneKind, ScenePlan, Viewport,
};
use ratatui::layout::Rect;
use tracing::{debug, info, trace, warn};

use crate::keymap::Keymap;
use crate::surface::{TerminalSurface, SHOWCASE};
use crate::theme::Theme;
use crate::widgets::{card_placements, CardPlacement};

/// Current application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
}

/// Where a document section currently sits on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionView {
    /// Screen row of the section's first line; negative once scrolled past
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Content area the section is drawn into
    pub clip: Rect,
}

impl SectionView {
    /// Visible part of the section, if any
    pub fn visible_area(&self) -> Option<Rect> {
        let top = self.clip.y as f64 + self.top;
        let bottom = top + self.height;
        let clip_bottom = self.clip.y as f64 + self.clip.height as f64;
        let y0 = top.max(self.clip.y as f64).round();
        let y1 = bottom.min(clip_bottom).round();
        (y1 > y0).then(|| Rect::new(self.clip.x, y0 as u16, self.clip.width, (y1 - y0) as u16))
    }

    /// Rows of the section hidden above the clip area
    pub fn rows_hidden(&self) -> u16 {
        (-self.top).max(0.0).round() as u16
    }
}

/// A mounted showcase scene
struct Scene {
    kind: SceneKind,
    choreo: Rc<RefCell<Choreographer<VisualBuffer>>>,
    /// Latest snapshot pushed by the choreographer's subscriber
    snapshot: Rc<Cell<Option<ChoreoSnapshot>>>,
    /// `false` when the showcase could not be attached and renders static
    animated: bool,
}

/// Application state
pub struct App {
    pub config: AppConfig,
    pub catalogue: Catalogue,
    pub routes: RouteTable,
    pub keymap: Keymap,
    pub theme: Theme,
    pub timeline: ScrollTimeline<TerminalSurface>,
    scene: Option<Scene>,
    pub viewport: Viewport,
    pub metrics: LayoutMetrics,
    /// Terminal area above the status bar
    pub content_area: Rect,
    pub mode: Mode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    pub pointer: Option<(u16, u16)>,
    /// Tilt of the active card toward the pointer
    pub tilt: Tilt,
}

impl App {
    /// Build the app for a `width` x `height` terminal and mount the
    /// configured scene
    pub fn new(config: AppConfig, catalogue: Catalogue, width: u16, height: u16) -> Result<Self> {
        let content_area = content_area_for(width, height);
        let viewport = Viewport::new(
            f64::from(content_area.width),
            f64::from(content_area.height),
            PointerKind::Fine,
        );
        let metrics = config.responsive.resolve(&viewport);
        let routes = RouteTable::from_catalogue(&catalogue, config.ui.store);
        let keymap = Keymap::from_config(&config.keymap);
        let surface = TerminalSurface::new(f64::from(content_area.height));
        let mode = config.ui.mode;

        let mut app = Self {
            config,
            catalogue,
            routes,
            keymap,
            theme: Theme::default(),
            timeline: ScrollTimeline::new(surface),
            scene: None,
            viewport,
            metrics,
            content_area,
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            pending_key: None,
            pointer: None,
            tilt: Tilt::default(),
        };
        app.mount(mode)?;
        Ok(app)
    }

    /// Plan `kind` for the catalogue and connect it to the showcase section
    ///
    /// A showcase that cannot be attached degrades to static slides.
    pub fn mount(&mut self, kind: SceneKind) -> Result<()> {
        self.attach_scene(kind)?;
        // Deliver the initial progress before the first draw
        self.timeline.frame(0.0);
        Ok(())
    }

    fn attach_scene(&mut self, kind: SceneKind) -> Result<()> {
        if self.scene.is_some() {
            self.unmount();
        }

        let plan = ScenePlan::build(kind, &self.config, &self.catalogue.weights(), &self.metrics)?;
        let choreo = Rc::new(RefCell::new(
            plan.choreographer(VisualBuffer::new(plan.slides.len()))?,
        ));

        let snapshot = Rc::new(Cell::new(None));
        let sink = Rc::clone(&snapshot);
        choreo
            .borrow_mut()
            .subscribe(Box::new(move |s: &ChoreoSnapshot| sink.set(Some(*s))));

        let animated = match Choreographer::connect(&choreo, &mut self.timeline, SHOWCASE, plan.timeline)
        {
            Ok(handle) => {
                debug!(scene = %kind, section = handle.section().0, "Mounted scene");
                true
            }
            Err(Error::NotAttachable(reason)) => {
                warn!(scene = %kind, %reason, "Showcase not attachable, rendering static slides");
                choreo.borrow_mut().render_static();
                false
            }
            Err(e) => return Err(e.into()),
        };

        self.scene = Some(Scene {
            kind,
            choreo,
            snapshot,
            animated,
        });
        Ok(())
    }

    /// Dispose the mounted scene, if any
    pub fn unmount(&mut self) {
        if let Some(scene) = self.scene.take() {
            scene.choreo.borrow_mut().dispose(&mut self.timeline);
            debug!(scene = %scene.kind, "Unmounted scene");
        }
    }

    /// Unmount and mount `kind` again, keeping the scroll position
    pub fn remount(&mut self, kind: SceneKind) -> Result<()> {
        let scroll = self.timeline.surface().scroll();
        self.unmount();
        self.attach_scene(kind)?;
        self.timeline.surface_mut().scroll_to(scroll);
        self.timeline.notify_scroll();
        self.timeline.frame(0.0);
        Ok(())
    }

    pub fn toggle_mode(&mut self) -> Result<()> {
        let next = self.scene_kind().unwrap_or_default().toggle();
        self.remount(next)?;
        info!(scene = %next, "Switched scene");
        self.set_status(format!("Scene: {next}"));
        Ok(())
    }

    /// Apply a terminal resize
    ///
    /// Re-pins the showcase. A changed slide offset, a showcase that was not
    /// attachable before, or one that just lost its height triggers a full
    /// remount; the last case falls back to static slides.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.content_area = content_area_for(width, height);
        self.viewport = Viewport::new(
            f64::from(self.content_area.width),
            f64::from(self.content_area.height),
            self.viewport.pointer,
        );
        let metrics = self.config.responsive.resolve(&self.viewport);
        self.timeline
            .surface_mut()
            .set_viewport_height(f64::from(self.content_area.height));

        let offset_changed = metrics.slide_offset != self.metrics.slide_offset;
        self.metrics = metrics;
        self.tilt = Tilt::default();

        match self.scene.as_ref().map(|s| (s.kind, s.animated)) {
            Some((kind, true)) if !offset_changed => {
                let lost = self.timeline.notify_resize();
                if lost.is_empty() {
                    if let Some(scene) = &self.scene {
                        scene.choreo.borrow_mut().set_ring_radius(metrics.radius);
                    }
                    self.timeline.frame(0.0);
                } else {
                    debug!(scene = %kind, "Showcase lost its height, remounting");
                    self.remount(kind)?;
                }
            }
            Some((kind, _)) => self.remount(kind)?,
            None => self.mount(self.config.ui.mode)?,
        }
        trace!(width, height, "Resized");
        Ok(())
    }

    /// Advance one frame: deliver progress, apply idle snaps and step the
    /// ring spring. Returns `true` while the ring is still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.timeline.frame(dt);
        if self.timeline.apply_snap() {
            trace!("Snapped to slide rest point");
        }
        match &self.scene {
            Some(scene) => scene.choreo.borrow_mut().frame(dt),
            None => false,
        }
    }

    pub fn scene_kind(&self) -> Option<SceneKind> {
        self.scene.as_ref().map(|s| s.kind)
    }

    /// Whether the showcase is driven by scroll (not the static fallback)
    pub fn is_animated(&self) -> bool {
        self.scene.as_ref().is_some_and(|s| s.animated)
    }

    pub fn snapshot(&self) -> Option<ChoreoSnapshot> {
        self.scene.as_ref().and_then(|s| s.snapshot.get())
    }

    pub fn current_index(&self) -> usize {
        self.snapshot().map_or(0, |s| s.current_index)
    }

    pub fn progress(&self) -> f64 {
        self.snapshot().map_or(0.0, |s| s.progress)
    }

    pub fn total(&self) -> usize {
        self.catalogue.len()
    }

    pub fn current_entry(&self) -> Option<&CatalogueEntry> {
        self.catalogue.get(self.current_index())
    }

    /// Latest visual state of every slide
    pub fn visual_states(&self) -> Vec<VisualState> {
        match &self.scene {
            Some(scene) => scene.choreo.borrow().target().states().to_vec(),
            None => Vec::new(),
        }
    }

    /// Ring placement of every card; empty outside the carousel
    pub fn circular_positions(&self) -> Vec<CircularPosition> {
        match &self.scene {
            Some(scene) => scene.choreo.borrow().circular_positions(),
            None => Vec::new(),
        }
    }

    pub fn accepts_pointer(&self, index: usize) -> bool {
        self.scene
            .as_ref()
            .is_some_and(|s| !s.animated || s.choreo.borrow().accepts_pointer(index))
    }

    pub fn section_view(&self, section: SectionId) -> Option<SectionView> {
        let surface = self.timeline.surface();
        let top = surface.screen_top(section)?;
        let geometry = surface.section_geometry(section)?;
        Some(SectionView {
            top,
            width: f64::from(self.content_area.width),
            height: geometry.height,
            clip: self.content_area,
        })
    }

    pub fn scroll_rows(&mut self, delta: f64) {
        self.timeline.surface_mut().scroll_by(delta);
        self.timeline.notify_scroll();
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.timeline.surface_mut().scroll_to(offset);
        self.timeline.notify_scroll();
    }

    pub fn page_rows(&self) -> f64 {
        f64::from(self.content_area.height.max(1))
    }

    /// Scroll to the rest point of slide `index`
    pub fn go_to_slide(&mut self, index: usize) {
        let total = self.total();
        if total == 0 {
            return;
        }
        let index = index.min(total - 1);
        let Some((handle, rest)) = self.scene.as_ref().and_then(|s| {
            let choreo = s.choreo.borrow();
            let rest = rest_points(choreo.windows()).get(index).copied()?;
            Some((choreo.handle()?, rest))
        }) else {
            return;
        };
        let span = self.timeline.span(handle);
        let top = self
            .timeline
            .surface()
            .section_geometry(SHOWCASE)
            .map(|g| g.top);
        if let (Some(span), Some(top)) = (span, top) {
            self.scroll_to(top + span * rest.progress);
        }
    }

    /// Whether the showcase has not reached the top of the viewport yet
    fn before_showcase(&self) -> bool {
        self.timeline
            .surface()
            .screen_top(SHOWCASE)
            .is_some_and(|top| top > 0.0)
    }

    pub fn next_slide(&mut self) {
        let target = if self.before_showcase() {
            0
        } else {
            self.current_index() + 1
        };
        self.go_to_slide(target);
    }

    pub fn prev_slide(&mut self) {
        if !self.before_showcase() {
            self.go_to_slide(self.current_index().saturating_sub(1));
        }
    }

    pub fn jump_to_top(&mut self) {
        self.scroll_to(0.0);
    }

    pub fn jump_to_bottom(&mut self) {
        let max = self.timeline.surface().max_scroll();
        self.scroll_to(max);
    }

    /// Card placements for the visible showcase, in draw order
    pub fn placements(&self) -> Vec<CardPlacement> {
        match self.section_view(SHOWCASE) {
            Some(view) => card_placements(self, &view),
            None => Vec::new(),
        }
    }

    /// Topmost card under a screen cell
    pub fn card_at(&self, x: u16, y: u16) -> Option<usize> {
        self.placements()
            .iter()
            .rev()
            .find(|p| p.area.contains((x, y).into()))
            .map(|p| p.index)
    }

    /// Track the pointer and update the active card's tilt
    pub fn pointer_moved(&mut self, x: u16, y: u16) {
        self.pointer = Some((x, y));
        self.tilt = Tilt::default();
        if !self.viewport.tilt_enabled() {
            return;
        }
        let current = self.current_index();
        if let Some(card) = self.placements().into_iter().find(|p| p.index == current) {
            let rect = ViewRect {
                x: f64::from(card.area.x),
                y: f64::from(card.area.y),
                width: f64::from(card.area.width),
                height: f64::from(card.area.height),
            };
            self.tilt = tilt_for(
                f64::from(x) + 0.5,
                f64::from(y) + 0.5,
                rect,
                self.config.ui.tilt_max_deg,
            );
        }
    }

    /// Handle a click; returns the route to follow when the active card was hit
    ///
    /// Clicking another carousel card rotates the ring to it instead.
    pub fn click(&mut self, x: u16, y: u16) -> Option<Route> {
        let index = self.card_at(x, y)?;
        if self.accepts_pointer(index) {
            return self.route_for(index);
        }
        if self.scene_kind() == Some(SceneKind::Carousel) {
            self.go_to_slide(index);
        }
        None
    }

    pub fn route_for(&self, index: usize) -> Option<Route> {
        let entry = self.catalogue.get(index)?;
        self.routes.lookup(&entry.id).cloned()
    }

    pub fn route_for_current(&self) -> Option<Route> {
        self.route_for(self.current_index())
    }

    /// Switch between fine (tilt) and coarse (no tilt) pointer
    pub fn toggle_pointer(&mut self) {
        self.viewport.pointer = match self.viewport.pointer {
            PointerKind::Fine => PointerKind::Coarse,
            PointerKind::Coarse => PointerKind::Fine,
        };
        self.metrics.tilt_enabled = self.viewport.tilt_enabled();
        self.tilt = Tilt::default();
        let label = match self.viewport.pointer {
            PointerKind::Fine => "fine (tilt on)",
            PointerKind::Coarse => "coarse (tilt off)",
        };
        self.set_status(format!("Pointer: {label}"));
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn content_area_for(width: u16, height: u16) -> Rect {
    // Last row belongs to the status bar
    Rect::new(0, 0, width, height.saturating_sub(1))
}
