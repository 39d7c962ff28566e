//! Terminal scroll surface
//!
//! A virtual document of stacked sections measured in terminal rows. Pinning
//! a section inserts `span` rows of scroll distance after it, during which
//! the section stays stuck to the top of the viewport.

use std::collections::BTreeMap;

use appreel_core::choreo::{ScrollSurface, SectionGeometry, SectionId};

/// Hero text above the showcase
pub const INTRO: SectionId = SectionId(0);
/// Pinned carousel / slideshow
pub const SHOWCASE: SectionId = SectionId(1);
/// Footer below the showcase
pub const OUTRO: SectionId = SectionId(2);

/// Section heights as fractions of the viewport
const LAYOUT: [(SectionId, f64); 3] = [(INTRO, 0.6), (SHOWCASE, 1.0), (OUTRO, 0.6)];

/// Below this many rows the showcase collapses and cannot be pinned
pub const MIN_SHOWCASE_ROWS: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct TerminalSurface {
    viewport_height: f64,
    scroll: f64,
    pins: BTreeMap<SectionId, f64>,
}

impl TerminalSurface {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height: viewport_height.max(0.0),
            scroll: 0.0,
            pins: BTreeMap::new(),
        }
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Change the viewport height; the caller re-pins via `notify_resize`
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    /// Scroll by `delta` rows, clamped to the document
    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll = (self.scroll + delta).clamp(0.0, self.max_scroll());
    }

    pub fn pin_span(&self, section: SectionId) -> Option<f64> {
        self.pins.get(&section).copied()
    }

    fn base_height(&self, section: SectionId) -> Option<f64> {
        if section == SHOWCASE && self.viewport_height < MIN_SHOWCASE_ROWS {
            return Some(0.0);
        }
        LAYOUT
            .iter()
            .find(|(id, _)| *id == section)
            .map(|(_, share)| (share * self.viewport_height).round())
    }

    /// Total scrollable height including pin spacing
    pub fn document_height(&self) -> f64 {
        LAYOUT
            .iter()
            .map(|(id, _)| self.base_height(*id).unwrap_or(0.0) + self.pin_span(*id).unwrap_or(0.0))
            .sum()
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Row of the viewport where `section` currently starts
    ///
    /// Negative when the section has scrolled past the top. Pinned sections
    /// stay at 0 for the whole pin span.
    pub fn screen_top(&self, section: SectionId) -> Option<f64> {
        let geometry = self.section_geometry(section)?;
        let relative = geometry.top - self.scroll;
        match self.pin_span(section) {
            Some(span) if relative <= 0.0 => Some((relative + span).min(0.0)),
            _ => Some(relative),
        }
    }
}

impl ScrollSurface for TerminalSurface {
    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn section_geometry(&self, section: SectionId) -> Option<SectionGeometry> {
        let mut top = 0.0;
        for (id, _) in LAYOUT {
            let height = self.base_height(id)?;
            if id == section {
                return Some(SectionGeometry { top, height });
            }
            top += height + self.pin_span(id).unwrap_or(0.0);
        }
        None
    }

    fn pin(&mut self, section: SectionId, span: f64) {
        self.pins.insert(section, span);
    }

    fn unpin(&mut self, section: SectionId) {
        self.pins.remove(&section);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn scroll_to(&mut self, offset: f64) {
        self.scroll = offset.clamp(0.0, self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_geometry_stacks() {
        let surface = TerminalSurface::new(40.0);
        let intro = surface.section_geometry(INTRO).unwrap();
        let showcase = surface.section_geometry(SHOWCASE).unwrap();
        let outro = surface.section_geometry(OUTRO).unwrap();
        assert_eq!(intro.top, 0.0);
        assert_eq!(showcase.top, 24.0);
        assert_eq!(outro.top, 64.0);
        assert!(surface.section_geometry(SectionId(9)).is_none());
    }

    #[test]
    fn test_pin_extends_document() {
        let mut surface = TerminalSurface::new(40.0);
        let before = surface.document_height();
        surface.pin(SHOWCASE, 320.0);
        assert_eq!(surface.document_height(), before + 320.0);
        assert_eq!(surface.section_geometry(OUTRO).unwrap().top, 64.0 + 320.0);

        surface.unpin(SHOWCASE);
        assert_eq!(surface.document_height(), before);
    }

    #[test]
    fn test_pinned_section_sticks_to_top() {
        let mut surface = TerminalSurface::new(40.0);
        surface.pin(SHOWCASE, 100.0);

        assert_eq!(surface.screen_top(SHOWCASE), Some(24.0));
        surface.scroll_to(24.0 + 50.0);
        assert_eq!(surface.screen_top(SHOWCASE), Some(0.0));
        surface.scroll_to(24.0 + 120.0);
        assert_eq!(surface.screen_top(SHOWCASE), Some(-20.0));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut surface = TerminalSurface::new(40.0);
        surface.scroll_by(-5.0);
        assert_eq!(surface.scroll(), 0.0);
        surface.scroll_by(1000.0);
        assert_eq!(surface.scroll(), surface.max_scroll());
    }

    #[test]
    fn test_small_viewport_collapses_showcase() {
        let surface = TerminalSurface::new(5.0);
        assert_eq!(surface.section_geometry(SHOWCASE).unwrap().height, 0.0);
        assert_eq!(surface.section_geometry(OUTRO).unwrap().top, 3.0);
    }

    #[test]
    fn test_zero_height_viewport() {
        let surface = TerminalSurface::new(0.0);
        assert_eq!(surface.section_geometry(SHOWCASE).unwrap().height, 0.0);
        assert_eq!(surface.max_scroll(), 0.0);
    }
}
