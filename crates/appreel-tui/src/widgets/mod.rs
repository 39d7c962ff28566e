mod carousel;
mod help;
mod indicators;
mod page;
mod slideshow;
mod static_list;
mod status_bar;

pub use carousel::CarouselWidget;
pub use help::HelpWidget;
pub use indicators::IndicatorsWidget;
pub use page::{IntroWidget, OutroWidget};
pub use slideshow::SlideshowWidget;
pub use static_list::StaticListWidget;
pub use status_bar::StatusBarWidget;

use appreel_core::SceneKind;
use ratatui::{layout::Rect, Frame};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, SectionView};
use crate::surface::SHOWCASE;

/// Screen placement of one showcase card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub index: usize,
    pub area: Rect,
    pub opacity: f64,
    /// Draw order key; larger is closer to the viewer
    pub depth: f64,
}

/// Card placements for the mounted scene, back to front
pub fn card_placements(app: &App, view: &SectionView) -> Vec<CardPlacement> {
    if !app.is_animated() {
        return StaticListWidget::placements(app, view);
    }
    match app.scene_kind() {
        Some(SceneKind::Carousel) => CarouselWidget::placements(app, view),
        Some(SceneKind::Slideshow) => SlideshowWidget::placements(app, view),
        None => Vec::new(),
    }
}

/// Render the showcase section with whichever scene is mounted
pub fn render_showcase(frame: &mut Frame, app: &App) {
    let Some(view) = app.section_view(SHOWCASE) else {
        return;
    };
    if !app.is_animated() {
        StaticListWidget::render(frame, app, &view);
        return;
    }
    if view.visible_area().is_none() {
        return;
    }
    match app.scene_kind() {
        Some(SceneKind::Carousel) => CarouselWidget::render(frame, app, &view),
        Some(SceneKind::Slideshow) => SlideshowWidget::render(frame, app, &view),
        None => {}
    }
    IndicatorsWidget::render(frame, app, &view);
}

/// Round a float rectangle to cells and clip it to `clip`
pub(crate) fn clip_rect(x: f64, y: f64, width: f64, height: f64, clip: Rect) -> Option<Rect> {
    let x0 = x.round().max(f64::from(clip.x));
    let y0 = y.round().max(f64::from(clip.y));
    let x1 = (x + width).round().min(f64::from(clip.right()));
    let y1 = (y + height).round().min(f64::from(clip.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}

/// Truncate to at most `max_width` terminal columns, with an ellipsis
pub(crate) fn fit_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
