use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use super::{clip_rect, fit_width, CardPlacement};
use crate::app::{App, SectionView};

/// Degraded showcase for terminals too small to pin it: every slide at
/// rest, one row each from the top of the content area
pub struct StaticListWidget;

impl StaticListWidget {
    pub fn placements(app: &App, view: &SectionView) -> Vec<CardPlacement> {
        let x = f64::from(view.clip.x);
        let top = f64::from(view.clip.y);
        let width = f64::from(view.clip.width);

        app.visual_states()
            .iter()
            .enumerate()
            .filter_map(|(index, state)| {
                clip_rect(x, top + index as f64, width, 1.0, view.clip).map(|area| CardPlacement {
                    index,
                    area,
                    opacity: state.opacity,
                    depth: 0.0,
                })
            })
            .collect()
    }

    pub fn render(frame: &mut Frame, app: &App, view: &SectionView) {
        for placement in Self::placements(app, view) {
            let Some(entry) = app.catalogue.get(placement.index) else {
                continue;
            };
            let accent = app.theme.fade(app.theme.accent_for(entry), placement.opacity);
            let fg = app.theme.fade(app.theme.fg0, placement.opacity);
            let name_width = entry.name.chars().count() + 3;
            let rest = (placement.area.width as usize).saturating_sub(name_width);

            let line = Line::from(vec![
                Span::styled(
                    entry.name.clone(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" - ", Style::default().fg(app.theme.grey1)),
                Span::styled(fit_width(&entry.tagline, rest), Style::default().fg(fg)),
            ]);

            frame.render_widget(Clear, placement.area);
            frame.render_widget(Paragraph::new(line), placement.area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appreel_core::{AppConfig, Catalogue};

    #[test]
    fn test_static_rows_fill_content() {
        let app = App::new(AppConfig::default(), Catalogue::builtin(), 100, 6).unwrap();
        assert!(!app.is_animated());

        let placements = app.placements();
        assert_eq!(placements.len(), 5);
        assert!(placements.iter().all(|p| p.opacity == 1.0));
        assert_eq!(placements[4].area.y, 4);
    }
}
