use appreel_core::{CatalogueEntry, Platform};
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::carousel::tilted;
use super::{clip_rect, fit_width, CardPlacement};
use crate::app::{App, SectionView};

pub struct SlideshowWidget;

impl SlideshowWidget {
    /// Visible slides, faintest first
    pub fn placements(app: &App, view: &SectionView) -> Vec<CardPlacement> {
        let base_width = (view.width * 0.7).clamp(20.0, 90.0);
        let base_height = (view.height * 0.6).clamp(5.0, 18.0);
        let center_x = f64::from(view.clip.x) + view.width / 2.0;
        let center_y = f64::from(view.clip.y) + view.top + view.height / 2.0;

        let mut placements: Vec<CardPlacement> = app
            .visual_states()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_visible())
            .filter_map(|(index, s)| {
                let width = (base_width * s.scale).round();
                let height = (base_height * s.scale).round();
                let x = center_x - width / 2.0 + s.translate_x;
                let y = center_y - height / 2.0 + s.translate_y;
                clip_rect(x, y, width, height, view.clip).map(|area| CardPlacement {
                    index,
                    area,
                    opacity: s.opacity,
                    depth: s.opacity,
                })
            })
            .collect();
        placements.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        placements
    }

    pub fn render(frame: &mut Frame, app: &App, view: &SectionView) {
        let current = app.current_index();
        let total = app.total();
        for placement in Self::placements(app, view) {
            let Some(entry) = app.catalogue.get(placement.index) else {
                continue;
            };
            let area = if placement.index == current {
                tilted(placement.area, app, view.clip)
            } else {
                placement.area
            };
            let opacity = placement.opacity;
            let accent = app.theme.fade(app.theme.accent_for(entry), opacity);
            let fg = app.theme.fade(app.theme.fg0, opacity);
            let muted = app.theme.fade(app.theme.grey1, opacity);
            let inner_width = area.width.saturating_sub(4) as usize;

            let block = Block::default()
                .title(Line::from(Span::styled(
                    format!(" {:02} / {:02} ", placement.index + 1, total),
                    Style::default().fg(muted),
                )))
                .title_alignment(Alignment::Right)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(app.theme.bg1));

            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    fit_width(&entry.name, inner_width),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    fit_width(&entry.tagline, inner_width),
                    Style::default().fg(fg).add_modifier(Modifier::ITALIC),
                )),
                Line::from(""),
                Line::from(Span::styled(entry.description.clone(), Style::default().fg(fg))),
                Line::from(""),
            ];
            if let Some(stores) = store_line(entry) {
                lines.push(Line::from(Span::styled(stores, Style::default().fg(muted))));
            }

            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(lines)
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                area,
            );
        }
    }
}

/// "App Store · Google Play" for the stores an entry is published on
pub(super) fn store_line(entry: &CatalogueEntry) -> Option<String> {
    let stores: Vec<&str> = entry
        .platforms
        .iter()
        .map(|p| match p {
            Platform::Ios => "App Store",
            Platform::Android => "Google Play",
        })
        .collect();
    (!stores.is_empty()).then(|| stores.join(" · "))
}
