use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{clip_rect, fit_width, CardPlacement};
use crate::app::{App, SectionView};

/// Rows a card rises per column of ring depth
const DEPTH_LIFT: f64 = 0.08;

pub struct CarouselWidget;

impl CarouselWidget {
    /// Ring cards, back to front
    pub fn placements(app: &App, view: &SectionView) -> Vec<CardPlacement> {
        let card_height = (view.height * 0.45).clamp(5.0, 14.0);
        let center_x = f64::from(view.clip.x) + view.width / 2.0;
        let center_y = f64::from(view.clip.y) + view.top + view.height * 0.42;

        let mut placements: Vec<CardPlacement> = app
            .circular_positions()
            .iter()
            .enumerate()
            .filter_map(|(index, pos)| {
                let width = (app.metrics.card_width * pos.scale).round().max(4.0);
                let height = (card_height * pos.scale).round().max(3.0);
                let x = center_x + pos.offset_x - width / 2.0;
                let y = center_y + pos.offset_z * DEPTH_LIFT - height / 2.0;
                clip_rect(x, y, width, height, view.clip).map(|area| CardPlacement {
                    index,
                    area,
                    opacity: pos.opacity,
                    depth: pos.offset_z,
                })
            })
            .collect();
        placements.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        placements
    }

    pub fn render(frame: &mut Frame, app: &App, view: &SectionView) {
        let current = app.current_index();
        for placement in Self::placements(app, view) {
            let Some(entry) = app.catalogue.get(placement.index) else {
                continue;
            };
            let area = if placement.index == current {
                tilted(placement.area, app, view.clip)
            } else {
                placement.area
            };

            let accent = app.theme.fade(app.theme.accent_for(entry), placement.opacity);
            let fg = app.theme.fade(app.theme.fg0, placement.opacity);
            let border = if placement.index == current {
                BorderType::Thick
            } else {
                BorderType::Rounded
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(app.theme.bg1));
            let inner_width = area.width.saturating_sub(2) as usize;
            let lines = vec![
                Line::from(Span::styled(
                    fit_width(&entry.name, inner_width),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    fit_width(&entry.tagline, inner_width),
                    Style::default().fg(fg),
                )),
            ];

            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(lines)
                    .block(block)
                    .alignment(Alignment::Center),
                area,
            );
        }

        Self::render_caption(frame, app, view);
    }

    /// Name and description of the slide in focus, faded with its state
    fn render_caption(frame: &mut Frame, app: &App, view: &SectionView) {
        let states = app.visual_states();
        let Some((index, state)) = states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_visible())
            .max_by(|a, b| a.1.opacity.total_cmp(&b.1.opacity))
        else {
            return;
        };
        let Some(entry) = app.catalogue.get(index) else {
            return;
        };

        let width = (view.width * 0.6).max(20.0) * state.scale;
        let x = f64::from(view.clip.x) + (view.width - width) / 2.0;
        let y = f64::from(view.clip.y) + view.top + view.height * 0.75;
        let Some(area) = clip_rect(x, y, width, 3.0, view.clip) else {
            return;
        };

        let accent = app.theme.fade(app.theme.accent_for(entry), state.opacity);
        let fg = app.theme.fade(app.theme.fg1, state.opacity);
        let lines = vec![
            Line::from(Span::styled(
                entry.name.clone(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(entry.description.clone(), Style::default().fg(fg))),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// Nudge the active card one cell toward the pointer tilt
pub(super) fn tilted(area: Rect, app: &App, clip: Rect) -> Rect {
    let max = app.config.ui.tilt_max_deg;
    if max <= 0.0 {
        return area;
    }
    let dx = (app.tilt.rotate_y / max).round();
    let dy = (-app.tilt.rotate_x / max).round();
    clip_rect(
        f64::from(area.x) + dx,
        f64::from(area.y) + dy,
        f64::from(area.width),
        f64::from(area.height),
        clip,
    )
    .unwrap_or(area)
}
