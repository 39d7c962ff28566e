use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::surface::{INTRO, OUTRO};

/// Hero block above the showcase
pub struct IntroWidget;

impl IntroWidget {
    pub fn render(frame: &mut Frame, app: &App) {
        let Some(view) = app.section_view(INTRO) else {
            return;
        };
        let Some(area) = view.visible_area() else {
            return;
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "appreel",
                Style::default()
                    .fg(app.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} apps, one scroll away", app.catalogue.len()),
                Style::default().fg(app.theme.fg0),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "scroll, j/k or the wheel to explore",
                Style::default().fg(app.theme.grey1),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .scroll((view.rows_hidden(), 0)),
            area,
        );
    }
}

/// Footer below the showcase
pub struct OutroWidget;

impl OutroWidget {
    pub fn render(frame: &mut Frame, app: &App) {
        let Some(view) = app.section_view(OUTRO) else {
            return;
        };
        let Some(area) = view.visible_area() else {
            return;
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "That's the whole lineup.",
                Style::default().fg(app.theme.fg1).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} to go back up, {} for the other view", app.config.keymap.jump_to_top, app.config.keymap.toggle_mode),
                Style::default().fg(app.theme.grey1),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .scroll((view.rows_hidden(), 0)),
            area,
        );
    }
}
