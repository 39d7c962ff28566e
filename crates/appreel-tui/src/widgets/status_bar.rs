use appreel_core::PointerKind;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let mode_str = match app.mode {
            Mode::Help => "HELP".to_string(),
            Mode::Normal if !app.is_animated() => "STATIC".to_string(),
            Mode::Normal => app
                .scene_kind()
                .map(|k| k.label().to_uppercase())
                .unwrap_or_default(),
        };
        let pointer_str = match app.viewport.pointer {
            PointerKind::Fine => "tilt",
            PointerKind::Coarse => "touch",
        };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            let counter = app
                .snapshot()
                .map(|s| s.counter_label())
                .unwrap_or_else(|| "-- / --".to_string());
            let name = app.current_entry().map(|e| e.name.as_str()).unwrap_or("");
            format!(
                " {} | {} | {} {} | {:>3.0}%",
                mode_str,
                pointer_str,
                counter,
                name,
                app.progress() * 100.0
            )
        };

        let help_hint = " q:quit j/k:scroll h/l:slide ⏎:open ⇥:view ?:help ";
        let used = status_text.chars().count() + help_hint.chars().count();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(app.theme.fg0).bg(app.theme.bg2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(app.theme.bg2)),
            Span::styled(
                help_hint,
                Style::default().fg(app.theme.grey2).bg(app.theme.bg2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
