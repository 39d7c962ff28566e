use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

pub struct HelpWidget;

impl HelpWidget {
    pub fn render(frame: &mut Frame, app: &App) {
        let keys = &app.config.keymap;
        let rows: [(&str, &str); 12] = [
            (keys.scroll_down.as_str(), "scroll down"),
            (keys.scroll_up.as_str(), "scroll up"),
            (keys.page_down.as_str(), "page down"),
            (keys.page_up.as_str(), "page up"),
            (keys.next_slide.as_str(), "next slide"),
            (keys.prev_slide.as_str(), "previous slide"),
            (keys.jump_to_top.as_str(), "top"),
            (keys.jump_to_bottom.as_str(), "bottom"),
            (keys.open.as_str(), "open store page"),
            (keys.toggle_mode.as_str(), "carousel / slideshow"),
            (keys.toggle_pointer.as_str(), "pointer tilt on / off"),
            (keys.quit.as_str(), "quit"),
        ];

        let lines: Vec<Line> = rows
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>8}  ", key),
                        Style::default()
                            .fg(app.theme.yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*what, Style::default().fg(app.theme.fg0)),
                ])
            })
            .collect();

        let area = frame.area();
        let width = 44u16.min(area.width.saturating_sub(4));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(" Keys ")
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.accent))
                    .style(Style::default().bg(app.theme.bg1)),
            ),
            popup_area,
        );
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
