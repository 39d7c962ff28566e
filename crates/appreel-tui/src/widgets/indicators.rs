use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, SectionView};

/// Progress rail and counter on the first row of the showcase, slide dots on
/// the last
pub struct IndicatorsWidget;

impl IndicatorsWidget {
    pub fn render(frame: &mut Frame, app: &App, view: &SectionView) {
        let Some(area) = view.visible_area() else {
            return;
        };
        let Some(snapshot) = app.snapshot() else {
            return;
        };

        let label = format!(" {} ", snapshot.counter_label());
        let rail_width = (area.width as usize).saturating_sub(label.chars().count() + 2);
        let (filled, empty) = rail(rail_width, snapshot.progress);
        let accent = app
            .current_entry()
            .map(|e| app.theme.accent_for(e))
            .unwrap_or(app.theme.accent);

        if view.top >= 0.0 {
            let top = Line::from(vec![
                Span::raw(" "),
                Span::styled(filled, Style::default().fg(accent)),
                Span::styled(empty, Style::default().fg(app.theme.bg2)),
                Span::styled(
                    label,
                    Style::default().fg(app.theme.fg1).add_modifier(Modifier::BOLD),
                ),
            ]);
            frame.render_widget(Paragraph::new(top), Rect { height: 1, ..area });
        }

        let section_bottom = f64::from(view.clip.y) + view.top + view.height;
        if area.height > 1 && section_bottom <= f64::from(area.bottom()) {
            let bottom_row = Rect {
                y: area.bottom() - 1,
                height: 1,
                ..area
            };
            let line = Line::from(Span::styled(
                dots(snapshot.total, snapshot.current_index),
                Style::default().fg(app.theme.grey2),
            ));
            frame.render_widget(
                Paragraph::new(line).alignment(Alignment::Center),
                bottom_row,
            );
        }
    }
}

/// Filled and empty parts of a `width`-cell progress rail
fn rail(width: usize, progress: f64) -> (String, String) {
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let filled = (progress * width as f64).round() as usize;
    ("━".repeat(filled), "─".repeat(width - filled))
}

/// "○ ○ ● ○" with the current slide filled
fn dots(total: usize, current: usize) -> String {
    (0..total)
        .map(|i| if i == current { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rail() {
        assert_eq!(rail(10, 0.0), (String::new(), "─".repeat(10)));
        assert_eq!(rail(10, 0.5), ("━".repeat(5), "─".repeat(5)));
        assert_eq!(rail(10, 1.0), ("━".repeat(10), String::new()));
        assert_eq!(rail(4, f64::NAN).0, "");
    }

    #[test]
    fn test_dots() {
        assert_eq!(dots(4, 2), "○ ○ ● ○");
        assert_eq!(dots(0, 0), "");
    }
}
