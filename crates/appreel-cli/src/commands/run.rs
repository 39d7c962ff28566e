use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tracing::{info, warn};

use appreel_core::{AppConfig, Catalogue, Route, SceneKind};
use appreel_tui::{
    app::{App, Mode},
    event::EventHandler,
    input::{handle_key_event, Action},
    widgets::{self, HelpWidget, IntroWidget, OutroWidget, StatusBarWidget},
};

/// Raw mode and alternate screen for as long as it lives
///
/// Restores the terminal on drop, so early returns and panics unwinding
/// through `run` leave a usable shell.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            SetTitle("appreel")
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show) {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

pub fn run(mut config: AppConfig, catalogue: Catalogue, mode: Option<SceneKind>) -> Result<()> {
    if let Some(mode) = mode {
        config.ui.mode = mode;
    }

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(config, catalogue, size.width, size.height)?;
    let events = EventHandler::new(app.config.ui.fps);
    info!(
        apps = app.total(),
        scene = ?app.scene_kind(),
        animated = app.is_animated(),
        "Showcase started"
    );

    let mut last_frame = Instant::now();
    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &app))?;

        let batch = events.next_frame()?;
        if let Some((width, height)) = batch.resize {
            app.resize(width, height)?;
        }
        for key in batch.keys {
            let action = handle_key_event(key, &app);
            handle_action(&mut app, action)?;
            if app.should_quit {
                break;
            }
        }
        if batch.wheel != 0 {
            app.scroll_rows(f64::from(batch.wheel) * app.config.ui.scroll_step);
        }
        if let Some((x, y)) = batch.pointer {
            app.pointer_moved(x, y);
        }
        for (x, y) in batch.clicks {
            if let Some(route) = app.click(x, y) {
                follow_route(&mut app, &route);
            }
        }

        let now = Instant::now();
        app.tick(now.duration_since(last_frame).as_secs_f64());
        last_frame = now;
    }

    app.unmount();
    info!("Showcase closed");
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg0)), size);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);

    if app.is_animated() {
        IntroWidget::render(frame, app);
        OutroWidget::render(frame, app);
    }
    widgets::render_showcase(frame, app);
    StatusBarWidget::render(frame, main_layout[1], app);

    if app.mode == Mode::Help {
        HelpWidget::render(frame, app);
    }
}

fn handle_action(app: &mut App, action: Action) -> Result<()> {
    if action != Action::PendingG {
        app.clear_pending_key();
    }
    if action != Action::None {
        app.clear_status();
    }

    match action {
        Action::Quit => app.should_quit = true,
        Action::ScrollDown => app.scroll_rows(app.config.ui.scroll_step),
        Action::ScrollUp => app.scroll_rows(-app.config.ui.scroll_step),
        Action::PageDown => app.scroll_rows(app.page_rows()),
        Action::PageUp => app.scroll_rows(-app.page_rows()),
        Action::NextSlide => app.next_slide(),
        Action::PrevSlide => app.prev_slide(),
        Action::JumpToTop => app.jump_to_top(),
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::PendingG => app.pending_key = Some('g'),
        Action::Open => match app.route_for_current() {
            Some(route) => follow_route(app, &route),
            None => app.set_status("Nothing to open"),
        },
        Action::ToggleMode => app.toggle_mode()?,
        Action::TogglePointer => app.toggle_pointer(),
        Action::Help => app.mode = Mode::Help,
        Action::ExitMode => app.mode = Mode::Normal,
        Action::None => {}
    }
    Ok(())
}

fn follow_route(app: &mut App, route: &Route) {
    match route {
        Route::External(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status(format!("Opening: {}", url));
            }
        }
        Route::Detail { path } => app.set_status(format!("Detail page: {}", path)),
    }
}
