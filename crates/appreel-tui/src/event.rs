use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

/// Event handler for terminal events, paced to the frame rate
pub struct EventHandler {
    frame_interval: Duration,
}

impl EventHandler {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Collect every event that arrives before the next frame is due
    ///
    /// Blocks for at most one frame interval. Bursts of wheel events land in
    /// a single batch, so the choreography sees one scroll per frame.
    pub fn next_frame(&self) -> Result<FrameEvents> {
        let deadline = Instant::now() + self.frame_interval;
        let mut events = FrameEvents::default();
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            events.push(event::read()?);
            if timeout.is_zero() {
                break;
            }
        }
        Ok(events)
    }
}

/// Terminal input coalesced over one frame
#[derive(Debug, Default)]
pub struct FrameEvents {
    /// Key presses in arrival order
    pub keys: Vec<KeyEvent>,
    /// Net wheel notches; positive scrolls down
    pub wheel: i32,
    /// Last pointer position seen
    pub pointer: Option<(u16, u16)>,
    /// Left-button presses
    pub clicks: Vec<(u16, u16)>,
    /// Last terminal size reported
    pub resize: Option<(u16, u16)>,
}

impl FrameEvents {
    pub fn push(&mut self, event: Event) {
        match event {
            // Only key presses; some terminals also report releases
            Event::Key(key) if key.kind == KeyEventKind::Press => self.keys.push(key),
            Event::Mouse(mouse) => self.push_mouse(mouse),
            Event::Resize(w, h) => self.resize = Some((w, h)),
            _ => {}
        }
    }

    fn push_mouse(&mut self, mouse: MouseEvent) {
        let position = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollDown => self.wheel += 1,
            MouseEventKind::ScrollUp => self.wheel -= 1,
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer = Some(position),
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some(position);
                self.clicks.push(position);
            }
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
            && self.wheel == 0
            && self.pointer.is_none()
            && self.clicks.is_empty()
            && self.resize.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_wheel_bursts_coalesce() {
        let mut events = FrameEvents::default();
        for _ in 0..5 {
            events.push(mouse(MouseEventKind::ScrollDown, 0, 0));
        }
        events.push(mouse(MouseEventKind::ScrollUp, 0, 0));
        assert_eq!(events.wheel, 4);
    }

    #[test]
    fn test_last_pointer_and_resize_win() {
        let mut events = FrameEvents::default();
        events.push(mouse(MouseEventKind::Moved, 1, 1));
        events.push(mouse(MouseEventKind::Moved, 7, 3));
        events.push(Event::Resize(80, 24));
        events.push(Event::Resize(100, 30));
        events.push(mouse(MouseEventKind::Down(MouseButton::Left), 9, 4));
        assert_eq!(events.pointer, Some((9, 4)));
        assert_eq!(events.clicks, vec![(9, 4)]);
        assert_eq!(events.resize, Some((100, 30)));
    }

    #[test]
    fn test_key_release_ignored() {
        let mut events = FrameEvents::default();
        events.push(Event::Key(KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }));
        assert!(events.is_empty());
        events.push(Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)));
        assert_eq!(events.keys.len(), 1);
    }
}
