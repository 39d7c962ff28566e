use std::collections::HashMap;
use std::str::FromStr;

use appreel_core::config::KeymapConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::input::Action;

/// Keys that work whatever the configuration says, unless a configured
/// binding already claimed them
const BUILTIN: [(KeyCode, Action); 8] = [
    (KeyCode::Down, Action::ScrollDown),
    (KeyCode::Up, Action::ScrollUp),
    (KeyCode::Right, Action::NextSlide),
    (KeyCode::Left, Action::PrevSlide),
    (KeyCode::PageDown, Action::PageDown),
    (KeyCode::PageUp, Action::PageUp),
    (KeyCode::Home, Action::JumpToTop),
    (KeyCode::End, Action::JumpToBottom),
];

/// A key press as the keymap sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

/// Vim-style notation: `j`, `G` (shifted), `<C-d>`, `<S-Tab>`, `<A-x>`,
/// `<CR>`, `<PageDown>`, `<F5>`
impl FromStr for KeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(inner) = s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) else {
            let c = single_char(s).ok_or_else(|| format!("'{s}' is not a single key"))?;
            let modifiers = if c.is_ascii_uppercase() {
                KeyModifiers::SHIFT
            } else {
                KeyModifiers::NONE
            };
            return Ok(Self::new(KeyCode::Char(c), modifiers));
        };

        let mut modifiers = KeyModifiers::NONE;
        let mut name = inner;
        while let Some((prefix, rest)) = name.split_once('-').filter(|(_, r)| !r.is_empty()) {
            modifiers |= match prefix {
                "C" | "c" => KeyModifiers::CONTROL,
                "S" | "s" => KeyModifiers::SHIFT,
                "A" | "a" | "M" | "m" => KeyModifiers::ALT,
                _ => return Err(format!("unknown modifier '{prefix}' in '{s}'")),
            };
            name = rest;
        }
        let code = key_code(name).ok_or_else(|| format!("unknown key '{name}' in '{s}'"))?;
        Ok(Self::new(code, modifiers))
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn key_code(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "bs" | "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        lower => {
            if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=12).contains(&n).then_some(KeyCode::F(n));
            }
            return single_char(name).map(|c| KeyCode::Char(c.to_ascii_lowercase()));
        }
    };
    Some(code)
}

/// Key to action lookup built from `[keymap]`
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
    /// Action bound to the two-key "gg" sequence
    sequence: Option<Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    /// Earlier entries win when two actions claim the same key
    pub fn from_config(config: &KeymapConfig) -> Self {
        let configured = [
            (&config.quit, Action::Quit),
            (&config.scroll_down, Action::ScrollDown),
            (&config.scroll_up, Action::ScrollUp),
            (&config.page_down, Action::PageDown),
            (&config.page_up, Action::PageUp),
            (&config.next_slide, Action::NextSlide),
            (&config.prev_slide, Action::PrevSlide),
            (&config.jump_to_top, Action::JumpToTop),
            (&config.jump_to_bottom, Action::JumpToBottom),
            (&config.open, Action::Open),
            (&config.toggle_mode, Action::ToggleMode),
            (&config.toggle_pointer, Action::TogglePointer),
            (&config.help, Action::Help),
        ];

        let mut keymap = Self {
            bindings: HashMap::new(),
            sequence: None,
        };
        for (notation, action) in configured {
            if notation == "gg" {
                keymap.sequence = Some(action);
                continue;
            }
            match notation.parse::<KeyBinding>() {
                Ok(binding) => match keymap.bindings.get(&binding) {
                    Some(existing) => warn!(
                        key = %notation,
                        ?existing,
                        ignored = ?action,
                        "Key already bound"
                    ),
                    None => {
                        keymap.bindings.insert(binding, action);
                    }
                },
                Err(e) => warn!("Ignoring key binding: {}", e),
            }
        }

        for (code, action) in BUILTIN {
            keymap
                .bindings
                .entry(KeyBinding::plain(code))
                .or_insert(action);
        }
        keymap.bindings.insert(
            KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::Quit,
        );
        keymap
            .bindings
            .insert(KeyBinding::plain(KeyCode::Esc), Action::ExitMode);
        keymap
    }

    pub fn action_for(&self, binding: &KeyBinding) -> Option<Action> {
        self.bindings.get(binding).copied()
    }

    /// Action completed by pressing `g` twice
    pub fn sequence_action(&self) -> Option<Action> {
        self.sequence
    }

    /// Whether `binding` is the `g` that starts (or completes) the sequence
    pub fn starts_sequence(&self, binding: &KeyBinding) -> bool {
        self.sequence.is_some() && *binding == KeyBinding::plain(KeyCode::Char('g'))
    }
}
