use appreel_core::CatalogueEntry;
use ratatui::style::Color;

/// Runtime theme (Gruvbox Material dark)
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,
    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey1: Color,
    pub grey2: Color,

    pub red: Color,
    pub yellow: Color,
    pub green: Color,

    pub accent: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            red: Color::Rgb(0xea, 0x69, 0x62),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            info: Color::Rgb(0x7d, 0xae, 0xa3),
        }
    }
}

impl Theme {
    /// Accent colour of a catalogue entry, or the theme accent
    pub fn accent_for(&self, entry: &CatalogueEntry) -> Color {
        entry
            .accent_rgb()
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(self.accent)
    }

    /// `color` shown at `opacity` over the page background
    pub fn fade(&self, color: Color, opacity: f64) -> Color {
        blend(self.bg0, color, opacity)
    }
}

/// Linear mix from `from` (t = 0) to `to` (t = 1); non-RGB colours snap
pub fn blend(from: Color, to: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    match (from, to) {
        (Color::Rgb(r0, g0, b0), Color::Rgb(r1, g1, b1)) => {
            let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
            Color::Rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
        }
        _ if t >= 0.5 => to,
        _ => from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        let a = Color::Rgb(0, 0, 0);
        let b = Color::Rgb(200, 100, 50);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(a, b, 0.5), Color::Rgb(100, 50, 25));
        assert_eq!(blend(a, b, f64::NAN), a);
    }

    #[test]
    fn test_accent_for_entry() {
        let theme = Theme::default();
        let mut entry = appreel_core::Catalogue::builtin().apps[0].clone();
        entry.accent = "#102030".to_string();
        assert_eq!(theme.accent_for(&entry), Color::Rgb(0x10, 0x20, 0x30));
        entry.accent = "nope".to_string();
        assert_eq!(theme.accent_for(&entry), theme.accent);
    }
}
