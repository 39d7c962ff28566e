//! Viewport contract: responsive magnitudes and pointer capability
//!
//! Breakpoints are resolved once per resize; nothing here is cached across
//! resizes.

use serde::{Deserialize, Serialize};

/// Pointer precision reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Mouse or trackpad: pointer-driven tilt runs
    #[default]
    Fine,
    /// Touch or no pointer: tilt is disabled
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pointer: PointerKind,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pointer: PointerKind) -> Self {
        Self {
            width,
            height,
            pointer,
        }
    }

    #[inline]
    pub fn tilt_enabled(&self) -> bool {
        self.pointer == PointerKind::Fine
    }
}

/// Magnitudes applied from `min_width` upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: f64,
    /// Carousel ring radius
    pub radius: f64,
    /// Slideshow enter/exit travel
    pub slide_offset: f64,
    pub card_width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoints(),
        }
    }
}

// Terminal columns/rows
fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint { min_width: 0.0, radius: 16.0, slide_offset: 4.0, card_width: 18.0 },
        Breakpoint { min_width: 80.0, radius: 26.0, slide_offset: 6.0, card_width: 22.0 },
        Breakpoint { min_width: 120.0, radius: 38.0, slide_offset: 8.0, card_width: 26.0 },
        Breakpoint { min_width: 180.0, radius: 52.0, slide_offset: 10.0, card_width: 30.0 },
    ]
}

/// Magnitudes resolved for one viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub radius: f64,
    pub slide_offset: f64,
    pub card_width: f64,
    pub tilt_enabled: bool,
}

impl ResponsiveConfig {
    /// Pick the widest breakpoint whose `min_width` fits the viewport
    ///
    /// Viewports narrower than every breakpoint use the narrowest one.
    pub fn resolve(&self, viewport: &Viewport) -> LayoutMetrics {
        let chosen = self
            .breakpoints
            .iter()
            .filter(|b| b.min_width <= viewport.width)
            .max_by(|a, b| a.min_width.total_cmp(&b.min_width))
            .or_else(|| {
                self.breakpoints
                    .iter()
                    .min_by(|a, b| a.min_width.total_cmp(&b.min_width))
            });

        match chosen {
            Some(b) => LayoutMetrics {
                radius: b.radius,
                slide_offset: b.slide_offset,
                card_width: b.card_width,
                tilt_enabled: viewport.tilt_enabled(),
            },
            None => LayoutMetrics {
                radius: 0.0,
                slide_offset: 0.0,
                card_width: viewport.width,
                tilt_enabled: viewport.tilt_enabled(),
            },
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.breakpoints.is_empty() {
            return Err(crate::Error::Config(
                "responsive.breakpoints must not be empty".to_string(),
            ));
        }
        for b in &self.breakpoints {
            if !(b.radius >= 0.0 && b.slide_offset >= 0.0 && b.card_width > 0.0) {
                return Err(crate::Error::Config(format!(
                    "breakpoint at min_width {} has invalid magnitudes",
                    b.min_width
                )));
            }
        }
        Ok(())
    }
}

/// Card tilt toward the pointer, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tilt {
    /// Rotation around the horizontal axis (pointer above centre tilts back)
    pub rotate_x: f64,
    /// Rotation around the vertical axis (pointer right of centre turns right)
    pub rotate_y: f64,
}

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Tilt for a pointer at `(x, y)` over `card`
///
/// Zero when the pointer is outside the card or the card is empty.
pub fn tilt_for(x: f64, y: f64, card: Rect, max_deg: f64) -> Tilt {
    if card.width <= 0.0 || card.height <= 0.0 || !card.contains(x, y) {
        return Tilt::default();
    }
    let nx = ((x - card.x) / card.width * 2.0 - 1.0).clamp(-1.0, 1.0);
    let ny = ((y - card.y) / card.height * 2.0 - 1.0).clamp(-1.0, 1.0);
    Tilt {
        rotate_x: -ny * max_deg,
        rotate_y: nx * max_deg,
    }
}
