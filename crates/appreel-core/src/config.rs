use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalogue::Platform;
use crate::choreo::scene::SceneKind;
use crate::viewport::ResponsiveConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub slideshow: SlideshowConfig,
    #[serde(default)]
    pub responsive: ResponsiveConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Catalogue file (TOML or JSON); the built-in catalogue is used when unset
    #[serde(default)]
    pub catalogue: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            catalogue: None,
        }
    }
}

/// Easing curve for slide transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump at the end of the transition
    None,
    Linear,
    /// 1 - (1-t)³
    #[default]
    Cubic,
    /// 1 - (1-t)⁵
    Quintic,
    /// Exponential ease-out
    EaseOut,
    /// t²(3 - 2t)
    Smoothstep,
}

/// Scroll timeline behaviour shared by both scenes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Pinned scroll distance per slide, in viewport heights
    #[serde(default = "default_units_per_slide")]
    pub units_per_slide: f64,
    /// Seconds for delivered progress to catch up with the scroll position
    #[serde(default = "default_scrub_smoothing")]
    pub scrub_smoothing: f64,
    /// Settle on the nearest slide when scrolling stops
    #[serde(default = "default_true")]
    pub snap_to_slide: bool,
    /// Idle frames before snapping
    #[serde(default = "default_snap_idle_frames")]
    pub snap_idle_frames: u32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            units_per_slide: default_units_per_slide(),
            scrub_smoothing: default_scrub_smoothing(),
            snap_to_slide: default_true(),
            snap_idle_frames: default_snap_idle_frames(),
        }
    }
}

/// 3D rotating carousel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_carousel_hold")]
    pub hold_fraction: f64,
    #[serde(default = "default_carousel_overlap")]
    pub overlap_fraction: f64,
    #[serde(default)]
    pub easing: EasingType,
    /// Opacity lost per unit of normalized ring distance
    #[serde(default = "default_falloff_rate")]
    pub falloff_rate: f64,
    /// Scale lost per unit of normalized ring distance
    #[serde(default = "default_scale_falloff_rate")]
    pub scale_falloff_rate: f64,
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Ring follow spring; 0 makes the ring track scroll progress directly
    #[serde(default = "default_spring_stiffness")]
    pub spring_stiffness: f64,
    #[serde(default = "default_spring_damping")]
    pub spring_damping: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            hold_fraction: default_carousel_hold(),
            overlap_fraction: default_carousel_overlap(),
            easing: EasingType::default(),
            falloff_rate: default_falloff_rate(),
            scale_falloff_rate: default_scale_falloff_rate(),
            min_opacity: default_min_opacity(),
            min_scale: default_min_scale(),
            spring_stiffness: default_spring_stiffness(),
            spring_damping: default_spring_damping(),
        }
    }
}

/// Pinned slide-show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideshowConfig {
    #[serde(default = "default_slideshow_hold")]
    pub hold_fraction: f64,
    #[serde(default)]
    pub overlap_fraction: f64,
    #[serde(default = "default_slideshow_easing")]
    pub easing: EasingType,
    /// Scale slides start from and shrink to
    #[serde(default = "default_slideshow_scale")]
    pub hidden_scale: f64,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            hold_fraction: default_slideshow_hold(),
            overlap_fraction: 0.0,
            easing: default_slideshow_easing(),
            hidden_scale: default_slideshow_scale(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frame rate of the render loop
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Rows scrolled per wheel notch or key press
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    /// Maximum pointer tilt in degrees
    #[serde(default = "default_tilt_max_deg")]
    pub tilt_max_deg: f64,
    /// Scene shown at startup
    #[serde(default)]
    pub mode: SceneKind,
    /// Store preferred when an app is published on both
    #[serde(default)]
    pub store: Platform,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            scroll_step: default_scroll_step(),
            tilt_max_deg: default_tilt_max_deg(),
            mode: SceneKind::default(),
            store: Platform::default(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "G" (Shift+g), "<CR>" (Enter), "<Esc>", "<Tab>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Scroll down by one step
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll up by one step
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll down by a viewport
    #[serde(default = "default_key_page_down")]
    pub page_down: String,
    /// Scroll up by a viewport
    #[serde(default = "default_key_page_up")]
    pub page_up: String,
    /// Scroll to the next slide's rest point
    #[serde(default = "default_key_next_slide")]
    pub next_slide: String,
    /// Scroll to the previous slide's rest point
    #[serde(default = "default_key_prev_slide")]
    pub prev_slide: String,
    /// Jump to the top of the page
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    /// Jump to the bottom of the page
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,
    /// Open the active app's link
    #[serde(default = "default_key_open")]
    pub open: String,
    /// Switch between carousel and slideshow
    #[serde(default = "default_key_toggle_mode")]
    pub toggle_mode: String,
    /// Toggle pointer tilt (fine/coarse pointer)
    #[serde(default = "default_key_toggle_pointer")]
    pub toggle_pointer: String,
    /// Show help overlay
    #[serde(default = "default_key_help")]
    pub help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            page_down: default_key_page_down(),
            page_up: default_key_page_up(),
            next_slide: default_key_next_slide(),
            prev_slide: default_key_prev_slide(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            open: default_key_open(),
            toggle_mode: default_key_toggle_mode(),
            toggle_pointer: default_key_toggle_pointer(),
            help: default_key_help(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_page_down() -> String { "<C-d>".to_string() }
fn default_key_page_up() -> String { "<C-u>".to_string() }
fn default_key_next_slide() -> String { "l".to_string() }
fn default_key_prev_slide() -> String { "h".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_open() -> String { "<CR>".to_string() }
fn default_key_toggle_mode() -> String { "<Tab>".to_string() }
fn default_key_toggle_pointer() -> String { "p".to_string() }
fn default_key_help() -> String { "?".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("appreel")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_units_per_slide() -> f64 {
    1.0
}

fn default_scrub_smoothing() -> f64 {
    0.12
}

fn default_snap_idle_frames() -> u32 {
    12 // ~200ms at 60fps
}

fn default_carousel_hold() -> f64 {
    0.8
}

fn default_carousel_overlap() -> f64 {
    0.1
}

fn default_falloff_rate() -> f64 {
    0.4
}

fn default_scale_falloff_rate() -> f64 {
    0.3
}

fn default_min_opacity() -> f64 {
    0.2
}

fn default_min_scale() -> f64 {
    0.7
}

fn default_spring_stiffness() -> f64 {
    170.0
}

fn default_spring_damping() -> f64 {
    26.0
}

fn default_slideshow_hold() -> f64 {
    0.85
}

fn default_slideshow_easing() -> EasingType {
    EasingType::Quintic
}

fn default_slideshow_scale() -> f64 {
    0.96
}

fn default_fps() -> u32 {
    60
}

fn default_scroll_step() -> f64 {
    2.0
}

fn default_tilt_max_deg() -> f64 {
    12.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

fn check_fractions(section: &str, hold: f64, overlap: f64) -> crate::Result<()> {
    if !(hold > 0.0 && hold < 1.0) {
        return Err(crate::Error::Config(format!(
            "{section}.hold_fraction must be in (0, 1), got {hold}"
        )));
    }
    if !(overlap >= 0.0 && overlap < hold) {
        return Err(crate::Error::Config(format!(
            "{section}.overlap_fraction must be in [0, hold_fraction), got {overlap}"
        )));
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when it does
    /// not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/appreel/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("appreel")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("appreel.log")
    }

    /// Catalogue path with tilde expansion, if configured
    pub fn catalogue_path(&self) -> Option<PathBuf> {
        self.general.catalogue.as_deref().map(expand_tilde)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        check_fractions("carousel", self.carousel.hold_fraction, self.carousel.overlap_fraction)?;
        check_fractions(
            "slideshow",
            self.slideshow.hold_fraction,
            self.slideshow.overlap_fraction,
        )?;

        let t = &self.timeline;
        if !(t.units_per_slide.is_finite() && t.units_per_slide > 0.0) {
            return Err(crate::Error::Config(format!(
                "timeline.units_per_slide must be positive, got {}",
                t.units_per_slide
            )));
        }
        if !(t.scrub_smoothing >= 0.0) {
            return Err(crate::Error::Config(format!(
                "timeline.scrub_smoothing must be >= 0, got {}",
                t.scrub_smoothing
            )));
        }

        let c = &self.carousel;
        for (name, value) in [
            ("falloff_rate", c.falloff_rate),
            ("scale_falloff_rate", c.scale_falloff_rate),
            ("spring_stiffness", c.spring_stiffness),
            ("spring_damping", c.spring_damping),
        ] {
            if !(value >= 0.0) {
                return Err(crate::Error::Config(format!(
                    "carousel.{name} must be >= 0, got {value}"
                )));
            }
        }
        for (name, value) in [("min_opacity", c.min_opacity), ("min_scale", c.min_scale)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::Config(format!(
                    "carousel.{name} must be in [0, 1], got {value}"
                )));
            }
        }

        if self.ui.fps == 0 {
            return Err(crate::Error::Config("ui.fps must be positive".to_string()));
        }

        self.responsive.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.slideshow.hold_fraction, 0.85);
        assert_eq!(config.slideshow.overlap_fraction, 0.0);
        assert_eq!(config.carousel.falloff_rate, 0.4);
        assert_eq!(config.ui.fps, 60);
        assert_eq!(config.ui.mode, SceneKind::Carousel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [slideshow]
            hold_fraction = 0.7
            easing = "smoothstep"

            [ui]
            mode = "slideshow"
            "#,
        )
        .unwrap();
        assert_eq!(config.slideshow.hold_fraction, 0.7);
        assert_eq!(config.slideshow.easing, EasingType::Smoothstep);
        assert_eq!(config.slideshow.hidden_scale, 0.96);
        assert_eq!(config.ui.mode, SceneKind::Slideshow);
        assert_eq!(config.carousel.spring_stiffness, 170.0);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let mut config = AppConfig::default();
        config.carousel.overlap_fraction = 0.9;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        let mut config = AppConfig::default();
        config.timeline.units_per_slide = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ui.fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.timeline.scrub_smoothing = 0.3;
        config.ui.mode = SceneKind::Slideshow;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.timeline.scrub_smoothing, 0.3);
        assert_eq!(loaded.ui.mode, SceneKind::Slideshow);
        assert_eq!(
            loaded.responsive.breakpoints.len(),
            config.responsive.breakpoints.len()
        );
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ui.fps, 60);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[carousel]\nhold_fraction = 1.5\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(crate::Error::Config(_))
        ));
    }
}
