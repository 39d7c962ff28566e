use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Stable identity of a catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store a build is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

/// One application shown in the showcase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub id: AppId,
    pub name: String,
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    /// Accent colour as a hex string, e.g. "#ff6b35"
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub app_store: Option<Url>,
    #[serde(default)]
    pub play_store: Option<Url>,
    /// Relative share of the scroll range this entry gets
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_accent() -> String {
    "#89b482".to_string()
}

fn default_weight() -> f64 {
    1.0
}

impl CatalogueEntry {
    /// Store link for a platform, if published there
    pub fn store_url(&self, platform: Platform) -> Option<&Url> {
        match platform {
            Platform::Ios => self.app_store.as_ref(),
            Platform::Android => self.play_store.as_ref(),
        }
    }

    /// Parse the accent colour into RGB components
    pub fn accent_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.accent)
    }
}

/// Parse "#rrggbb" or "rrggbb"
pub(crate) fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Ordered list of showcased apps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub apps: Vec<CatalogueEntry>,
}

impl Catalogue {
    /// Load a catalogue file; `.json` files are read as JSON, anything else
    /// as TOML
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalogue: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Check ids are unique and every entry is presentable
    pub fn validate(&self) -> Result<()> {
        if self.apps.is_empty() {
            return Err(Error::Catalogue("catalogue has no apps".to_string()));
        }
        let mut seen = HashSet::new();
        for app in &self.apps {
            if !seen.insert(&app.id) {
                return Err(Error::Catalogue(format!("duplicate app id '{}'", app.id)));
            }
            if app.name.trim().is_empty() {
                return Err(Error::Catalogue(format!("app '{}' has no name", app.id)));
            }
            if app.accent_rgb().is_none() {
                return Err(Error::Catalogue(format!(
                    "app '{}' has invalid accent colour '{}'",
                    app.id, app.accent
                )));
            }
            if !(app.weight.is_finite() && app.weight > 0.0) {
                return Err(Error::Catalogue(format!(
                    "app '{}' has non-positive weight {}",
                    app.id, app.weight
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogueEntry> {
        self.apps.get(index)
    }

    /// Per-entry scroll weights, in order
    pub fn weights(&self) -> Vec<f64> {
        self.apps.iter().map(|a| a.weight).collect()
    }
}
