use url::Url;

use super::models::{AppId, Catalogue, CatalogueEntry, Platform};

struct Seed {
    id: &'static str,
    name: &'static str,
    tagline: &'static str,
    description: &'static str,
    accent: &'static str,
    app_store: Option<&'static str>,
    play_store: Option<&'static str>,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "tidepool",
        name: "Tidepool",
        tagline: "Surf and tide forecasts",
        description: "Swell, wind and tide charts for thousands of breaks, updated hourly.",
        accent: "#3a86ff",
        app_store: Some("https://apps.apple.com/app/tidepool/id6450000001"),
        play_store: Some("https://play.google.com/store/apps/details?id=app.tidepool"),
    },
    Seed {
        id: "ember",
        name: "Ember",
        tagline: "Stories for the campfire",
        description: "Short audio stories narrated for evenings outdoors, playable offline.",
        accent: "#ff6b35",
        app_store: Some("https://apps.apple.com/app/ember-stories/id6450000002"),
        play_store: None,
    },
    Seed {
        id: "ledgerly",
        name: "Ledgerly",
        tagline: "Shared budgets without spreadsheets",
        description: "Split bills, track recurring costs and settle up with one tap.",
        accent: "#2ec4b6",
        app_store: Some("https://apps.apple.com/app/ledgerly/id6450000003"),
        play_store: Some("https://play.google.com/store/apps/details?id=app.ledgerly"),
    },
    Seed {
        id: "sprout",
        name: "Sprout",
        tagline: "Houseplant care reminders",
        description: "Watering schedules that adapt to season, light and pot size.",
        accent: "#8ac926",
        app_store: None,
        play_store: Some("https://play.google.com/store/apps/details?id=app.sprout"),
    },
    Seed {
        id: "cadence",
        name: "Cadence",
        tagline: "Interval training coach",
        description: "Build interval sessions and follow them with voice and haptic cues.",
        accent: "#e63946",
        app_store: Some("https://apps.apple.com/app/cadence-coach/id6450000005"),
        play_store: Some("https://play.google.com/store/apps/details?id=app.cadence"),
    },
    Seed {
        id: "inkwell",
        name: "Inkwell",
        tagline: "A calm journal",
        description: "Daily prompts, mood tags and an end-to-end encrypted archive.",
        accent: "#6a4c93",
        app_store: Some("https://apps.apple.com/app/inkwell-journal/id6450000006"),
        play_store: None,
    },
    Seed {
        id: "transit-buddy",
        name: "Transit Buddy",
        tagline: "Live departures nearby",
        description: "Real-time arrivals for buses, trams and trains around you.",
        accent: "#ffbe0b",
        app_store: Some("https://apps.apple.com/app/transit-buddy/id6450000007"),
        play_store: Some("https://play.google.com/store/apps/details?id=app.transitbuddy"),
    },
    Seed {
        id: "lumen",
        name: "Lumen",
        tagline: "Photo light meter",
        description: "Spot and incident metering for film cameras using the phone sensor.",
        accent: "#f4a261",
        app_store: None,
        play_store: None,
    },
];

fn parse_store(url: Option<&str>) -> Option<Url> {
    url.and_then(|u| Url::parse(u).ok())
}

impl Catalogue {
    /// Catalogue shown when no catalogue file is configured
    pub fn builtin() -> Self {
        let apps = SEEDS
            .iter()
            .map(|seed| {
                let app_store = parse_store(seed.app_store);
                let play_store = parse_store(seed.play_store);
                let mut platforms = Vec::new();
                if app_store.is_some() {
                    platforms.push(Platform::Ios);
                }
                if play_store.is_some() {
                    platforms.push(Platform::Android);
                }
                CatalogueEntry {
                    id: AppId::new(seed.id),
                    name: seed.name.to_string(),
                    tagline: seed.tagline.to_string(),
                    description: seed.description.to_string(),
                    accent: seed.accent.to_string(),
                    platforms,
                    app_store,
                    play_store,
                    weight: 1.0,
                }
            })
            .collect();
        Self { apps }
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::builtin()
    }
}
