use std::collections::HashMap;

use url::Url;

use super::models::{AppId, Catalogue, Platform};

/// Where activating an entry leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// In-site detail page
    Detail { path: String },
    /// Store listing
    External(Url),
}

/// Navigation targets keyed by app identity
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<AppId, Route>,
}

impl RouteTable {
    /// Route each entry to its store listing on `preferred`, then on any
    /// other store, and to its detail page when it has none
    pub fn from_catalogue(catalogue: &Catalogue, preferred: Platform) -> Self {
        let fallback = match preferred {
            Platform::Ios => Platform::Android,
            Platform::Android => Platform::Ios,
        };
        let routes = catalogue
            .apps
            .iter()
            .map(|app| {
                let route = app
                    .store_url(preferred)
                    .or_else(|| app.store_url(fallback))
                    .map(|url| Route::External(url.clone()))
                    .unwrap_or_else(|| Route::Detail {
                        path: format!("/apps/{}", app.id),
                    });
                (app.id.clone(), route)
            })
            .collect();
        Self { routes }
    }

    pub fn insert(&mut self, id: AppId, route: Route) {
        self.routes.insert(id, route);
    }

    pub fn lookup(&self, id: &AppId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_prefer_platform() {
        let catalogue = Catalogue::builtin();
        let table = RouteTable::from_catalogue(&catalogue, Platform::Android);
        assert_eq!(table.len(), catalogue.len());

        for app in &catalogue.apps {
            let route = table.lookup(&app.id).unwrap();
            match (&app.play_store, &app.app_store) {
                (Some(play), _) => assert_eq!(route, &Route::External(play.clone())),
                (None, Some(ios)) => assert_eq!(route, &Route::External(ios.clone())),
                (None, None) => assert!(matches!(route, Route::Detail { .. })),
            }
        }
    }

    #[test]
    fn test_unknown_id() {
        let table = RouteTable::from_catalogue(&Catalogue::builtin(), Platform::Ios);
        assert!(table.lookup(&AppId::new("missing")).is_none());
    }

    #[test]
    fn test_detail_fallback() {
        let mut catalogue = Catalogue::builtin();
        catalogue.apps.truncate(1);
        catalogue.apps[0].app_store = None;
        catalogue.apps[0].play_store = None;
        let table = RouteTable::from_catalogue(&catalogue, Platform::Ios);
        let id = catalogue.apps[0].id.clone();
        assert_eq!(
            table.lookup(&id),
            Some(&Route::Detail {
                path: format!("/apps/{}", id)
            })
        );
    }
}
