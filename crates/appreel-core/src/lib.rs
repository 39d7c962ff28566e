pub mod catalogue;
pub mod choreo;
pub mod config;
pub mod error;
pub mod viewport;

pub use catalogue::{AppId, Catalogue, CatalogueEntry, Platform, Route, RouteTable};
pub use choreo::{SceneKind, ScenePlan};
pub use config::{AppConfig, CarouselConfig, EasingType, SlideshowConfig, TimelineSettings};
pub use error::{Error, Result};
pub use viewport::{LayoutMetrics, PointerKind, ResponsiveConfig, Viewport};
