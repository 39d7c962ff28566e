mod builtin;
mod models;
mod routes;

pub use models::{AppId, Catalogue, CatalogueEntry, Platform};
pub use routes::{Route, RouteTable};
