use anyhow::Result;

use appreel_core::{AppConfig, Catalogue, Route, RouteTable};

pub fn list(config: &AppConfig, catalogue: &Catalogue) -> Result<()> {
    if catalogue.is_empty() {
        println!("Catalogue is empty.");
        return Ok(());
    }

    let routes = RouteTable::from_catalogue(catalogue, config.ui.store);
    println!("Apps ({}):\n", catalogue.len());

    for app in &catalogue.apps {
        println!("  {} - {} ({})", app.id, app.name, app.tagline);
        match routes.lookup(&app.id) {
            Some(Route::External(url)) => println!("    Opens: {}", url),
            Some(Route::Detail { path }) => println!("    Opens: {} (no store listing)", path),
            None => println!("    Opens: nothing"),
        }
        if (app.weight - 1.0).abs() > f64::EPSILON {
            println!("    Weight: {}", app.weight);
        }
        println!();
    }

    Ok(())
}
