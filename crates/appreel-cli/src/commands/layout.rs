use anyhow::{bail, Result};
use serde::Serialize;

use appreel_core::choreo::{CircularLayout, CircularPosition};
use appreel_core::{AppConfig, PointerKind, Viewport};

#[derive(Serialize)]
struct Row {
    index: usize,
    distance: f64,
    #[serde(flatten)]
    position: CircularPosition,
}

pub fn run(
    config: &AppConfig,
    items: usize,
    reference: f64,
    radius: Option<f64>,
    json: bool,
) -> Result<()> {
    if !reference.is_finite() {
        bail!("reference must be a finite number");
    }

    let radius = radius.unwrap_or_else(|| {
        config
            .responsive
            .resolve(&Viewport::new(80.0, 24.0, PointerKind::Fine))
            .radius
    });
    let c = &config.carousel;
    let layout = CircularLayout {
        radius,
        falloff_rate: c.falloff_rate,
        scale_falloff_rate: c.scale_falloff_rate,
        min_opacity: c.min_opacity,
        min_scale: c.min_scale,
    };

    let rows: Vec<Row> = layout
        .layout_all(items, reference)
        .into_iter()
        .enumerate()
        .map(|(index, position)| Row {
            index,
            distance: CircularLayout::normalized_distance(index, items, reference),
            position,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No items.");
        return Ok(());
    }

    println!("{} items, reference {}, radius {}:\n", items, reference, radius);
    println!(
        "  {:>5}  {:>8}  {:>7}  {:>6}  {:>9}  {:>9}  {:>8}",
        "item", "distance", "opacity", "scale", "offset_x", "offset_z", "rotation"
    );
    for row in &rows {
        let p = &row.position;
        println!(
            "  {:>5}  {:>8.3}  {:>7.3}  {:>6.3}  {:>9.2}  {:>9.2}  {:>8.1}",
            row.index, row.distance, p.opacity, p.scale, p.offset_x, p.offset_z, p.rotation
        );
    }

    Ok(())
}
