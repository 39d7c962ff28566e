use anyhow::Result;
use serde::Serialize;

use appreel_core::choreo::{plan, SlideWindow};
use appreel_core::{AppConfig, SceneKind};

#[derive(Serialize)]
struct PlanOutput {
    slides: usize,
    hold: f64,
    overlap: f64,
    windows: Vec<SlideWindow>,
}

pub fn run(
    config: &AppConfig,
    slides: usize,
    hold: Option<f64>,
    overlap: Option<f64>,
    mode: SceneKind,
    json: bool,
) -> Result<()> {
    let (default_hold, default_overlap) = match mode {
        SceneKind::Carousel => (config.carousel.hold_fraction, config.carousel.overlap_fraction),
        SceneKind::Slideshow => (config.slideshow.hold_fraction, config.slideshow.overlap_fraction),
    };
    let hold = hold.unwrap_or(default_hold);
    let overlap = overlap.unwrap_or(default_overlap);
    let windows = plan(slides, hold, overlap)?;

    if json {
        let output = PlanOutput {
            slides,
            hold,
            overlap,
            windows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if windows.is_empty() {
        println!("No slides.");
        return Ok(());
    }

    println!("{} slides, hold {}, overlap {}:\n", slides, hold, overlap);
    println!("  {:>5}  {:>8}  {:>8}  {:>8}  {:>8}", "slide", "start", "hold_end", "end", "exit");
    for (i, w) in windows.iter().enumerate() {
        println!(
            "  {:>5}  {:>8.4}  {:>8.4}  {:>8.4}  {:>8.4}",
            i,
            w.start,
            w.hold_end,
            w.end,
            w.exit_span()
        );
    }

    Ok(())
}
