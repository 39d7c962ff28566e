//! Atomic layer: Slide Window Planner
//!
//! Splits the normalized progress range [0, 1] into one enter/hold/exit
//! window per slide, and maps progress back onto a discrete slide index.

use serde::Serialize;

use super::timing::inverse_lerp;
use crate::error::{Error, Result};

/// Progress window owned by one slide
///
/// Invariant: `0 <= start < hold_end <= end <= 1`; `hold_end == end` only
/// for a slide without an exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlideWindow {
    /// Progress at which the slide starts entering
    pub start: f64,
    /// Progress at which the exit begins
    pub hold_end: f64,
    /// Progress at which the slide is fully gone
    pub end: f64,
}

/// Lifecycle phase of a slide at a given progress value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlidePhase {
    Pending,
    Entering,
    Held,
    Exiting,
    Done,
}

impl SlidePhase {
    /// Whether the slide is resting at either end of its lifecycle
    #[inline]
    pub fn is_settled(self) -> bool {
        matches!(self, SlidePhase::Pending | SlidePhase::Done)
    }
}

/// Phase plus the local 0..1 position inside `Entering` / `Exiting`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSample {
    pub phase: SlidePhase,
    pub t: f64,
}

impl SlideWindow {
    /// Length of the exit transition
    #[inline]
    pub fn exit_span(&self) -> f64 {
        self.end - self.hold_end
    }

    /// Whether the slide ever leaves
    #[inline]
    pub fn has_exit(&self) -> bool {
        self.end > self.hold_end
    }

    /// Whether `progress` falls inside `[start, end]`
    #[inline]
    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start && progress <= self.end
    }

    /// Same window with the exit removed: held until `end`
    pub fn without_exit(self) -> Self {
        Self {
            hold_end: self.end,
            ..self
        }
    }

    /// Phase at `progress`, entering over the same span the slide exits over
    pub fn phase_at(&self, progress: f64) -> SlidePhase {
        self.sample(progress, self.exit_span()).phase
    }

    /// Phase and local transition position at `progress`
    ///
    /// `enter_span` is the length of the enter transition measured from
    /// `start`; it is capped at `hold_end`. Pure function of its inputs: the
    /// same progress always gives the same sample regardless of the order in
    /// which values were visited.
    pub fn sample(&self, progress: f64, enter_span: f64) -> PhaseSample {
        let enter_end = (self.start + enter_span.max(0.0)).min(self.hold_end);

        if progress < self.start {
            PhaseSample {
                phase: SlidePhase::Pending,
                t: 0.0,
            }
        } else if progress < enter_end {
            PhaseSample {
                phase: SlidePhase::Entering,
                t: inverse_lerp(self.start, enter_end, progress),
            }
        } else if progress < self.hold_end || !self.has_exit() {
            PhaseSample {
                phase: SlidePhase::Held,
                t: 1.0,
            }
        } else if progress < self.end {
            PhaseSample {
                phase: SlidePhase::Exiting,
                t: inverse_lerp(self.hold_end, self.end, progress),
            }
        } else {
            PhaseSample {
                phase: SlidePhase::Done,
                t: 1.0,
            }
        }
    }
}

fn validate_fractions(hold_fraction: f64, overlap_fraction: f64) -> Result<()> {
    if !(hold_fraction > 0.0 && hold_fraction < 1.0) {
        return Err(Error::InvalidPlan(format!(
            "hold fraction must be in (0, 1), got {hold_fraction}"
        )));
    }
    if !(overlap_fraction >= 0.0 && overlap_fraction < hold_fraction) {
        return Err(Error::InvalidPlan(format!(
            "overlap fraction must be in [0, {hold_fraction}), got {overlap_fraction}"
        )));
    }
    Ok(())
}

/// Plan one window per slide over equal shares of the progress range
///
/// Each slide owns `1 / total_slides`. It is fully visible until
/// `hold_fraction` of its share has passed, then exits; the exit runs
/// `overlap_fraction` of a share into the next slide's window so the two
/// cross-fade. Bounds are computed from the slide index directly (never
/// accumulated) so identical inputs give bit-identical windows.
pub fn plan(
    total_slides: usize,
    hold_fraction: f64,
    overlap_fraction: f64,
) -> Result<Vec<SlideWindow>> {
    validate_fractions(hold_fraction, overlap_fraction)?;

    if total_slides == 1 {
        return Ok(vec![SlideWindow {
            start: 0.0,
            hold_end: 1.0,
            end: 1.0,
        }]);
    }

    let total = total_slides as f64;
    let last = total_slides.saturating_sub(1);
    Ok((0..total_slides)
        .map(|i| {
            let index = i as f64;
            let end = if i == last {
                1.0
            } else {
                ((index + 1.0 + overlap_fraction) / total).min(1.0)
            };
            SlideWindow {
                start: index / total,
                hold_end: (index + hold_fraction) / total,
                end,
            }
        })
        .collect())
}

/// Plan windows whose shares are proportional to `weights`
///
/// Zero, negative or non-finite weights are rejected.
pub fn plan_weighted(
    weights: &[f64],
    hold_fraction: f64,
    overlap_fraction: f64,
) -> Result<Vec<SlideWindow>> {
    validate_fractions(hold_fraction, overlap_fraction)?;

    if let Some(bad) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(Error::InvalidPlan(format!(
            "slide weights must be positive, got {bad}"
        )));
    }
    if weights.len() == 1 {
        return plan(1, hold_fraction, overlap_fraction);
    }

    let sum: f64 = weights.iter().sum();
    let last = weights.len().saturating_sub(1);
    let mut windows = Vec::with_capacity(weights.len());
    let mut offset = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        let start = if i == 0 { 0.0 } else { offset / sum };
        let end = if i == last {
            1.0
        } else {
            ((offset + weight * (1.0 + overlap_fraction)) / sum).min(1.0)
        };
        windows.push(SlideWindow {
            start,
            hold_end: (offset + weight * hold_fraction) / sum,
            end,
        });
        offset += weight;
    }
    Ok(windows)
}

/// Discrete slide index for a progress value
///
/// `floor(progress * total_slides)` clamped to `[0, total_slides - 1]`, so
/// progress 1.0 selects the last slide rather than one past it. NaN maps to
/// the first slide.
pub fn current_index(progress: f64, total_slides: usize) -> usize {
    if total_slides == 0 || progress.is_nan() {
        return 0;
    }
    let scaled = (progress.clamp(0.0, 1.0) * total_slides as f64).floor();
    (scaled as usize).min(total_slides - 1)
}

/// Index of the last window that has started at `progress`
///
/// Used for weighted plans, where shares are not uniform.
pub fn index_at(windows: &[SlideWindow], progress: f64) -> usize {
    if progress.is_nan() {
        return 0;
    }
    windows
        .iter()
        .rposition(|w| progress >= w.start)
        .unwrap_or(0)
}

/// Share of the progress range during which one slide is current
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RestPoint {
    /// Progress at which the slide becomes current
    pub start: f64,
    /// Middle of the share, where the slide sits at rest
    pub progress: f64,
}

/// Rest point of every slide in a plan
///
/// Slide `i` is current over `[start(i), start(i + 1))`, the last slide up
/// to 1. The rest point is the middle of that range, so the current index
/// there is `i` for uniform and weighted plans alike.
pub fn rest_points(windows: &[SlideWindow]) -> Vec<RestPoint> {
    windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let next = windows.get(i + 1).map_or(1.0, |n| n.start);
            RestPoint {
                start: w.start,
                progress: (w.start + next) / 2.0,
            }
        })
        .collect()
}

/// Rest points of `total` slides with equal shares
pub fn uniform_rest_points(total: usize) -> Vec<RestPoint> {
    let n = total as f64;
    (0..total)
        .map(|i| RestPoint {
            start: i as f64 / n,
            progress: (i as f64 + 0.5) / n,
        })
        .collect()
}

/// Rest point of the slide that is current at `progress`
pub fn rest_point_at(points: &[RestPoint], progress: f64) -> Option<RestPoint> {
    if progress.is_nan() {
        return points.first().copied();
    }
    points
        .iter()
        .rev()
        .find(|p| progress >= p.start)
        .or_else(|| points.first())
        .copied()
}

/// Zero-padded "current / total" label, e.g. `"01 / 08"`
pub fn format_counter(index: usize, total: usize) -> String {
    format!("{:02} / {:02}", index + 1, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_plan_bounds_for_many_counts() {
        for total in 1..=40 {
            let windows = plan(total, 0.85, 0.1).unwrap();
            assert_eq!(windows.len(), total);
            assert_eq!(windows[0].start, 0.0, "total={}", total);
            assert_eq!(windows[total - 1].end, 1.0, "total={}", total);
            for (i, w) in windows.iter().enumerate() {
                assert!(w.start < w.hold_end, "total={} i={}", total, i);
                if total > 1 {
                    assert!(w.hold_end < w.end, "total={} i={}", total, i);
                }
                assert!(w.end <= 1.0);
            }
        }
    }

    #[test]
    fn test_plan_five_slides() {
        let windows = plan(5, 0.85, 0.0).unwrap();
        let w = windows[2];
        assert!(approx(w.start, 0.4));
        assert!(approx(w.hold_end, 0.57));
        assert!(approx(w.end, 0.6));
        for w in &windows {
            assert!(approx(w.end - w.start, 0.2));
        }
    }

    #[test]
    fn test_plan_contiguous_without_overlap() {
        let windows = plan(8, 0.7, 0.0).unwrap();
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_plan_overlap_is_bounded() {
        let windows = plan(4, 0.8, 0.2).unwrap();
        for pair in windows.windows(2) {
            let overlap = pair[0].end - pair[1].start;
            assert!(approx(overlap, 0.2 / 4.0));
        }
    }

    #[test]
    fn test_plan_single_slide() {
        let windows = plan(1, 0.85, 0.0).unwrap();
        assert_eq!(
            windows,
            vec![SlideWindow {
                start: 0.0,
                hold_end: 1.0,
                end: 1.0
            }]
        );
        assert_eq!(windows[0].phase_at(1.0), SlidePhase::Held);
    }

    #[test]
    fn test_plan_zero_slides() {
        assert!(plan(0, 0.85, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_plan_rejects_bad_fractions() {
        assert!(matches!(plan(3, 0.0, 0.0), Err(Error::InvalidPlan(_))));
        assert!(matches!(plan(3, 1.0, 0.0), Err(Error::InvalidPlan(_))));
        assert!(matches!(plan(3, 0.5, 0.5), Err(Error::InvalidPlan(_))));
        assert!(matches!(plan(3, 0.5, -0.1), Err(Error::InvalidPlan(_))));
        assert!(matches!(plan(3, f64::NAN, 0.0), Err(Error::InvalidPlan(_))));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = plan(13, 0.83, 0.07).unwrap();
        let b = plan(13, 0.83, 0.07).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.start.to_bits(), y.start.to_bits());
            assert_eq!(x.hold_end.to_bits(), y.hold_end.to_bits());
            assert_eq!(x.end.to_bits(), y.end.to_bits());
        }
    }

    #[test]
    fn test_plan_weighted() {
        let windows = plan_weighted(&[1.0, 2.0, 1.0], 0.5, 0.0).unwrap();
        assert_eq!(windows[0].start, 0.0);
        assert!(approx(windows[1].start, 0.25));
        assert!(approx(windows[1].hold_end, 0.5));
        assert!(approx(windows[2].start, 0.75));
        assert_eq!(windows[2].end, 1.0);
        assert!(plan_weighted(&[1.0, 0.0], 0.5, 0.0).is_err());
    }

    #[test]
    fn test_phase_sequence() {
        let w = SlideWindow {
            start: 0.4,
            hold_end: 0.57,
            end: 0.6,
        };
        assert_eq!(w.phase_at(0.3), SlidePhase::Pending);
        assert_eq!(w.phase_at(0.41), SlidePhase::Entering);
        assert_eq!(w.phase_at(0.5), SlidePhase::Held);
        assert_eq!(w.phase_at(0.58), SlidePhase::Exiting);
        assert_eq!(w.phase_at(0.6), SlidePhase::Done);
        assert_eq!(w.without_exit().phase_at(0.9), SlidePhase::Held);
    }

    #[test]
    fn test_sample_local_progress() {
        let w = SlideWindow {
            start: 0.0,
            hold_end: 0.8,
            end: 1.0,
        };
        let s = w.sample(0.9, 0.2);
        assert_eq!(s.phase, SlidePhase::Exiting);
        assert!(approx(s.t, 0.5));
        let s = w.sample(0.05, 0.2);
        assert_eq!(s.phase, SlidePhase::Entering);
        assert!(approx(s.t, 0.25));
        // Zero-length enter goes straight to held
        assert_eq!(w.sample(0.0, 0.0).phase, SlidePhase::Held);
    }

    #[test]
    fn test_current_index() {
        assert_eq!(current_index(0.49, 8), 3);
        assert_eq!(current_index(1.0, 8), 7);
        assert_eq!(current_index(0.0, 8), 0);
        assert_eq!(current_index(-0.2, 8), 0);
        assert_eq!(current_index(1.7, 8), 7);
        assert_eq!(current_index(f64::NAN, 8), 0);
        assert_eq!(current_index(0.5, 0), 0);
    }

    #[test]
    fn test_active_window_contains_progress() {
        let windows = plan(8, 0.85, 0.1).unwrap();
        for step in 0..=1000 {
            let p = step as f64 / 1000.0;
            let i = current_index(p, 8);
            assert!(windows[i].contains(p), "p={} i={}", p, i);
        }
    }

    #[test]
    fn test_index_at_matches_uniform() {
        let windows = plan(6, 0.8, 0.0).unwrap();
        for step in 0..=100 {
            let p = step as f64 / 100.0;
            assert_eq!(index_at(&windows, p), current_index(p, 6), "p={}", p);
        }
    }

    #[test]
    fn test_format_counter() {
        assert_eq!(format_counter(0, 8), "01 / 08");
        assert_eq!(format_counter(7, 8), "08 / 08");
        assert_eq!(format_counter(11, 12), "12 / 12");
    }

    #[test]
    fn test_rest_points_keep_their_slide_current() {
        let uniform = plan(4, 0.8, 0.2).unwrap();
        let points = rest_points(&uniform);
        assert_eq!(points, uniform_rest_points(4));
        for (i, p) in points.iter().enumerate() {
            assert_eq!(current_index(p.progress, 4), i);
        }

        let weighted = plan_weighted(&[1.0, 3.0, 2.0], 0.8, 0.0).unwrap();
        let points = rest_points(&weighted);
        assert!(approx(points[0].progress, 1.0 / 12.0));
        assert!(approx(points[1].progress, 5.0 / 12.0));
        assert!(approx(points[2].progress, 5.0 / 6.0));
        for (i, p) in points.iter().enumerate() {
            assert_eq!(index_at(&weighted, p.progress), i);
        }
    }

    #[test]
    fn test_rest_point_at() {
        let points = rest_points(&plan_weighted(&[1.0, 3.0], 0.8, 0.0).unwrap());
        assert_eq!(rest_point_at(&points, 0.1).map(|p| p.progress), Some(0.125));
        assert_eq!(rest_point_at(&points, 0.25).map(|p| p.progress), Some(0.625));
        assert_eq!(rest_point_at(&points, f64::NAN).map(|p| p.progress), Some(0.125));
        assert_eq!(rest_point_at(&[], 0.5), None);
    }
}
