//! Carousel and slideshow presets
//!
//! Both scenes run the same planner, timeline and orchestrator; they only
//! differ in the parameters assembled here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::circular::CircularLayout;
use super::orchestrator::{Choreographer, Slide, SlideMotion, VisualTarget};
use super::timeline::TimelineConfig;
use super::timing::Spring;
use super::window::{plan, plan_weighted, SlideWindow};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::viewport::LayoutMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// 3D rotating carousel
    #[default]
    Carousel,
    /// Pinned slide-show
    Slideshow,
}

impl SceneKind {
    pub fn toggle(self) -> Self {
        match self {
            SceneKind::Carousel => SceneKind::Slideshow,
            SceneKind::Slideshow => SceneKind::Carousel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SceneKind::Carousel => "carousel",
            SceneKind::Slideshow => "slideshow",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SceneKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carousel" => Ok(SceneKind::Carousel),
            "slideshow" | "slides" => Ok(SceneKind::Slideshow),
            other => Err(Error::Config(format!("unknown scene '{other}'"))),
        }
    }
}

/// Everything needed to mount one scene
#[derive(Debug, Clone)]
pub struct ScenePlan {
    pub kind: SceneKind,
    pub slides: Vec<Slide>,
    pub windows: Vec<SlideWindow>,
    pub timeline: TimelineConfig,
    pub motion: SlideMotion,
    pub ring: Option<(CircularLayout, Option<Spring>)>,
}

impl ScenePlan {
    /// Assemble a scene for slides weighted by `weights`
    ///
    /// Equal weights produce the uniform plan, so the current index follows
    /// `floor(progress * total)`.
    pub fn build(
        kind: SceneKind,
        config: &AppConfig,
        weights: &[f64],
        metrics: &LayoutMetrics,
    ) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidPlan("scene has no slides".to_string()));
        }

        let (hold, overlap) = match kind {
            SceneKind::Carousel => (config.carousel.hold_fraction, config.carousel.overlap_fraction),
            SceneKind::Slideshow => (
                config.slideshow.hold_fraction,
                config.slideshow.overlap_fraction,
            ),
        };

        let uniform = weights.windows(2).all(|w| w[0] == w[1]);
        let (slides, windows) = if uniform {
            (Slide::uniform(weights.len()), plan(weights.len(), hold, overlap)?)
        } else {
            (Slide::weighted(weights), plan_weighted(weights, hold, overlap)?)
        };

        let timeline = TimelineConfig {
            total_units: config.timeline.units_per_slide * weights.len() as f64,
            slides: weights.len(),
            scrub_smoothing: config.timeline.scrub_smoothing,
            snap_to_slide: config.timeline.snap_to_slide,
            snap_idle_frames: config.timeline.snap_idle_frames,
        };

        let (motion, ring) = match kind {
            SceneKind::Carousel => {
                let c = &config.carousel;
                let layout = CircularLayout {
                    radius: metrics.radius,
                    falloff_rate: c.falloff_rate,
                    scale_falloff_rate: c.scale_falloff_rate,
                    min_opacity: c.min_opacity,
                    min_scale: c.min_scale,
                };
                let spring = (c.spring_stiffness > 0.0)
                    .then(|| Spring::new(0.0, c.spring_stiffness, c.spring_damping));
                (SlideMotion::fade_scale(0.9, c.easing), Some((layout, spring)))
            }
            SceneKind::Slideshow => {
                let s = &config.slideshow;
                let mut motion = SlideMotion::vertical(metrics.slide_offset, s.easing);
                motion.enter_from.scale = s.hidden_scale;
                motion.exit_to.scale = s.hidden_scale;
                (motion, None)
            }
        };

        Ok(Self {
            kind,
            slides,
            windows,
            timeline,
            motion,
            ring,
        })
    }

    /// Uniformly weighted scene of `total` slides
    pub fn uniform(
        kind: SceneKind,
        config: &AppConfig,
        total: usize,
        metrics: &LayoutMetrics,
    ) -> Result<Self> {
        Self::build(kind, config, &vec![1.0; total], metrics)
    }

    /// Build a choreographer for this scene writing into `target`
    pub fn choreographer<T: VisualTarget>(&self, target: T) -> Result<Choreographer<T>> {
        let mut choreo = Choreographer::new(target, self.motion);
        if let Some((layout, spring)) = &self.ring {
            choreo = choreo.with_ring(*layout, spring.clone());
        }
        choreo.bind_slides(self.slides.clone(), self.windows.clone())?;
        Ok(choreo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreo::orchestrator::VisualBuffer;

    fn metrics() -> LayoutMetrics {
        LayoutMetrics {
            radius: 30.0,
            slide_offset: 6.0,
            card_width: 20.0,
            tilt_enabled: true,
        }
    }

    #[test]
    fn test_scene_kind_parse_and_toggle() {
        assert_eq!("Carousel".parse::<SceneKind>().unwrap(), SceneKind::Carousel);
        assert_eq!("slideshow".parse::<SceneKind>().unwrap(), SceneKind::Slideshow);
        assert!("wheel".parse::<SceneKind>().is_err());
        assert_eq!(SceneKind::Carousel.toggle(), SceneKind::Slideshow);
        assert_eq!(SceneKind::Slideshow.to_string(), "slideshow");
    }

    #[test]
    fn test_slideshow_plan_uses_config() {
        let config = AppConfig::default();
        let plan = ScenePlan::uniform(SceneKind::Slideshow, &config, 5, &metrics()).unwrap();
        assert_eq!(plan.windows.len(), 5);
        assert!((plan.windows[2].hold_end - 0.57).abs() < 1e-9);
        assert_eq!(plan.timeline.total_units, 5.0);
        assert_eq!(plan.motion.enter_from.translate_y, 6.0);
        assert_eq!(plan.motion.enter_from.scale, 0.96);
        assert!(plan.ring.is_none());
    }

    #[test]
    fn test_timeline_span_scales_with_units_per_slide() {
        let mut config = AppConfig::default();
        config.timeline.units_per_slide = 2.0;
        let plan = ScenePlan::uniform(SceneKind::Slideshow, &config, 4, &metrics()).unwrap();
        assert_eq!(plan.timeline.total_units, 8.0);
        assert_eq!(plan.timeline.slides, 4);
    }

    #[test]
    fn test_carousel_plan_has_ring() {
        let config = AppConfig::default();
        let plan = ScenePlan::uniform(SceneKind::Carousel, &config, 7, &metrics()).unwrap();
        let (layout, spring) = plan.ring.clone().unwrap();
        assert_eq!(layout.radius, 30.0);
        assert_eq!(layout.falloff_rate, 0.4);
        assert!(spring.is_some());

        let choreo = plan.choreographer(VisualBuffer::new(7)).unwrap();
        assert_eq!(choreo.len(), 7);
        assert_eq!(choreo.reference(), Some(0.0));
    }

    #[test]
    fn test_carousel_without_spring() {
        let mut config = AppConfig::default();
        config.carousel.spring_stiffness = 0.0;
        let plan = ScenePlan::uniform(SceneKind::Carousel, &config, 3, &metrics()).unwrap();
        assert!(plan.ring.unwrap().1.is_none());
    }

    #[test]
    fn test_weighted_plan() {
        let config = AppConfig::default();
        let plan =
            ScenePlan::build(SceneKind::Slideshow, &config, &[1.0, 3.0], &metrics()).unwrap();
        assert!((plan.windows[1].start - 0.25).abs() < 1e-9);
        assert!((plan.slides[1].duration_share - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_plan_drives_a_connected_choreographer() {
        use crate::choreo::timeline::tests::FakeSurface;
        use crate::choreo::timeline::{ScrollTimeline, SectionId};
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut config = AppConfig::default();
        config.timeline.scrub_smoothing = 0.0;
        let weights = [1.0, 1.0, 2.0];
        let plan = ScenePlan::build(SceneKind::Slideshow, &config, &weights, &metrics()).unwrap();
        let section = SectionId(3);
        let mut timeline = ScrollTimeline::new(FakeSurface::with_section(section, 0.0, 100.0));
        let choreo = Rc::new(RefCell::new(
            plan.choreographer(VisualBuffer::new(plan.slides.len())).unwrap(),
        ));
        let handle = Choreographer::connect(&choreo, &mut timeline, section, plan.timeline).unwrap();

        let span = timeline.span(handle).unwrap();
        timeline.surface_mut().scroll = span * 0.6;
        timeline.notify_scroll();
        timeline.frame(0.016);
        choreo.borrow_mut().frame(0.016);
        assert!((choreo.borrow().progress() - 0.6).abs() < 1e-9);
        assert_eq!(choreo.borrow().current_index(), 2);
    }

    #[test]
    fn test_empty_scene_is_rejected() {
        let config = AppConfig::default();
        assert!(matches!(
            ScenePlan::uniform(SceneKind::Carousel, &config, 0, &metrics()),
            Err(Error::InvalidPlan(_))
        ));
    }
}
