//! Scroll-driven slide choreography
//!
//! Maps one continuous scroll-progress signal onto per-slide enter/hold/exit
//! animation, a discrete current index and a circular card layout.
//!
//! # Architecture
//!
//! ## Atomic layer (pure, no side effects)
//! - `easing` - Easing curves mapping [0, 1] to [0, 1]
//! - `timing` - Interpolation helpers and the damped `Spring`
//! - `window` - Slide Window Planner and the progress to index mapping
//! - `circular` - Circular Layout Calculator
//!
//! ## Molecular layer
//! - `timeline` - ScrollTimeline engine: pins a section on a `ScrollSurface`
//!   and delivers coalesced progress once per frame
//! - `orchestrator` - Choreographer: applies interpolated visual state to a
//!   `VisualTarget` and publishes snapshots
//! - `scene` - Carousel and slideshow presets built from configuration
//!
//! # Usage
//!
//! ```ignore
//! use appreel_core::choreo::{Choreographer, ScrollTimeline, SceneKind, ScenePlan, VisualBuffer};
//!
//! let metrics = config.responsive.resolve(&viewport);
//! let plan = ScenePlan::build(SceneKind::Slideshow, &config, &catalogue.weights(), &metrics)?;
//! let choreo = Rc::new(RefCell::new(plan.choreographer(VisualBuffer::new(plan.slides.len()))?));
//! Choreographer::connect(&choreo, &mut timeline, section, plan.timeline)?;
//!
//! // Each frame, after draining input events:
//! timeline.frame(dt);
//! choreo.borrow_mut().frame(dt);
//! ```

// Atomic layer
pub mod circular;
pub mod easing;
pub mod timing;
pub mod window;

// Molecular layer
pub mod orchestrator;
pub mod scene;
pub mod timeline;

pub use circular::{angular_distance, CircularLayout, CircularPosition};
pub use orchestrator::{
    ChoreoSnapshot, Choreographer, Slide, SlideMotion, SubscriptionId, VisualBuffer, VisualState,
    VisualTarget,
};
pub use scene::{SceneKind, ScenePlan};
pub use timeline::{
    ScrollSurface, ScrollTimeline, SectionGeometry, SectionId, SnapRequest, TimelineConfig,
    TimelineHandle,
};
pub use timing::Spring;
pub use window::{
    current_index, format_counter, index_at, plan, plan_weighted, rest_point_at, rest_points,
    uniform_rest_points, PhaseSample, RestPoint, SlidePhase, SlideWindow,
};
