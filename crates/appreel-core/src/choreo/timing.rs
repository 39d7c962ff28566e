//! Atomic layer: interpolation utilities and a damped spring
//!
//! Everything here is a pure function of its inputs except `Spring`, whose
//! state only advances through explicit `step` calls.

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Position of `value` between `from` and `to`, clamped to [0, 1]
///
/// Returns 1.0 for an empty range so a zero-length phase counts as finished.
#[inline]
pub fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    let span = to - from;
    if span.abs() <= f64::EPSILON {
        return if value >= from { 1.0 } else { 0.0 };
    }
    clamp01((value - from) / span)
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Fraction of the remaining distance covered in one frame of an exponential
/// follow with time constant `tau` seconds
#[inline]
pub fn smoothing_factor(dt: f64, tau: f64) -> f64 {
    if tau <= 0.0 || dt <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / tau).exp()
}

/// Damped harmonic spring that follows a target value
///
/// Integrated with semi-implicit Euler in fixed sub-steps so the result does
/// not depend on how the caller slices frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
}

impl Spring {
    /// Largest integration step in seconds
    const MAX_STEP: f64 = 1.0 / 240.0;
    /// Distance and speed below which the spring snaps onto its target
    const REST_EPSILON: f64 = 1e-3;

    pub fn new(value: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            stiffness: stiffness.max(0.0),
            damping: damping.max(0.0),
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jump to a value and stop all motion
    pub fn snap_to(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Stop in place, keeping the current value as the new target
    pub fn cancel(&mut self) {
        self.target = self.value;
        self.velocity = 0.0;
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advance the spring by `dt` seconds and return the new value
    ///
    /// A spring with zero stiffness has nothing pulling it and jumps straight
    /// to its target.
    pub fn step(&mut self, dt: f64) -> f64 {
        if self.is_settled() || dt <= 0.0 || !dt.is_finite() {
            return self.value;
        }
        if self.stiffness == 0.0 {
            self.snap_to(self.target);
            return self.value;
        }

        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(Self::MAX_STEP);
            let accel = self.stiffness * (self.target - self.value) - self.damping * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        if (self.target - self.value).abs() < Self::REST_EPSILON
            && self.velocity.abs() < Self::REST_EPSILON
        {
            self.snap_to(self.target);
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_inverse_lerp() {
        assert!((inverse_lerp(0.2, 0.4, 0.3) - 0.5).abs() < 1e-9);
        assert_eq!(inverse_lerp(0.2, 0.4, 0.1), 0.0);
        assert_eq!(inverse_lerp(0.2, 0.4, 0.9), 1.0);
        // Empty range
        assert_eq!(inverse_lerp(0.5, 0.5, 0.5), 1.0);
        assert_eq!(inverse_lerp(0.5, 0.5, 0.4), 0.0);
    }

    #[test]
    fn test_smoothing_factor() {
        assert_eq!(smoothing_factor(0.016, 0.0), 1.0);
        let f = smoothing_factor(0.016, 0.1);
        assert!(f > 0.0 && f < 1.0);
    }

    #[test]
    fn test_spring_converges() {
        let mut spring = Spring::new(0.0, 170.0, 26.0);
        spring.set_target(3.0);
        for _ in 0..240 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 3.0);
    }

    #[test]
    fn test_spring_step_independent_of_slicing() {
        let mut a = Spring::new(0.0, 120.0, 14.0);
        let mut b = a.clone();
        a.set_target(1.0);
        b.set_target(1.0);
        a.step(MAX_TEST_STEP * 4.0);
        for _ in 0..4 {
            b.step(MAX_TEST_STEP);
        }
        assert!((a.value() - b.value()).abs() < 1e-9);
    }

    const MAX_TEST_STEP: f64 = 1.0 / 240.0;

    #[test]
    fn test_spring_cancel_stops_motion() {
        let mut spring = Spring::new(0.0, 120.0, 14.0);
        spring.set_target(5.0);
        spring.step(0.05);
        let value = spring.value();
        spring.cancel();
        assert!(spring.is_settled());
        assert_eq!(spring.step(0.5), value);
    }

    #[test]
    fn test_zero_stiffness_jumps() {
        let mut spring = Spring::new(0.0, 0.0, 10.0);
        spring.set_target(2.0);
        assert_eq!(spring.step(0.016), 2.0);
    }
}
