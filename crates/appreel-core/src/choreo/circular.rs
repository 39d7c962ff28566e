//! Atomic layer: Circular Layout Calculator
//!
//! Places `total` items evenly around a ring and fades/shrinks them with
//! their shortest angular distance to a reference item.

use serde::{Deserialize, Serialize};

/// Placement of one item on the ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircularPosition {
    /// Horizontal offset from the ring's front point
    pub offset_x: f64,
    /// Depth offset; 0 at the front, `-2 * radius` at the back
    pub offset_z: f64,
    /// Item rotation around the vertical axis, in degrees
    pub rotation: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl CircularPosition {
    /// Front-and-centre placement
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_z: 0.0,
        rotation: 0.0,
        opacity: 1.0,
        scale: 1.0,
    };
}

/// Ring geometry and falloff parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularLayout {
    pub radius: f64,
    /// Opacity lost per unit of normalized distance
    pub falloff_rate: f64,
    /// Scale lost per unit of normalized distance
    pub scale_falloff_rate: f64,
    pub min_opacity: f64,
    pub min_scale: f64,
}

impl Default for CircularLayout {
    fn default() -> Self {
        Self {
            radius: 400.0,
            falloff_rate: 0.4,
            scale_falloff_rate: 0.3,
            min_opacity: 0.2,
            min_scale: 0.7,
        }
    }
}

/// Shortest distance between two ring slots, wrapping around `total`
///
/// Fractional positions are allowed so a reference that is between two
/// items yields a continuous falloff. Always in `[0, total / 2]` and
/// symmetric in its first two arguments.
pub fn angular_distance(index: f64, reference: f64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let delta = (index - reference).rem_euclid(n);
    delta.min(n - delta)
}

impl CircularLayout {
    pub fn with_radius(self, radius: f64) -> Self {
        Self { radius, ..self }
    }

    /// Angle of slot `index` in degrees
    #[inline]
    pub fn slot_angle(index: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        360.0 / total as f64 * index as f64
    }

    /// Rotation to apply to the whole ring so `reference` faces the viewer
    #[inline]
    pub fn ring_rotation(reference: f64, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        -reference * 360.0 / total as f64
    }

    /// Fractional reference slot for a scroll progress value
    ///
    /// Progress inside slide `i`'s share maps to `[i - 0.5, i + 0.5)`, so the
    /// nearest slot always agrees with the discrete current index.
    pub fn reference_from_progress(progress: f64, total: usize) -> f64 {
        if total == 0 || progress.is_nan() {
            return 0.0;
        }
        let last = (total - 1) as f64;
        (progress.clamp(0.0, 1.0) * total as f64 - 0.5).clamp(0.0, last)
    }

    /// Normalized distance: 0 at the reference, 1 at the opposite side
    pub fn normalized_distance(index: usize, total: usize, reference: f64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        angular_distance(index as f64, reference, total) / (total as f64 / 2.0)
    }

    /// Place item `index` of `total` relative to `reference`
    ///
    /// Positions are in ring space, before the ring rotation is applied, so
    /// slot 0 sits at the front (`offset_z == 0`).
    pub fn layout(&self, index: usize, total: usize, reference: f64) -> CircularPosition {
        if total == 0 {
            return CircularPosition::IDENTITY;
        }

        let angle = Self::slot_angle(index, total);
        let radians = angle.to_radians();
        let normalized = Self::normalized_distance(index, total, reference);

        CircularPosition {
            offset_x: radians.sin() * self.radius,
            offset_z: radians.cos() * self.radius - self.radius,
            rotation: angle,
            opacity: (1.0 - normalized * self.falloff_rate).max(self.min_opacity),
            scale: (1.0 - normalized * self.scale_falloff_rate).max(self.min_scale),
        }
    }

    /// Place item `index` as seen after rotating the ring toward `reference`
    ///
    /// The reference slot ends up at the front with `offset_z == 0`.
    pub fn layout_facing(&self, index: usize, total: usize, reference: f64) -> CircularPosition {
        let mut position = self.layout(index, total, reference);
        if total == 0 {
            return position;
        }
        let angle = Self::slot_angle(index, total) + Self::ring_rotation(reference, total);
        let radians = angle.to_radians();
        position.offset_x = radians.sin() * self.radius;
        position.offset_z = radians.cos() * self.radius - self.radius;
        position.rotation = angle;
        position
    }

    /// Layout of every slot, in index order
    pub fn layout_all(&self, total: usize, reference: f64) -> Vec<CircularPosition> {
        (0..total)
            .map(|i| self.layout_facing(i, total, reference))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_item_is_fully_visible() {
        let layout = CircularLayout::default();
        for total in 1..=24 {
            for index in 0..total {
                let pos = layout.layout(index, total, index as f64);
                assert_eq!(pos.opacity, 1.0, "total={} index={}", total, index);
                assert_eq!(pos.scale, 1.0, "total={} index={}", total, index);
            }
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let layout = CircularLayout::default();
        for total in 1..=12 {
            for i in 0..total {
                for r in 0..total {
                    let a = layout.layout(i, total, r as f64);
                    let b = layout.layout(r, total, i as f64);
                    assert_eq!(a.opacity, b.opacity, "total={} i={} r={}", total, i, r);
                    assert_eq!(a.scale, b.scale);
                }
            }
        }
    }

    #[test]
    fn test_seven_items_falloff() {
        let layout = CircularLayout::default().with_radius(400.0);
        assert_eq!(angular_distance(3.0, 0.0, 7), 3.0);
        let normalized = CircularLayout::normalized_distance(3, 7, 0.0);
        assert!((normalized - 0.857).abs() < 0.001);
        let pos = layout.layout(3, 7, 0.0);
        assert!((pos.opacity - 0.657).abs() < 0.001, "opacity={}", pos.opacity);
    }

    #[test]
    fn test_wraparound_uses_shortest_path() {
        assert_eq!(angular_distance(7.0, 0.0, 8), 1.0);
        assert_eq!(angular_distance(0.0, 7.0, 8), 1.0);
        assert_eq!(angular_distance(4.0, 0.0, 8), 4.0);
        assert!((angular_distance(0.0, 7.5, 8) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_falloff_floors() {
        let layout = CircularLayout {
            falloff_rate: 5.0,
            scale_falloff_rate: 5.0,
            ..Default::default()
        };
        let pos = layout.layout(4, 8, 0.0);
        assert_eq!(pos.opacity, 0.2);
        assert_eq!(pos.scale, 0.7);
    }

    #[test]
    fn test_geometry() {
        let layout = CircularLayout::default().with_radius(100.0);
        let front = layout.layout(0, 4, 0.0);
        assert!(front.offset_x.abs() < 1e-9);
        assert!(front.offset_z.abs() < 1e-9);

        let side = layout.layout(1, 4, 0.0);
        assert!((side.offset_x - 100.0).abs() < 1e-9);
        assert!((side.offset_z + 100.0).abs() < 1e-9);
        assert_eq!(side.rotation, 90.0);

        let back = layout.layout(2, 4, 0.0);
        assert!((back.offset_z + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_facing_brings_reference_to_front() {
        let layout = CircularLayout::default().with_radius(50.0);
        let pos = layout.layout_facing(3, 6, 3.0);
        assert!(pos.offset_x.abs() < 1e-9);
        assert!(pos.offset_z.abs() < 1e-9);
        assert_eq!(pos.opacity, 1.0);
    }

    #[test]
    fn test_reference_from_progress_agrees_with_index() {
        use crate::choreo::window::current_index;
        for step in 0..=200 {
            let p = step as f64 / 200.0;
            let reference = CircularLayout::reference_from_progress(p, 8);
            assert_eq!(reference.round() as usize, current_index(p, 8), "p={}", p);
        }
    }

    #[test]
    fn test_empty_ring() {
        let layout = CircularLayout::default();
        assert_eq!(layout.layout(0, 0, 0.0), CircularPosition::IDENTITY);
        assert!(layout.layout_all(0, 0.0).is_empty());
    }
}
