//! Action of [`RoboboEnv`](crate::RoboboEnv).
use robochase_core::Act;
use serde::{Deserialize, Serialize};

/// Velocity increment applied to the wheels.
///
/// `left += forward + turn` and `right += forward - turn`, so a positive
/// `turn` steers to the right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoboboAct {
    /// Increment shared by both wheels.
    pub forward: f32,

    /// Differential increment.
    pub turn: f32,
}

impl RoboboAct {
    /// Constructs a [`RoboboAct`].
    pub fn new(forward: f32, turn: f32) -> Self {
        Self { forward, turn }
    }

    /// Returns `true` if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.forward.is_finite() && self.turn.is_finite()
    }

    /// Applies the increment to `velocity` and clamps the result to `[min, max]`.
    pub fn apply(&self, velocity: [f32; 2], min: f32, max: f32) -> [f32; 2] {
        [
            (velocity[0] + self.forward + self.turn).clamp(min, max),
            (velocity[1] + self.forward - self.turn).clamp(min, max),
        ]
    }
}

impl Act for RoboboAct {
    fn len(&self) -> usize {
        2
    }
}

impl From<[f32; 2]> for RoboboAct {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<RoboboAct> for [f32; 2] {
    fn from(a: RoboboAct) -> Self {
        [a.forward, a.turn]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply_clamps_each_wheel() {
        let a = RoboboAct::new(1.5, 1.0);
        assert_eq!(a.apply([0.0, 0.0], -2.0, 2.0), [2.0, 0.5]);
        assert_eq!(a.apply([2.0, -2.0], -2.0, 2.0), [2.0, -1.5]);

        let a = RoboboAct::new(-10.0, 0.0);
        assert_eq!(a.apply([1.0, 1.0], -2.0, 2.0), [-2.0, -2.0]);
    }

    #[test]
    fn test_non_finite() {
        assert!(RoboboAct::new(0.0, 0.0).is_finite());
        assert!(!RoboboAct::new(f32::NAN, 0.0).is_finite());
        assert!(!RoboboAct::new(0.0, f32::INFINITY).is_finite());
    }
}
