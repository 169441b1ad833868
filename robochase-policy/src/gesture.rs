//! Arm-pose classification from body keypoints.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2-D keypoint in image pixels; `y` grows downwards.
///
/// A keypoint the pose estimator did not find is reported at `(0, 0)`.
pub type Keypoint = [f32; 2];

// COCO keypoint indices.
const LEFT_SHOULDER: usize = 5;
const RIGHT_SHOULDER: usize = 6;
const LEFT_WRIST: usize = 9;
const RIGHT_WRIST: usize = 10;

const MIN_SHOULDER_WIDTH: f32 = 1e-6;

/// Arm gestures recognized by [`classify_arm_pose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    /// No person or no wrist detected.
    NoArms,

    /// Both wrists raised and close together.
    HandsTogetherUp,

    /// Both wrists raised and far apart.
    ArmsCrossed,

    /// Both wrists well below the shoulders.
    ArmsDown,

    /// Only the right wrist raised.
    RightArm,

    /// Only the left wrist raised.
    LeftArm,

    /// Wrists together at chest height.
    HandsTogetherChest,

    /// None of the above.
    ArmsRelaxed,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gesture::NoArms => "no arms",
            Gesture::HandsTogetherUp => "hands together up",
            Gesture::ArmsCrossed => "arms crossed",
            Gesture::ArmsDown => "arms down",
            Gesture::RightArm => "right arm",
            Gesture::LeftArm => "left arm",
            Gesture::HandsTogetherChest => "hands together at chest",
            Gesture::ArmsRelaxed => "arms relaxed",
        };
        write!(f, "{}", s)
    }
}

fn detected(p: &Keypoint) -> bool {
    p[0] > 0.0 && p[1] > 0.0
}

/// Classifies the arm pose of a person from COCO-ordered keypoints.
///
/// Heights are compared relative to the shoulder width, so the result does not
/// depend on the distance to the camera. Rules are checked in order and the
/// first match wins.
pub fn classify_arm_pose(keypoints: &[Keypoint]) -> Gesture {
    if keypoints.len() <= RIGHT_WRIST {
        return Gesture::NoArms;
    }

    let (ls, rs) = (keypoints[LEFT_SHOULDER], keypoints[RIGHT_SHOULDER]);
    let (lw, rw) = (keypoints[LEFT_WRIST], keypoints[RIGHT_WRIST]);
    if !detected(&lw) && !detected(&rw) {
        return Gesture::NoArms;
    }

    let width = (rs[0] - ls[0]).abs().max(MIN_SHOULDER_WIDTH);
    let wrist_gap = (rw[0] - lw[0]).abs();

    let left_up = lw[1] < ls[1] - 0.5 * width;
    let right_up = rw[1] < rs[1] - 0.5 * width;
    let left_down = lw[1] > ls[1] + width;
    let right_down = rw[1] > rs[1] + width;

    if left_up && right_up && wrist_gap < 0.5 * width {
        Gesture::HandsTogetherUp
    } else if left_up && right_up && wrist_gap > 1.5 * width {
        Gesture::ArmsCrossed
    } else if left_down && right_down {
        Gesture::ArmsDown
    } else if right_up && !left_up {
        Gesture::RightArm
    } else if left_up && !right_up {
        Gesture::LeftArm
    } else if wrist_gap < 0.3 * width && (lw[1] - rw[1]).abs() < 0.2 * width {
        Gesture::HandsTogetherChest
    } else {
        Gesture::ArmsRelaxed
    }
}
