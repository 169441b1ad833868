//! Gesture teleoperation.
use crate::{classify_arm_pose, Gesture, Keypoint};
use anyhow::Result;
use log::{debug, warn};
use robochase_core::{Configurable, Policy};
use robochase_env::{RoboboAct, RoboboEnv, RoboboObs};
use serde::{Deserialize, Serialize};

/// Robot wheel speeds range over `0..=20`, actions over `0..=2`.
const SPEED_TO_ACTION: f32 = 2.0 / 20.0;

/// Configuration of [`TeleopController`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TeleopConfig {
    /// Base speed in robot units.
    pub speed: f32,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self { speed: 20.0 }
    }
}

/// Maps gestures to actions.
#[derive(Clone, Debug)]
pub struct TeleopController {
    speed: f32,
}

impl TeleopController {
    /// Constructs a controller with a base speed in robot units.
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Action for a gesture.
    ///
    /// Raising one arm turns to that side, relaxed or joined raised hands drive
    /// forward, hands at the chest reverse, anything else holds the velocity.
    pub fn action(&self, gesture: Gesture) -> RoboboAct {
        let v = self.speed * SPEED_TO_ACTION;
        match gesture {
            Gesture::RightArm => RoboboAct::new(0.5 * v, 0.5 * v),
            Gesture::LeftArm => RoboboAct::new(0.5 * v, -0.5 * v),
            Gesture::ArmsRelaxed | Gesture::HandsTogetherUp => RoboboAct::new(v, 0.0),
            Gesture::HandsTogetherChest => RoboboAct::new(-v, 0.0),
            Gesture::ArmsCrossed | Gesture::ArmsDown | Gesture::NoArms => RoboboAct::new(0.0, 0.0),
        }
    }
}

impl Configurable for TeleopController {
    type Config = TeleopConfig;

    fn build(config: Self::Config) -> Result<Self> {
        Ok(Self::new(config.speed))
    }
}

/// Supplier of body keypoints, e.g. a pose estimator on a camera stream.
pub trait GestureSource {
    /// Keypoints of the person in the latest frame.
    ///
    /// `None` when no frame is available or nobody is in view.
    fn keypoints(&mut self) -> Result<Option<Vec<Keypoint>>>;
}

/// A [`Policy`] driven by the gestures of a person.
///
/// The observation is ignored.
pub struct TeleopPolicy<S: GestureSource> {
    source: S,
    controller: TeleopController,
    last_gesture: Option<Gesture>,
}

impl<S: GestureSource> TeleopPolicy<S> {
    /// Constructs a [`TeleopPolicy`].
    pub fn new(source: S, controller: TeleopController) -> Self {
        Self {
            source,
            controller,
            last_gesture: None,
        }
    }

    /// The gesture recognized at the last call of `sample()`.
    pub fn last_gesture(&self) -> Option<Gesture> {
        self.last_gesture
    }
}

impl<S: GestureSource> Policy<RoboboEnv> for TeleopPolicy<S> {
    fn sample(&mut self, _obs: &RoboboObs) -> RoboboAct {
        let gesture = match self.source.keypoints() {
            Ok(Some(keypoints)) => classify_arm_pose(&keypoints),
            Ok(None) => Gesture::NoArms,
            Err(e) => {
                warn!("Gesture source failed: {}", e);
                Gesture::NoArms
            }
        };

        if self.last_gesture != Some(gesture) {
            debug!("Gesture: {}", gesture);
        }
        self.last_gesture = Some(gesture);
        self.controller.action(gesture)
    }
}
