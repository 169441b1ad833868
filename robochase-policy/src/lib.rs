#![warn(missing_docs)]
//! Policies for the Robobo chase environment that run without a deep learning
//! backend.
//!
//! * [`MlpPolicy`] - a feed-forward controller whose weights were trained
//!   elsewhere, e.g. by neuroevolution, and stored in YAML.
//! * [`TeleopPolicy`] - drives the robot from arm gestures of a person in
//!   front of a camera.
mod error;
mod gesture;
mod mat;
mod mlp;
mod teleop;
pub use error::PolicyError;
pub use gesture::{classify_arm_pose, Gesture, Keypoint};
pub use mat::Mat;
pub use mlp::{Mlp, MlpPolicy, MlpPolicyConfig};
pub use teleop::{GestureSource, TeleopConfig, TeleopController, TeleopPolicy};
