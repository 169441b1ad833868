#![warn(missing_docs)]
//! A target-chasing environment for the Robobo robot.
//!
//! [`RoboboEnv`] implements [`robochase_core::Env`]. An agent drives a
//! differential-drive robot with a camera and infrared proximity sensors, and
//! is rewarded for keeping a colored target centered and close while avoiding
//! walls.
//!
//! ## Collaborators
//!
//! The environment does not talk to a robot by itself. The camera, the motors
//! and, in simulation, the ground-truth poses are injected as [`RobotPorts`].
//! [`KinematicWorld`] implements every port with a small 2-D simulator, and
//! [`DetectionBlobSensor`] turns an object detector into a blob sensor.
//!
//! ## Observation
//!
//! Every step produces a [`RoboboObs`]. Missing readings never show up as
//! errors. A lost blob becomes the `(-1, -1)` sentinel, which the
//! [`TargetMemory`] may replace with an inferred exit direction, and an empty
//! infrared reading becomes all zeros. [`TargetProvenance`] tells which of these
//! cases produced the target position.
//!
//! ## Action
//!
//! [`RoboboAct`] is a velocity increment `(forward, turn)`. The resulting wheel
//! velocities are clamped to the configured bounds before being commanded.
//!
//! ## History
//!
//! Rewards and trajectories of every step are collected per episode and moved
//! to a [`History`] at the next reset, or when [`RoboboEnv::finish`] is called.
mod act;
mod config;
mod detection;
mod env;
mod error;
mod frame;
mod history;
mod memory;
mod obs;
mod port;
mod reward;
pub mod sim;
pub use act::RoboboAct;
pub use config::{
    ApproachBand, CameraTilt, CenteringShape, IrLayout, ObstacleConfig, RewardConfig,
    RoboboEnvConfig,
};
pub use detection::{Detection, DetectionBlobSensor, ObjectDetector};
pub use env::{RoboboEnv, RoboboInfo};
pub use error::{EnvError, TransportError};
pub use frame::{read_frame, SensorFrame};
pub use history::{EpisodeRecord, History, HistoryRow, HistorySummary};
pub use memory::TargetMemory;
pub use obs::{IrReadings, RoboboObs, TargetProvenance};
pub use port::{
    ActuatorPort, ColorBlob, IrChannel, PosePort, Position, RobotPorts, SensorPort,
};
pub use reward::{
    distance_from_size, ground_distance, RewardBreakdown, RewardEvaluator, EPSILON,
};
pub use sim::{KinematicWorld, KinematicWorldConfig};

/// Horizontal center of the camera frame in percent.
pub const FRAME_CENTER: i32 = 50;

/// Exit-left sentinel and "not visible" coordinate.
pub const LOST_LOW: i32 = -1;

/// Exit-right sentinel.
pub const LOST_HIGH: i32 = 101;
