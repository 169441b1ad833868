//! Configuration of [`RoboboEnv`](crate::RoboboEnv).
//!
//! The configuration is an explicit value handed to the environment at
//! construction and validated there, so a bad weight fails before the first
//! episode. It round-trips through YAML:
//!
//! ```yaml
//! steps_per_episode: 50
//! velocity_min: -2.0
//! velocity_max: 2.0
//! reward:
//!   alpha1: 1.0
//!   sigma: 15.0
//!   centering:
//!     kind: gaussian
//!     width: 200.0
//! ```
//!
//! The reward weights accept both their descriptive names and the legacy keys
//! `alpha1` to `alpha6`.
use crate::{EnvError, IrChannel, Position};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Which infrared channels feed the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrLayout {
    /// Front and back center sensors.
    Axial,

    /// Front and back center sensors plus the four lateral front sensors.
    Full,
}

impl IrLayout {
    /// Channels included in this layout.
    pub fn channels(&self) -> &'static [IrChannel] {
        match self {
            IrLayout::Axial => &IrChannel::ALL[..2],
            IrLayout::Full => &IrChannel::ALL,
        }
    }
}

/// Shape of the centering term as a function of the horizontal offset
/// `|x - 50|` of the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CenteringShape {
    /// `exp(-offset^2 / width)`.
    Gaussian {
        /// Squared-offset scale; clamped away from zero.
        width: f32,
    },

    /// A staircase of discrete bands.
    Banded {
        /// Offsets below this value earn `near_reward`.
        near: f32,

        /// Offsets below this value (and not near) earn `mid_reward`.
        far: f32,

        /// Reward of the innermost band.
        near_reward: f32,

        /// Reward of the middle band.
        mid_reward: f32,

        /// Reward beyond `far`, usually negative.
        outside_reward: f32,
    },
}

impl Default for CenteringShape {
    fn default() -> Self {
        Self::Banded {
            near: 10.0,
            far: 25.0,
            near_reward: 20.0,
            mid_reward: 10.0,
            outside_reward: -5.0,
        }
    }
}

/// A front-IR level earning a fixed approach reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApproachBand {
    /// The band applies when the front reading is above this value.
    pub threshold: i32,

    /// Reward of the band.
    pub reward: f32,
}

impl ApproachBand {
    /// Constructs an [`ApproachBand`].
    pub fn new(threshold: i32, reward: f32) -> Self {
        Self { threshold, reward }
    }
}

/// Obstacle-avoidance penalty.
///
/// Each channel above `threshold` is penalised by `(reading - threshold) * weight`.
/// Inner lateral channels, which face the direction of travel, weigh more than
/// outer ones. The front center channel only counts while no target is
/// measured; otherwise it drives the approach bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObstacleConfig {
    /// Activation threshold shared by all channels.
    pub threshold: i32,

    /// Weight of the front center channel while searching.
    pub front_weight: f32,

    /// Weight of the back center channel.
    pub back_weight: f32,

    /// Weight of the inner lateral channels.
    pub inner_weight: f32,

    /// Weight of the outer lateral channels.
    pub outer_weight: f32,

    /// Fixed penalty when the back channel is above the threshold.
    pub back_collision_penalty: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            threshold: 100,
            front_weight: 0.3,
            back_weight: 0.3,
            inner_weight: 0.25,
            outer_weight: 0.15,
            back_collision_penalty: 20.0,
        }
    }
}

/// Weights and shapes of the shaped reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    /// Weight of the centering term.
    #[serde(alias = "alpha1")]
    pub centering_weight: f32,

    /// Weight of the Gaussian distance term.
    #[serde(alias = "alpha2")]
    pub distance_weight: f32,

    /// Scale of the obstacle-avoidance penalty.
    #[serde(alias = "alpha3")]
    pub obstacle_weight: f32,

    /// Weight of the blob-size term.
    #[serde(alias = "alpha4")]
    pub size_weight: f32,

    /// Magnitude of the penalty applied while the target is not visible.
    #[serde(alias = "alpha5")]
    pub lost_penalty: f32,

    /// Bonus when the target is both centered and close.
    #[serde(alias = "alpha6")]
    pub success_bonus: f32,

    /// Distance scale of the Gaussian distance term; clamped away from zero.
    pub sigma: f32,

    /// Shape of the centering term.
    pub centering: CenteringShape,

    /// Front-IR approach rewards, from the nearest band to the farthest.
    /// The first matching band wins.
    pub approach_bands: Vec<ApproachBand>,

    /// Obstacle-avoidance penalty.
    pub obstacle: ObstacleConfig,

    /// Largest centering offset that still counts as a success.
    pub success_max_offset: f32,

    /// Smallest front reading that counts as a success.
    pub success_min_front_ir: i32,

    /// Reward per unit of total wheel speed while searching.
    pub exploration_weight: f32,

    /// Upper bound of the exploration incentive.
    pub exploration_cap: f32,

    /// Suppress the obstacle penalty while a visible target is being pursued.
    pub gate_on_visibility: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            centering_weight: 1.0,
            distance_weight: 0.5,
            obstacle_weight: 1.0,
            size_weight: 0.1,
            lost_penalty: 100.0,
            success_bonus: 50.0,
            sigma: 15.0,
            centering: CenteringShape::default(),
            approach_bands: vec![
                ApproachBand::new(500, 100.0),
                ApproachBand::new(300, 50.0),
                ApproachBand::new(200, 25.0),
                ApproachBand::new(100, 10.0),
            ],
            obstacle: ObstacleConfig::default(),
            success_max_offset: 15.0,
            success_min_front_ir: 300,
            exploration_weight: 0.1,
            exploration_cap: 2.0,
            gate_on_visibility: true,
        }
    }
}

impl RewardConfig {
    /// Checks weights and shapes.
    pub fn validate(&self) -> Result<(), EnvError> {
        let weights = [
            ("centering_weight", self.centering_weight),
            ("distance_weight", self.distance_weight),
            ("obstacle_weight", self.obstacle_weight),
            ("size_weight", self.size_weight),
            ("lost_penalty", self.lost_penalty),
            ("success_bonus", self.success_bonus),
            ("exploration_weight", self.exploration_weight),
            ("exploration_cap", self.exploration_cap),
            ("obstacle.front_weight", self.obstacle.front_weight),
            ("obstacle.back_weight", self.obstacle.back_weight),
            ("obstacle.inner_weight", self.obstacle.inner_weight),
            ("obstacle.outer_weight", self.obstacle.outer_weight),
            (
                "obstacle.back_collision_penalty",
                self.obstacle.back_collision_penalty,
            ),
        ];
        for (name, w) in weights.iter() {
            if !w.is_finite() || *w < 0.0 {
                return Err(EnvError::Config(format!(
                    "{} must be finite and non-negative, got {}",
                    name, w
                )));
            }
        }

        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(EnvError::Config(format!(
                "sigma must be finite and non-negative, got {}",
                self.sigma
            )));
        }

        for band in self.approach_bands.iter() {
            if !band.reward.is_finite() {
                return Err(EnvError::Config(format!(
                    "approach band reward must be finite, got {} at threshold {}",
                    band.reward, band.threshold
                )));
            }
        }
        for pair in self.approach_bands.windows(2) {
            if pair[0].threshold <= pair[1].threshold || pair[0].reward < pair[1].reward {
                return Err(EnvError::Config(format!(
                    "approach bands must have decreasing thresholds and non-increasing rewards, \
                     got ({}, {}) before ({}, {})",
                    pair[0].threshold, pair[0].reward, pair[1].threshold, pair[1].reward
                )));
            }
        }

        match self.centering {
            CenteringShape::Gaussian { width } => {
                if !width.is_finite() || width < 0.0 {
                    return Err(EnvError::Config(format!(
                        "centering width must be finite and non-negative, got {}",
                        width
                    )));
                }
            }
            CenteringShape::Banded {
                near,
                far,
                near_reward,
                mid_reward,
                outside_reward,
            } => {
                if !(0.0 <= near && near <= far) {
                    return Err(EnvError::Config(format!(
                        "centering bands must satisfy 0 <= near <= far, got near={} far={}",
                        near, far
                    )));
                }
                if !(near_reward >= mid_reward && mid_reward >= outside_reward) {
                    return Err(EnvError::Config(
                        "centering band rewards must not increase with the offset".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Camera tilt commanded at every reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraTilt {
    /// Tilt angle in degrees.
    pub tilt: i32,

    /// Tilt speed.
    pub speed: i32,
}

/// Configuration of [`RoboboEnv`](crate::RoboboEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoboboEnvConfig {
    /// Number of steps of an episode.
    pub steps_per_episode: usize,

    /// Lower bound of the wheel velocity, at most zero since episodes start at rest.
    pub velocity_min: f32,

    /// Upper bound of the wheel velocity.
    pub velocity_max: f32,

    /// Displacement per axis of the random walk of the target, simulation only.
    pub target_walk_speed: f32,

    /// Robot pose applied after every simulator reset.
    pub initial_pose: Option<Position>,

    /// Log the reward breakdown of every step at info level.
    pub verbose: bool,

    /// Run against a real robot; no ground-truth poses are available.
    pub real_world: bool,

    /// Settling delay after each wheel command, in milliseconds.
    pub settle_millis: u64,

    /// Camera tilt commanded at reset.
    pub camera_tilt: Option<CameraTilt>,

    /// Infrared channels included in the observation.
    pub ir_layout: IrLayout,

    /// Shaped reward.
    pub reward: RewardConfig,
}

impl Default for RoboboEnvConfig {
    fn default() -> Self {
        Self {
            steps_per_episode: 10,
            velocity_min: -15.0,
            velocity_max: 15.0,
            target_walk_speed: 20.0,
            initial_pose: None,
            verbose: false,
            real_world: false,
            settle_millis: 1000,
            camera_tilt: None,
            ir_layout: IrLayout::Full,
            reward: RewardConfig::default(),
        }
    }
}

impl RoboboEnvConfig {
    /// Sets the number of steps of an episode.
    pub fn steps_per_episode(mut self, v: usize) -> Self {
        self.steps_per_episode = v;
        self
    }

    /// Sets the velocity bounds.
    pub fn velocity_bounds(mut self, min: f32, max: f32) -> Self {
        self.velocity_min = min;
        self.velocity_max = max;
        self
    }

    /// Sets the random-walk displacement of the target.
    pub fn target_walk_speed(mut self, v: f32) -> Self {
        self.target_walk_speed = v;
        self
    }

    /// Sets the robot pose applied after every reset.
    pub fn initial_pose(mut self, v: Option<Position>) -> Self {
        self.initial_pose = v;
        self
    }

    /// Sets the verbosity flag.
    pub fn verbose(mut self, v: bool) -> Self {
        self.verbose = v;
        self
    }

    /// Selects real-world mode.
    pub fn real_world(mut self, v: bool) -> Self {
        self.real_world = v;
        self
    }

    /// Sets the settling delay in milliseconds.
    pub fn settle_millis(mut self, v: u64) -> Self {
        self.settle_millis = v;
        self
    }

    /// Sets the camera tilt commanded at reset.
    pub fn camera_tilt(mut self, v: Option<CameraTilt>) -> Self {
        self.camera_tilt = v;
        self
    }

    /// Sets the infrared layout.
    pub fn ir_layout(mut self, v: IrLayout) -> Self {
        self.ir_layout = v;
        self
    }

    /// Sets the reward configuration.
    pub fn reward(mut self, v: RewardConfig) -> Self {
        self.reward = v;
        self
    }

    /// Checks the configuration. Called by [`RoboboEnv::new`](crate::RoboboEnv::new).
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.steps_per_episode == 0 {
            return Err(EnvError::Config(
                "steps_per_episode must be positive".to_string(),
            ));
        }
        if !self.velocity_min.is_finite()
            || !self.velocity_max.is_finite()
            || self.velocity_min >= self.velocity_max
            || self.velocity_min > 0.0
            || self.velocity_max < 0.0
        {
            return Err(EnvError::Config(format!(
                "velocity bounds must be finite with min <= 0 <= max and min < max, got [{}, {}]",
                self.velocity_min, self.velocity_max
            )));
        }
        if !self.target_walk_speed.is_finite() || self.target_walk_speed < 0.0 {
            return Err(EnvError::Config(format!(
                "target_walk_speed must be finite and non-negative, got {}",
                self.target_walk_speed
            )));
        }
        self.reward.validate()
    }

    /// Constructs [`RoboboEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RoboboEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
