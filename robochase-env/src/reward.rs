//! Shaped reward of the chase task.
use crate::{CenteringShape, IrChannel, RewardConfig, RoboboObs, FRAME_CENTER};
use nalgebra as na;
use robochase_core::record::{Record, RecordValue};

/// Lower bound of every denominator.
pub const EPSILON: f32 = 1e-6;

/// Contribution of each term to a reward.
///
/// Penalties are stored with their sign, so [`RewardBreakdown::total`] is a
/// plain sum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RewardBreakdown {
    /// Weighted centering term.
    pub centering: f32,

    /// Weighted blob-size term.
    pub size: f32,

    /// Weighted Gaussian distance term.
    pub distance: f32,

    /// Front-IR approach reward.
    pub approach: f32,

    /// Obstacle-avoidance penalty, non-positive.
    pub obstacle: f32,

    /// Lost-target penalty, non-positive.
    pub lost: f32,

    /// Success bonus.
    pub success: f32,

    /// Exploration incentive while searching.
    pub exploration: f32,
}

impl RewardBreakdown {
    /// Sum of all terms.
    pub fn total(&self) -> f32 {
        self.centering
            + self.size
            + self.distance
            + self.approach
            + self.obstacle
            + self.lost
            + self.success
            + self.exploration
    }

    /// Converts the breakdown into a [`Record`].
    pub fn to_record(&self) -> Record {
        let mut record = Record::empty();
        for (k, v) in [
            ("reward_centering", self.centering),
            ("reward_size", self.size),
            ("reward_distance", self.distance),
            ("reward_approach", self.approach),
            ("reward_obstacle", self.obstacle),
            ("reward_lost", self.lost),
            ("reward_success", self.success),
            ("reward_exploration", self.exploration),
        ] {
            record.insert(k, RecordValue::Scalar(v));
        }
        record
    }
}

/// Distance to the target estimated from the blob area.
///
/// Returns `100` when the target is not visible.
pub fn distance_from_size(size: f32) -> f32 {
    if size > 0.0 {
        (5000.0 / size).sqrt().max(EPSILON)
    } else {
        100.0
    }
}

/// Euclidean distance on the ground plane, clamped away from zero.
pub fn ground_distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    na::distance(&na::Point2::from(a), &na::Point2::from(b)).max(EPSILON)
}

/// Computes the shaped reward of an observation.
#[derive(Debug, Clone)]
pub struct RewardEvaluator {
    config: RewardConfig,
}

impl RewardEvaluator {
    /// Constructs a [`RewardEvaluator`]. The configuration is assumed to be validated.
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Unweighted centering value of a horizontal position.
    ///
    /// Non-increasing in `|x - 50|`.
    pub fn centering(&self, x: i32) -> f32 {
        let offset = (x - FRAME_CENTER).abs() as f32;
        match self.config.centering {
            CenteringShape::Gaussian { width } => (-offset * offset / width.max(EPSILON)).exp(),
            CenteringShape::Banded {
                near,
                far,
                near_reward,
                mid_reward,
                outside_reward,
            } => {
                if offset < near {
                    near_reward
                } else if offset < far {
                    mid_reward
                } else {
                    outside_reward
                }
            }
        }
    }

    /// Penalty of the infrared channels above the obstacle threshold.
    ///
    /// The front center channel counts only while no target is measured;
    /// during pursuit it measures the approach to the target.
    pub fn obstacle_penalty(&self, obs: &RoboboObs) -> f32 {
        let c = &self.config.obstacle;
        let excess = |ch: IrChannel| (obs.ir.get(ch) - c.threshold).max(0) as f32;

        let front = if obs.is_target_visible() {
            0.0
        } else {
            excess(IrChannel::FrontC) * c.front_weight
        };
        let mut penalty = front
            + excess(IrChannel::BackC) * c.back_weight
            + (excess(IrChannel::FrontL) + excess(IrChannel::FrontR)) * c.inner_weight
            + (excess(IrChannel::FrontLL) + excess(IrChannel::FrontRR)) * c.outer_weight;
        if obs.ir.back() > c.threshold {
            penalty += c.back_collision_penalty;
        }

        -self.config.obstacle_weight * penalty
    }

    /// Evaluates the reward of `obs`, `distance` being the distance to the target.
    ///
    /// Centering, proximity and the success bonus require a measured target.
    /// Otherwise the lost-target penalty and the exploration incentive apply.
    pub fn evaluate(&self, obs: &RoboboObs, distance: f32) -> RewardBreakdown {
        let c = &self.config;
        let mut r = RewardBreakdown::default();

        if obs.is_target_visible() {
            let offset = (obs.target_xy[0] - FRAME_CENTER).abs() as f32;
            let front = obs.ir.front();

            r.centering = c.centering_weight * self.centering(obs.target_xy[0]);
            r.size = c.size_weight * obs.target_size;

            let d = if distance.is_finite() { distance.max(EPSILON) } else { 100.0 };
            let z = d / c.sigma.max(EPSILON);
            r.distance = c.distance_weight * (-z * z).exp();

            r.approach = c
                .approach_bands
                .iter()
                .find(|band| front > band.threshold)
                .map_or(0.0, |band| band.reward);

            if offset < c.success_max_offset && front > c.success_min_front_ir {
                r.success = c.success_bonus;
            }

            if !c.gate_on_visibility {
                r.obstacle = self.obstacle_penalty(obs);
            }
        } else {
            r.lost = -c.lost_penalty;
            let speed = obs.wheel_velocity[0].abs() + obs.wheel_velocity[1].abs();
            r.exploration = (c.exploration_weight * speed).min(c.exploration_cap);
            r.obstacle = self.obstacle_penalty(obs);
        }

        r
    }
}
