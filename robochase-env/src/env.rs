//! Episode controller.
use crate::{
    frame::read_frame,
    reward::{distance_from_size, ground_distance},
    EnvError, EpisodeRecord, History, Position, RewardBreakdown, RewardEvaluator, RoboboAct,
    RoboboEnvConfig, RoboboObs, RobotPorts, TargetMemory,
};
use anyhow::Result;
use log::{debug, info, trace, warn};
use robochase_core::{
    record::{Record, RecordValue},
    Env, Info, Step,
};
use std::{thread, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Active,
    Finished,
}

/// Information returned with every step of [`RoboboEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoboboInfo {
    /// Distance to the target used by the reward.
    pub distance: f32,

    /// Contribution of each reward term.
    pub reward: RewardBreakdown,
}

impl Info for RoboboInfo {}

/// The Robobo chase environment.
///
/// Episodes have a fixed length of `steps_per_episode` steps. The values of
/// the finished episode are moved to the [`History`] by the next call of
/// [`RoboboEnv::reset`], so the last episode of a run stays pending until
/// [`RoboboEnv::finish`] is called.
pub struct RoboboEnv {
    config: RoboboEnvConfig,
    ports: RobotPorts,
    reward: RewardEvaluator,
    memory: TargetMemory,
    velocity: [f32; 2],
    count_steps: usize,
    phase: Phase,
    episode: EpisodeRecord,
    history: History,
    rng: fastrand::Rng,
}

impl RoboboEnv {
    /// Constructs [`RoboboEnv`].
    ///
    /// * `seed` - Seed of the target random walk until a seed is given to `reset()`.
    pub fn new(config: RoboboEnvConfig, ports: RobotPorts, seed: u64) -> Result<Self, EnvError> {
        config.validate()?;
        if !config.real_world && ports.pose.is_none() {
            return Err(EnvError::Config(
                "simulation mode requires a pose port".to_string(),
            ));
        }
        info!(
            "Initialize RoboboEnv ({}, {} steps per episode)",
            if config.real_world { "real robot" } else { "simulation" },
            config.steps_per_episode
        );

        Ok(Self {
            reward: RewardEvaluator::new(config.reward.clone()),
            config,
            ports,
            memory: TargetMemory::new(),
            velocity: [0.0, 0.0],
            count_steps: 0,
            phase: Phase::Uninitialized,
            episode: EpisodeRecord::new(),
            history: History::new(),
            rng: fastrand::Rng::with_seed(seed),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RoboboEnvConfig {
        &self.config
    }

    /// Completed episodes.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Consumes the environment and returns its history, including the
    /// pending episode.
    pub fn into_history(mut self) -> History {
        self.finish();
        self.history
    }

    /// Steps taken in the current episode.
    pub fn count_steps(&self) -> usize {
        self.count_steps
    }

    /// Current wheel velocities `[left, right]`.
    pub fn velocity(&self) -> [f32; 2] {
        self.velocity
    }

    /// Target memory of the current episode.
    pub fn memory(&self) -> &TargetMemory {
        &self.memory
    }

    /// Moves the pending episode, if it has any step, to the history.
    pub fn finish(&mut self) {
        if !self.episode.is_empty() {
            let episode = std::mem::take(&mut self.episode);
            debug!(
                "Episode {} recorded, {} steps, return = {}",
                self.history.len(),
                episode.len(),
                episode.total_reward()
            );
            self.history.record_episode(episode);
        }
    }

    /// Starts a new episode and returns the initial observation.
    ///
    /// The random walk is reseeded when `seed` is given.
    pub fn reset_episode(&mut self, seed: Option<u64>) -> Result<RoboboObs, EnvError> {
        trace!("RoboboEnv::reset()");

        self.finish();
        self.phase = Phase::Uninitialized;
        if let Some(seed) = seed {
            self.rng = fastrand::Rng::with_seed(seed);
        }

        if !self.config.real_world {
            self.ports.actuator.reset_simulation()?;
        }

        if let Some(pose) = self.config.initial_pose {
            match self.ports.pose.as_mut() {
                Some(port) => port.set_robot_location(pose)?,
                None => warn!("initial_pose ignored, no pose port available"),
            }
        }

        if let Some(tilt) = self.config.camera_tilt {
            self.ports.actuator.move_tilt_to(tilt.tilt, tilt.speed)?;
        }

        self.memory.invalidate();
        self.count_steps = 0;
        self.velocity = [0.0, 0.0];
        self.phase = Phase::Active;

        Ok(self.observe())
    }

    /// Applies an action and advances the episode by one step.
    ///
    /// On a transport failure the episode is aborted. Steps recorded before
    /// the failure are kept and recorded at the next reset.
    pub fn step_episode(&mut self, act: &RoboboAct) -> Result<(Step<Self>, Record), EnvError> {
        trace!("RoboboEnv::step()");

        match self.phase {
            Phase::Uninitialized => return Err(EnvError::NotReset),
            Phase::Finished => return Err(EnvError::EpisodeFinished(self.count_steps)),
            Phase::Active => {}
        }
        if !act.is_finite() {
            return Err(EnvError::InvalidAction(format!("{:?}", act)));
        }

        let velocity = act.apply(
            self.velocity,
            self.config.velocity_min,
            self.config.velocity_max,
        );
        self.velocity = velocity;
        if let Err(e) = self.ports.actuator.move_wheels(velocity[0], velocity[1]) {
            self.phase = Phase::Finished;
            return Err(e.into());
        }

        if self.config.settle_millis > 0 {
            thread::sleep(Duration::from_millis(self.config.settle_millis));
        }

        let obs = self.observe();
        let (target, robot) = self.read_poses();
        let distance = match (target, robot) {
            (Some(t), Some(r)) if !self.config.real_world => ground_distance(t, r),
            _ => distance_from_size(obs.target_size),
        };
        let breakdown = self.reward.evaluate(&obs, distance);
        let reward = breakdown.total();

        if !self.config.real_world {
            if let Err(e) = self.walk_target() {
                self.phase = Phase::Finished;
                return Err(e);
            }
        }

        self.episode.push(
            reward,
            target.unwrap_or([0.0, 0.0]),
            robot.unwrap_or([0.0, 0.0]),
        );
        self.count_steps += 1;
        let is_done = self.count_steps == self.config.steps_per_episode;
        if is_done {
            self.phase = Phase::Finished;
        }

        if self.config.verbose {
            info!(
                "step {}: xy = {:?} ({:?}), distance = {:.2}, reward = {:.3} {:?}",
                self.count_steps, obs.target_xy, obs.provenance, distance, reward, breakdown
            );
        } else {
            debug!(
                "step {}: xy = {:?}, reward = {:.3}",
                self.count_steps, obs.target_xy, reward
            );
        }

        let mut record = breakdown.to_record();
        record.insert("distance", RecordValue::Scalar(distance));
        record.insert(
            "target_xy",
            RecordValue::Array1(vec![obs.target_xy[0] as f32, obs.target_xy[1] as f32]),
        );
        record.insert("wheel_velocity", RecordValue::Array1(velocity.to_vec()));

        let info = RoboboInfo {
            distance,
            reward: breakdown,
        };
        let step = Step::new(obs, *act, reward, is_done, is_done, info);

        Ok((step, record))
    }

    /// Reads the sensors and applies the target memory.
    fn observe(&mut self) -> RoboboObs {
        let frame = read_frame(self.ports.sensors.as_mut(), self.config.ir_layout);
        let (target_xy, provenance) = self.memory.infer(frame.target);

        RoboboObs {
            target_xy,
            provenance,
            target_size: frame.target_size,
            ir: frame.ir,
            wheel_velocity: self.velocity,
            ir_layout: self.config.ir_layout,
        }
    }

    /// Ground-plane positions of the target and the robot.
    ///
    /// `None` for a position that is not available.
    fn read_poses(&mut self) -> (Option<[f32; 2]>, Option<[f32; 2]>) {
        let port = match self.ports.pose.as_mut() {
            Some(port) => port,
            None => return (None, None),
        };

        let target = match port.object_location() {
            Ok(p) => p.map(|p| p.ground()),
            Err(e) => {
                warn!("Object location unavailable: {}", e);
                None
            }
        };
        let robot = match port.robot_location() {
            Ok(p) => Some(p.ground()),
            Err(e) => {
                warn!("Robot location unavailable: {}", e);
                None
            }
        };

        (target, robot)
    }

    /// Moves the target by `±target_walk_speed` on each ground axis.
    fn walk_target(&mut self) -> Result<(), EnvError> {
        let port = match self.ports.pose.as_mut() {
            Some(port) => port,
            None => return Ok(()),
        };

        let p = match port.object_location() {
            Ok(Some(p)) => p,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("Random walk skipped: {}", e);
                return Ok(());
            }
        };

        let s = self.config.target_walk_speed;
        let dx = if self.rng.bool() { s } else { -s };
        let dz = if self.rng.bool() { s } else { -s };
        let next = Position::new(p.x + dx, p.y, p.z + dz);
        trace!("Target moved to {:?}", next);

        port.set_object_location(next)?;
        Ok(())
    }
}

impl Env for RoboboEnv {
    type Obs = RoboboObs;
    type Act = RoboboAct;
    type Info = RoboboInfo;

    /// Starts a new episode. See [`RoboboEnv::reset_episode`].
    fn reset(&mut self, seed: Option<u64>) -> Result<(RoboboObs, Record)> {
        let obs = self.reset_episode(seed)?;
        Ok((obs, Record::empty()))
    }

    /// Runs a step. See [`RoboboEnv::step_episode`].
    fn step(&mut self, a: &RoboboAct) -> Result<(Step<Self>, Record)> {
        Ok(self.step_episode(a)?)
    }
}
