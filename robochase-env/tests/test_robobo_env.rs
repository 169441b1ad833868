use anyhow::Result;
use robochase_env::{
    ActuatorPort, CameraTilt, ColorBlob, EnvError, IrLayout, PosePort, Position, RoboboAct,
    RoboboEnv, RoboboEnvConfig, RobotPorts, SensorPort, TargetProvenance, TransportError,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

/// Readings and commands of a scripted robot.
#[derive(Default)]
struct Script {
    blobs: VecDeque<Vec<ColorBlob>>,
    ir: VecDeque<HashMap<String, i32>>,
    wheel_commands: Vec<(f32, f32)>,
    fail_move_at: Option<usize>,
    n_sim_resets: usize,
    tilt: Option<(i32, i32)>,
    robot: Position,
    object: Option<Position>,
}

/// Robot double replaying queued readings. Empty queues read as dropouts.
#[derive(Clone, Default)]
struct ScriptedRobot(Rc<RefCell<Script>>);

impl ScriptedRobot {
    fn new() -> Self {
        let robot = Self::default();
        robot.0.borrow_mut().object = Some(Position::new(100.0, 0.0, 0.0));
        robot
    }

    fn push_blob(&self, x: i32, y: i32, size: f32) {
        self.0
            .borrow_mut()
            .blobs
            .push_back(vec![ColorBlob::new(x, y, size)]);
    }

    fn push_no_blob(&self) {
        self.0.borrow_mut().blobs.push_back(vec![]);
    }

    fn push_ir(&self, readings: &[(&str, i32)]) {
        let map = readings
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        self.0.borrow_mut().ir.push_back(map);
    }

    fn simulated(&self) -> RobotPorts {
        RobotPorts::simulated(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    fn real(&self) -> RobotPorts {
        RobotPorts::real(Box::new(self.clone()), Box::new(self.clone()))
    }
}

impl SensorPort for ScriptedRobot {
    fn read_color_blobs(&mut self) -> Result<Vec<ColorBlob>, TransportError> {
        Ok(self.0.borrow_mut().blobs.pop_front().unwrap_or_default())
    }

    fn read_ir_sensors(&mut self) -> Result<HashMap<String, i32>, TransportError> {
        Ok(self.0.borrow_mut().ir.pop_front().unwrap_or_default())
    }
}

impl ActuatorPort for ScriptedRobot {
    fn move_wheels(&mut self, left: f32, right: f32) -> Result<(), TransportError> {
        let mut s = self.0.borrow_mut();
        if s.fail_move_at == Some(s.wheel_commands.len()) {
            return Err(TransportError::new("move_wheels", "connection lost"));
        }
        s.wheel_commands.push((left, right));
        Ok(())
    }

    fn reset_simulation(&mut self) -> Result<(), TransportError> {
        let mut s = self.0.borrow_mut();
        s.n_sim_resets += 1;
        s.robot = Position::default();
        Ok(())
    }

    fn move_tilt_to(&mut self, tilt: i32, speed: i32) -> Result<(), TransportError> {
        self.0.borrow_mut().tilt = Some((tilt, speed));
        Ok(())
    }
}

impl PosePort for ScriptedRobot {
    fn robot_location(&mut self) -> Result<Position, TransportError> {
        Ok(self.0.borrow().robot)
    }

    fn object_location(&mut self) -> Result<Option<Position>, TransportError> {
        Ok(self.0.borrow().object)
    }

    fn set_object_location(&mut self, position: Position) -> Result<(), TransportError> {
        self.0.borrow_mut().object = Some(position);
        Ok(())
    }

    fn set_robot_location(&mut self, position: Position) -> Result<(), TransportError> {
        self.0.borrow_mut().robot = position;
        Ok(())
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(steps: usize) -> RoboboEnvConfig {
    RoboboEnvConfig::default()
        .steps_per_episode(steps)
        .velocity_bounds(-2.0, 2.0)
        .target_walk_speed(0.0)
        .settle_millis(0)
}

#[test]
fn test_step_requires_reset() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;

    let err = env.step_episode(&RoboboAct::new(1.0, 0.0)).err();
    assert_eq!(err, Some(EnvError::NotReset));
    assert!(robot.0.borrow().wheel_commands.is_empty());
    Ok(())
}

#[test]
fn test_fixed_length_episode() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    for i in 1..=5 {
        let (step, _) = env.step_episode(&RoboboAct::new(0.1, 0.0))?;
        assert_eq!(step.is_terminated, i == 5);
        assert_eq!(step.is_truncated, i == 5);
    }

    let err = env.step_episode(&RoboboAct::new(0.1, 0.0)).err();
    assert_eq!(err, Some(EnvError::EpisodeFinished(5)));
    assert_eq!(robot.0.borrow().wheel_commands.len(), 5);
    assert_eq!(env.history().len(), 0);

    env.reset_episode(None)?;
    assert_eq!(env.history().len(), 1);
    assert_eq!(env.count_steps(), 0);
    Ok(())
}

#[test]
fn test_velocity_stays_in_bounds() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(200), robot.simulated(), 0)?;
    env.reset_episode(None)?;
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..200 {
        let act = RoboboAct::new(rng.f32() * 6.0 - 3.0, rng.f32() * 6.0 - 3.0);
        let (step, record) = env.step_episode(&act)?;
        for v in step.obs.wheel_velocity.iter() {
            assert!((-2.0..=2.0).contains(v));
        }
        assert_eq!(record.get_array1("wheel_velocity")?, step.obs.wheel_velocity.to_vec());
    }
    for (l, r) in robot.0.borrow().wheel_commands.iter() {
        assert!((-2.0..=2.0).contains(l));
        assert!((-2.0..=2.0).contains(r));
    }
    Ok(())
}

#[test]
fn test_action_is_a_velocity_increment() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    env.step_episode(&RoboboAct::new(0.5, 0.25))?;
    env.step_episode(&RoboboAct::new(0.5, 0.0))?;
    assert_eq!(env.velocity(), [1.25, 0.75]);
    assert_eq!(
        robot.0.borrow().wheel_commands,
        vec![(0.75, 0.25), (1.25, 0.75)]
    );

    // Velocity restarts from zero after a reset.
    env.reset_episode(None)?;
    assert_eq!(env.velocity(), [0.0, 0.0]);
    Ok(())
}

#[test]
fn test_invalid_action_is_rejected() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let err = env.step_episode(&RoboboAct::new(f32::NAN, 0.0)).err();
    assert!(matches!(err, Some(EnvError::InvalidAction(_))));
    assert_eq!(env.count_steps(), 0);
    assert!(robot.0.borrow().wheel_commands.is_empty());

    // The episode goes on.
    env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert_eq!(env.count_steps(), 1);
    Ok(())
}

#[test]
fn test_target_xy_stays_in_bounds() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    for (x, y) in [(-40, 500), (250, -7), (50, 50), (0, 100)] {
        robot.push_blob(x, y, 10.0);
        robot.push_no_blob();
    }
    let mut env = RoboboEnv::new(config(10), robot.simulated(), 0)?;
    let obs = env.reset_episode(None)?;
    assert_eq!(obs.target_xy, [0, 100]);

    for _ in 0..10 {
        let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
        for v in step.obs.target_xy.iter() {
            assert!((-1..=101).contains(v));
        }
    }
    Ok(())
}

#[test]
fn test_lost_target_exits_left() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    robot.push_blob(30, 44, 200.0);
    let mut env = RoboboEnv::new(config(8), robot.simulated(), 0)?;

    let obs = env.reset_episode(None)?;
    assert_eq!(obs.target_xy, [30, 44]);
    assert_eq!(obs.provenance, TargetProvenance::Measured);

    for _ in 0..8 {
        let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.3))?;
        assert_eq!(step.obs.target_xy, [-1, 44]);
        assert_eq!(step.obs.provenance, TargetProvenance::Inferred);
        assert_eq!(step.obs.target_size, 0.0);
    }
    Ok(())
}

#[test]
fn test_memory_does_not_cross_episodes() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    robot.push_blob(80, 10, 200.0);
    let mut env = RoboboEnv::new(config(3), robot.simulated(), 0)?;

    env.reset_episode(None)?;
    let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert_eq!(step.obs.target_xy, [101, 10]);

    let obs = env.reset_episode(None)?;
    assert_eq!(obs.target_xy, [-1, -1]);
    assert_eq!(obs.provenance, TargetProvenance::Unknown);
    Ok(())
}

#[test]
fn test_never_visible_episode() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let mut rewards = vec![];
    for _ in 0..5 {
        let (step, record) = env.step_episode(&RoboboAct::new(0.2, 0.0))?;
        assert_eq!(step.info.reward.lost, -100.0);
        assert_eq!(step.info.reward.centering, 0.0);
        assert_eq!(step.info.reward.size, 0.0);
        assert_eq!(step.info.reward.distance, 0.0);
        assert_eq!(record.get_scalar("reward_lost")?, -100.0);
        assert!(step.reward < 0.0);
        rewards.push(step.reward);
    }

    env.reset_episode(None)?;
    let episode = env.history().iter_episodes().next().unwrap();
    assert_eq!(episode.len(), 5);
    assert_eq!(episode.rewards(), &rewards[..]);
    assert!(episode.rewards().iter().all(|r| *r < 0.0));
    Ok(())
}

#[test]
fn test_reward_uses_observation_after_action() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    // Reset reading: not visible. Step reading: centered.
    robot.push_no_blob();
    robot.push_blob(50, 50, 100.0);
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert_eq!(step.info.reward.centering, 20.0);
    assert_eq!(step.info.reward.lost, 0.0);
    Ok(())
}

#[test]
fn test_obstacle_penalty_while_searching() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    robot.push_ir(&[]);
    robot.push_ir(&[("Back-C", 150), ("Front-L", 300)]);
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    // back 50 * 0.3 + inner 200 * 0.25 + collision 20
    assert!((step.info.reward.obstacle + 85.0).abs() < 1e-4);
    Ok(())
}

#[test]
fn test_head_on_wall_while_searching() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    robot.push_ir(&[]);
    robot.push_ir(&[("Front-C", 2000)]);
    let axial = config(5).ir_layout(IrLayout::Axial);
    let mut env = RoboboEnv::new(axial, robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let (step, _) = env.step_episode(&RoboboAct::new(1.0, 0.0))?;
    assert_eq!(step.obs.provenance, TargetProvenance::Unknown);
    // front 1900 * 0.3
    assert!((step.info.reward.obstacle + 570.0).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_bounds_must_contain_rest() -> Result<()> {
    let robot = ScriptedRobot::new();
    let positive = config(5).velocity_bounds(1.0, 2.0);
    let err = RoboboEnv::new(positive, robot.simulated(), 0).err();
    assert!(matches!(err, Some(EnvError::Config(_))));

    let forward_only = config(5).velocity_bounds(0.0, 2.0);
    let mut env = RoboboEnv::new(forward_only, robot.simulated(), 0)?;
    let obs = env.reset_episode(None)?;
    assert_eq!(obs.wheel_velocity, [0.0, 0.0]);
    Ok(())
}

#[test]
fn test_reset_twice_records_nothing() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(3), robot.simulated(), 0)?;

    env.reset_episode(None)?;
    env.reset_episode(None)?;
    assert!(env.history().is_empty());

    env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    env.reset_episode(None)?;
    env.reset_episode(None)?;
    assert_eq!(env.history().len(), 1);
    assert_eq!(robot.0.borrow().n_sim_resets, 4);
    Ok(())
}

#[test]
fn test_history_round_trip() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    for x in [50, 10, 90, 52] {
        robot.push_blob(x, 50, 100.0);
    }
    let mut env = RoboboEnv::new(config(4), robot.simulated(), 0)?;
    env.reset_episode(None)?;

    let mut rewards = vec![];
    let mut robot_positions = vec![];
    for i in 0..4 {
        robot.0.borrow_mut().robot = Position::new(i as f32, 0.0, -(i as f32));
        let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
        rewards.push(step.reward);
        robot_positions.push([i as f32, -(i as f32)]);
    }
    assert!(env.history().is_empty());

    env.reset_episode(None)?;
    let episode = env.history().iter_episodes().next().unwrap();
    assert_eq!(episode.rewards(), &rewards[..]);
    assert_eq!(episode.robot_trajectory(), &robot_positions[..]);
    assert!(episode
        .target_trajectory()
        .iter()
        .all(|p| *p == [100.0, 0.0]));
    Ok(())
}

#[test]
fn test_transport_failure_aborts_episode() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let mut env = RoboboEnv::new(config(5), robot.simulated(), 0)?;

    env.reset_episode(None)?;
    for _ in 0..5 {
        env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    }
    env.reset_episode(None)?;
    let first = env.history().clone();

    robot.0.borrow_mut().fail_move_at = Some(7);
    env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    let err = env.step_episode(&RoboboAct::new(0.0, 0.0)).err();
    assert!(matches!(err, Some(EnvError::Transport(_))));
    assert_eq!(env.count_steps(), 2);
    assert_eq!(env.history(), &first);

    let err = env.step_episode(&RoboboAct::new(0.0, 0.0)).err();
    assert_eq!(err, Some(EnvError::EpisodeFinished(2)));

    robot.0.borrow_mut().fail_move_at = None;
    env.reset_episode(None)?;
    let lengths: Vec<usize> = env.history().iter_episodes().map(|e| e.len()).collect();
    assert_eq!(lengths, vec![5, 2]);
    Ok(())
}

#[test]
fn test_simulation_requires_pose_port() {
    init_logger();
    let robot = ScriptedRobot::new();
    let err = RoboboEnv::new(config(5), robot.real(), 0).err();
    assert!(matches!(err, Some(EnvError::Config(_))));

    assert!(RoboboEnv::new(config(5).real_world(true), robot.real(), 0).is_ok());
    assert!(RoboboEnv::new(config(0), robot.simulated(), 0).is_err());
}

#[test]
fn test_real_world_mode() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    robot.push_no_blob();
    robot.push_blob(50, 50, 5000.0);
    let mut env = RoboboEnv::new(config(5).real_world(true), robot.real(), 0)?;

    env.reset_episode(None)?;
    assert_eq!(robot.0.borrow().n_sim_resets, 0);

    let (step, record) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert_eq!(step.info.distance, 1.0);
    assert_eq!(record.get_scalar("distance")?, 1.0);

    let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert_eq!(step.info.distance, 100.0);

    env.finish();
    let episode = env.history().iter_episodes().next().unwrap();
    assert!(episode.robot_trajectory().iter().all(|p| *p == [0.0, 0.0]));
    assert_eq!(robot.0.borrow().object, Some(Position::new(100.0, 0.0, 0.0)));
    Ok(())
}

#[test]
fn test_reset_applies_pose_and_tilt() -> Result<()> {
    init_logger();
    let robot = ScriptedRobot::new();
    let config = config(5)
        .initial_pose(Some(Position::new(-200.0, 1.0, 300.0)))
        .camera_tilt(Some(CameraTilt {
            tilt: 105,
            speed: 5,
        }));
    let mut env = RoboboEnv::new(config, robot.simulated(), 0)?;

    env.reset_episode(None)?;
    assert_eq!(robot.0.borrow().robot, Position::new(-200.0, 1.0, 300.0));
    assert_eq!(robot.0.borrow().tilt, Some((105, 5)));

    let (step, _) = env.step_episode(&RoboboAct::new(0.0, 0.0))?;
    assert!((step.info.distance - 300.0f32.hypot(300.0)).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_seeded_random_walk() -> Result<()> {
    init_logger();
    let walk = |seed: u64| -> Result<Vec<[f32; 2]>> {
        let robot = ScriptedRobot::new();
        let mut env = RoboboEnv::new(config(6).target_walk_speed(20.0), robot.simulated(), 0)?;
        env.reset_episode(Some(seed))?;
        let mut targets = vec![];
        for _ in 0..6 {
            env.step_episode(&RoboboAct::new(0.0, 0.0))?;
            let p = robot.0.borrow().object.unwrap();
            targets.push([p.x, p.z]);
        }
        Ok(targets)
    };

    let a = walk(3)?;
    assert_eq!(a, walk(3)?);

    let mut prev = [100.0, 0.0];
    for p in a.iter() {
        assert_eq!((p[0] - prev[0]).abs(), 20.0);
        assert_eq!((p[1] - prev[1]).abs(), 20.0);
        prev = *p;
    }
    Ok(())
}
