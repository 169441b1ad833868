//! A small kinematic simulator of the chase arena.
//!
//! [`KinematicWorld`] models a differential-drive robot and a cylindrical
//! target in a square arena. It implements [`SensorPort`], [`ActuatorPort`]
//! and [`PosePort`], so it can stand in for the robot simulator in examples
//! and tests:
//!
//! ```
//! use robochase_env::{KinematicWorld, KinematicWorldConfig, RoboboEnv, RoboboEnvConfig};
//!
//! let world = KinematicWorld::new(KinematicWorldConfig::default());
//! let config = RoboboEnvConfig::default().settle_millis(0);
//! let env = RoboboEnv::new(config, world.ports(), 42).unwrap();
//! assert_eq!(env.count_steps(), 0);
//! ```
//!
//! Ground coordinates are `(x, z)` of the simulator frame. A heading of zero
//! faces `+z` and positive angles turn right, towards `+x`.
use crate::{
    ActuatorPort, ColorBlob, IrChannel, PosePort, Position, RobotPorts, SensorPort,
    TransportError, EPSILON,
};
use log::trace;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::HashMap, f32::consts::PI, rc::Rc};

type Point = na::Point2<f32>;
type Vector = na::Vector2<f32>;

/// Parameters of [`KinematicWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicWorldConfig {
    /// The arena spans `[-half_extent, half_extent]` on both ground axes.
    pub half_extent: f32,

    /// Distance between the wheels.
    pub wheel_base: f32,

    /// Ground distance covered per tick at a wheel speed of `1`.
    pub speed_scale: f32,

    /// Horizontal field of view of the camera in degrees.
    pub fov_degrees: f32,

    /// Blob area at unit distance.
    pub size_gain: f32,

    /// Radius of the target.
    pub target_radius: f32,

    /// Maximum range of the infrared sensors.
    pub ir_range: f32,

    /// Infrared intensity at unit distance.
    pub ir_gain: f32,

    /// Initial robot position.
    pub robot_start: Position,

    /// Initial robot heading in degrees.
    pub robot_heading_degrees: f32,

    /// Initial target position.
    pub target_start: Position,
}

impl Default for KinematicWorldConfig {
    fn default() -> Self {
        Self {
            half_extent: 1000.0,
            wheel_base: 10.0,
            speed_scale: 5.0,
            fov_degrees: 60.0,
            size_gain: 5.0e6,
            target_radius: 20.0,
            ir_range: 200.0,
            ir_gain: 20000.0,
            robot_start: Position::new(0.0, 0.0, 0.0),
            robot_heading_degrees: 0.0,
            target_start: Position::new(0.0, 0.0, 400.0),
        }
    }
}

/// Angles of the infrared sensors relative to the heading, in degrees.
fn ir_angle(channel: IrChannel) -> f32 {
    match channel {
        IrChannel::FrontC => 0.0,
        IrChannel::BackC => 180.0,
        IrChannel::FrontLL => -45.0,
        IrChannel::FrontL => -20.0,
        IrChannel::FrontRR => 45.0,
        IrChannel::FrontR => 20.0,
    }
}

#[derive(Debug, Clone)]
struct World {
    robot: Point,
    heading: f32,
    robot_y: f32,
    target: Point,
    target_y: f32,
    tilt: i32,
}

impl World {
    fn initial(config: &KinematicWorldConfig) -> Self {
        Self {
            robot: Point::new(config.robot_start.x, config.robot_start.z),
            heading: config.robot_heading_degrees.to_radians(),
            robot_y: config.robot_start.y,
            target: Point::new(config.target_start.x, config.target_start.z),
            target_y: config.target_start.y,
            tilt: 0,
        }
    }

    fn forward(&self) -> Vector {
        Vector::new(self.heading.sin(), self.heading.cos())
    }

    fn right(&self) -> Vector {
        Vector::new(self.heading.cos(), -self.heading.sin())
    }
}

/// Distance along a ray to the first wall of the arena.
fn wall_hit(origin: &Point, dir: &Vector, half: f32) -> f32 {
    let mut t = f32::INFINITY;
    for axis in 0..2 {
        let d = dir[axis];
        if d > EPSILON {
            t = t.min((half - origin[axis]) / d);
        } else if d < -EPSILON {
            t = t.min((-half - origin[axis]) / d);
        }
    }
    t.max(0.0)
}

/// Distance along a ray to a circle, if the ray hits it.
fn circle_hit(origin: &Point, dir: &Vector, center: &Point, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t >= 0.0 {
        Some(t)
    } else if c <= 0.0 {
        // Origin inside the circle.
        Some(0.0)
    } else {
        None
    }
}

/// Shared handle to a simulated arena.
///
/// Clones refer to the same world.
#[derive(Debug, Clone)]
pub struct KinematicWorld {
    config: Rc<KinematicWorldConfig>,
    world: Rc<RefCell<World>>,
}

impl KinematicWorld {
    /// Constructs a world in its initial state.
    pub fn new(config: KinematicWorldConfig) -> Self {
        let world = World::initial(&config);
        Self {
            config: Rc::new(config),
            world: Rc::new(RefCell::new(world)),
        }
    }

    /// Ports of a simulated robot, all backed by this world.
    pub fn ports(&self) -> RobotPorts {
        RobotPorts::simulated(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    /// Robot heading in radians.
    pub fn heading(&self) -> f32 {
        self.world.borrow().heading
    }

    /// Last commanded camera tilt.
    pub fn tilt(&self) -> i32 {
        self.world.borrow().tilt
    }

    fn clamp_to_arena(&self, p: Point) -> Point {
        let h = self.config.half_extent;
        Point::new(p.x.clamp(-h, h), p.y.clamp(-h, h))
    }

    fn ir_reading(&self, world: &World, channel: IrChannel) -> i32 {
        let angle = world.heading + ir_angle(channel).to_radians();
        let dir = Vector::new(angle.sin(), angle.cos());

        let mut d = wall_hit(&world.robot, &dir, self.config.half_extent);
        if let Some(t) = circle_hit(&world.robot, &dir, &world.target, self.config.target_radius) {
            d = d.min(t);
        }

        if d > self.config.ir_range {
            0
        } else {
            (self.config.ir_gain / d.max(1.0)).round() as i32
        }
    }
}

impl SensorPort for KinematicWorld {
    fn read_color_blobs(&mut self) -> Result<Vec<ColorBlob>, TransportError> {
        let world = self.world.borrow();
        let rel = world.target - world.robot;
        let ahead = rel.dot(&world.forward());
        let bearing = rel.dot(&world.right()).atan2(ahead);
        let half_fov = (0.5 * self.config.fov_degrees).to_radians();

        if ahead <= 0.0 || bearing.abs() > half_fov {
            return Ok(vec![]);
        }

        let x = (50.0 + 50.0 * bearing / half_fov).round() as i32;
        let d = rel.norm().max(EPSILON);
        let size = self.config.size_gain / (d * d);
        trace!("Target at bearing {:.3} rad, distance {:.1}", bearing, d);

        Ok(vec![ColorBlob::new(x.clamp(0, 100), 50, size)])
    }

    fn read_ir_sensors(&mut self) -> Result<HashMap<String, i32>, TransportError> {
        let world = self.world.borrow();
        Ok(IrChannel::ALL
            .iter()
            .map(|ch| (ch.sensor_name().to_string(), self.ir_reading(&world, *ch)))
            .collect())
    }
}

impl ActuatorPort for KinematicWorld {
    /// Integrates one tick of differential-drive motion.
    fn move_wheels(&mut self, left: f32, right: f32) -> Result<(), TransportError> {
        if !left.is_finite() || !right.is_finite() {
            return Err(TransportError::new(
                "move_wheels",
                format!("non-finite wheel speed ({}, {})", left, right),
            ));
        }

        let s = self.config.speed_scale;
        let v = 0.5 * (left + right) * s;
        let omega = (left - right) * s / self.config.wheel_base.max(EPSILON);

        let mut world = self.world.borrow_mut();
        // Midpoint heading for the translation.
        let mid = world.heading + 0.5 * omega;
        let step = Vector::new(mid.sin(), mid.cos()) * v;
        let robot = world.robot + step;
        world.robot = self.clamp_to_arena(robot);
        world.heading = (world.heading + omega).rem_euclid(2.0 * PI);
        Ok(())
    }

    fn reset_simulation(&mut self) -> Result<(), TransportError> {
        *self.world.borrow_mut() = World::initial(&self.config);
        Ok(())
    }

    fn move_tilt_to(&mut self, tilt: i32, _speed: i32) -> Result<(), TransportError> {
        self.world.borrow_mut().tilt = tilt;
        Ok(())
    }
}

impl PosePort for KinematicWorld {
    fn robot_location(&mut self) -> Result<Position, TransportError> {
        let world = self.world.borrow();
        Ok(Position::new(world.robot.x, world.robot_y, world.robot.y))
    }

    fn object_location(&mut self) -> Result<Option<Position>, TransportError> {
        let world = self.world.borrow();
        Ok(Some(Position::new(
            world.target.x,
            world.target_y,
            world.target.y,
        )))
    }

    fn set_object_location(&mut self, position: Position) -> Result<(), TransportError> {
        let p = self.clamp_to_arena(Point::new(position.x, position.z));
        let mut world = self.world.borrow_mut();
        world.target = p;
        world.target_y = position.y;
        Ok(())
    }

    fn set_robot_location(&mut self, position: Position) -> Result<(), TransportError> {
        let p = self.clamp_to_arena(Point::new(position.x, position.z));
        let mut world = self.world.borrow_mut();
        world.robot = p;
        world.robot_y = position.y;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn world() -> KinematicWorld {
        KinematicWorld::new(KinematicWorldConfig::default())
    }

    #[test]
    fn test_target_ahead_is_centered() {
        let mut w = world();
        let blobs = w.read_color_blobs().unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].x, 50);
        assert!((blobs[0].size - 5.0e6 / 160000.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_on_the_right() {
        let mut w = world();
        w.set_object_location(Position::new(100.0, 0.0, 400.0))
            .unwrap();
        assert!(w.read_color_blobs().unwrap()[0].x > 50);

        w.set_object_location(Position::new(-100.0, 0.0, 400.0))
            .unwrap();
        assert!(w.read_color_blobs().unwrap()[0].x < 50);

        // Behind the robot.
        w.set_object_location(Position::new(0.0, 0.0, -400.0))
            .unwrap();
        assert!(w.read_color_blobs().unwrap().is_empty());
    }

    #[test]
    fn test_differential_drive() {
        let mut w = world();
        w.move_wheels(2.0, 2.0).unwrap();
        let p = w.robot_location().unwrap();
        assert!(p.x.abs() < 1e-4);
        assert!((p.z - 10.0).abs() < 1e-4);

        // Left wheel faster turns right.
        w.move_wheels(1.0, -1.0).unwrap();
        let h = w.heading();
        assert!(h > 0.0 && h < PI);

        w.reset_simulation().unwrap();
        assert_eq!(w.robot_location().unwrap(), Position::new(0.0, 0.0, 0.0));
        assert_eq!(w.heading(), 0.0);
    }

    #[test]
    fn test_robot_stays_in_arena() {
        let mut w = world();
        for _ in 0..1000 {
            w.move_wheels(15.0, 15.0).unwrap();
        }
        let p = w.robot_location().unwrap();
        assert!(p.z <= 1000.0);
    }

    #[test]
    fn test_ir_sees_target_and_walls() {
        let mut w = world();
        let ir = w.read_ir_sensors().unwrap();
        assert_eq!(ir["Front-C"], 0);

        // Target 100 ahead: front hit at 80 after the radius.
        w.set_object_location(Position::new(0.0, 0.0, 100.0))
            .unwrap();
        let ir = w.read_ir_sensors().unwrap();
        assert_eq!(ir["Front-C"], 250);
        assert_eq!(ir["Back-C"], 0);

        // Wall 50 behind.
        w.set_robot_location(Position::new(0.0, 0.0, -950.0))
            .unwrap();
        let ir = w.read_ir_sensors().unwrap();
        assert_eq!(ir["Back-C"], 400);
    }
}
