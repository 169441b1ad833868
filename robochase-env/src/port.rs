//! Capability interfaces to the robot and simulator.
//!
//! [`RoboboEnv`](crate::RoboboEnv) never talks to a transport directly. Each
//! collaborator is injected as a narrow port:
//!
//! * [`SensorPort`] - camera color blobs and infrared proximity sensors.
//! * [`ActuatorPort`] - wheel commands, camera tilt and scene reset.
//! * [`PosePort`] - ground-truth poses, available only in simulation.
use crate::TransportError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A color-segmented region reported by the robot camera.
///
/// `x` and `y` are the centroid as a percentage of the frame, `size` is the
/// area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBlob {
    /// Horizontal centroid, `0..=100`.
    pub x: i32,

    /// Vertical centroid, `0..=100`.
    pub y: i32,

    /// Area of the blob in pixels.
    pub size: f32,
}

impl ColorBlob {
    /// Constructs a [`ColorBlob`].
    pub fn new(x: i32, y: i32, size: f32) -> Self {
        Self { x, y, size }
    }
}

/// Infrared proximity channels of the robot base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrChannel {
    /// Center front sensor.
    FrontC,

    /// Center back sensor.
    BackC,

    /// Outer left front sensor.
    FrontLL,

    /// Inner left front sensor.
    FrontL,

    /// Outer right front sensor.
    FrontRR,

    /// Inner right front sensor.
    FrontR,
}

impl IrChannel {
    /// All channels, in the order they appear in [`IrReadings`](crate::IrReadings).
    pub const ALL: [IrChannel; 6] = [
        IrChannel::FrontC,
        IrChannel::BackC,
        IrChannel::FrontLL,
        IrChannel::FrontL,
        IrChannel::FrontRR,
        IrChannel::FrontR,
    ];

    /// Name of the sensor as reported by the robot.
    pub fn sensor_name(&self) -> &'static str {
        match self {
            IrChannel::FrontC => "Front-C",
            IrChannel::BackC => "Back-C",
            IrChannel::FrontLL => "Front-LL",
            IrChannel::FrontL => "Front-L",
            IrChannel::FrontRR => "Front-RR",
            IrChannel::FrontR => "Front-R",
        }
    }

    /// Index of the channel in [`IrChannel::ALL`].
    pub fn index(&self) -> usize {
        match self {
            IrChannel::FrontC => 0,
            IrChannel::BackC => 1,
            IrChannel::FrontLL => 2,
            IrChannel::FrontL => 3,
            IrChannel::FrontRR => 4,
            IrChannel::FrontR => 5,
        }
    }
}

/// A position in simulator coordinates. `y` is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Lateral axis.
    pub x: f32,

    /// Vertical axis.
    pub y: f32,

    /// Depth axis.
    pub z: f32,
}

impl Position {
    /// Constructs a [`Position`].
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Projection on the ground plane, `[x, z]`.
    pub fn ground(&self) -> [f32; 2] {
        [self.x, self.z]
    }
}

/// Camera and proximity sensors.
pub trait SensorPort {
    /// Returns the color blobs currently detected, possibly none.
    fn read_color_blobs(&mut self) -> Result<Vec<ColorBlob>, TransportError>;

    /// Returns the infrared intensities keyed by sensor name.
    ///
    /// An empty map means the robot returned no readings.
    fn read_ir_sensors(&mut self) -> Result<HashMap<String, i32>, TransportError>;
}

/// Motors of the robot and scene control.
pub trait ActuatorPort {
    /// Sets the speed of both wheels.
    fn move_wheels(&mut self, left: f32, right: f32) -> Result<(), TransportError>;

    /// Restores the initial scene. Only called in simulation.
    fn reset_simulation(&mut self) -> Result<(), TransportError>;

    /// Moves the camera tilt. Robots without a tilt unit may ignore it.
    fn move_tilt_to(&mut self, _tilt: i32, _speed: i32) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Ground-truth poses of the simulator.
pub trait PosePort {
    /// Location of the robot.
    fn robot_location(&mut self) -> Result<Position, TransportError>;

    /// Location of the target object, `None` if the scene has no object.
    fn object_location(&mut self) -> Result<Option<Position>, TransportError>;

    /// Moves the target object.
    fn set_object_location(&mut self, position: Position) -> Result<(), TransportError>;

    /// Moves the robot.
    fn set_robot_location(&mut self, position: Position) -> Result<(), TransportError>;
}

/// The set of ports injected into [`RoboboEnv`](crate::RoboboEnv).
pub struct RobotPorts {
    /// Camera and proximity sensors.
    pub sensors: Box<dyn SensorPort>,

    /// Motors and scene control.
    pub actuator: Box<dyn ActuatorPort>,

    /// Ground-truth poses; `None` on a real robot.
    pub pose: Option<Box<dyn PosePort>>,
}

impl RobotPorts {
    /// Ports of a real robot, without ground-truth poses.
    pub fn real(sensors: Box<dyn SensorPort>, actuator: Box<dyn ActuatorPort>) -> Self {
        Self {
            sensors,
            actuator,
            pose: None,
        }
    }

    /// Ports of a simulated robot.
    pub fn simulated(
        sensors: Box<dyn SensorPort>,
        actuator: Box<dyn ActuatorPort>,
        pose: Box<dyn PosePort>,
    ) -> Self {
        Self {
            sensors,
            actuator,
            pose: Some(pose),
        }
    }
}
