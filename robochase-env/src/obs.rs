//! Observation of [`RoboboEnv`](crate::RoboboEnv).
use crate::{IrChannel, IrLayout};
use robochase_core::Obs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the target position of an observation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetProvenance {
    /// Measured by the camera in this step.
    Measured,

    /// Not visible; the exit direction was inferred from the last measurement.
    Inferred,

    /// Not visible and never measured in this episode.
    Unknown,
}

impl TargetProvenance {
    /// Numeric code used in the feature vector.
    pub fn code(&self) -> f32 {
        match self {
            TargetProvenance::Measured => 1.0,
            TargetProvenance::Inferred => 0.0,
            TargetProvenance::Unknown => -1.0,
        }
    }
}

/// Infrared intensities, indexed by [`IrChannel::index`].
///
/// Readings are non-negative; a channel without reading holds `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IrReadings([i32; 6]);

impl IrReadings {
    /// Builds readings from a map keyed by sensor name.
    ///
    /// Only channels of `layout` are taken, missing ones and negative
    /// intensities become `0`.
    pub fn from_sensor_map(map: &HashMap<String, i32>, layout: IrLayout) -> Self {
        let mut values = [0; 6];
        for ch in layout.channels() {
            if let Some(v) = map.get(ch.sensor_name()) {
                values[ch.index()] = (*v).max(0);
            }
        }
        Self(values)
    }

    /// Builds readings from values ordered as [`IrChannel::ALL`].
    pub fn from_values(values: [i32; 6]) -> Self {
        Self(values.map(|v| v.max(0)))
    }

    /// Intensity of a channel.
    pub fn get(&self, channel: IrChannel) -> i32 {
        self.0[channel.index()]
    }

    /// Front center intensity.
    pub fn front(&self) -> i32 {
        self.get(IrChannel::FrontC)
    }

    /// Back center intensity.
    pub fn back(&self) -> i32 {
        self.get(IrChannel::BackC)
    }
}

/// Observation of [`RoboboEnv`](crate::RoboboEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoboboObs {
    /// Target position in percent of the frame.
    ///
    /// `0..=100` when measured, `-1` or `101` when inferred to have left the
    /// frame, `(-1, -1)` when never seen.
    pub target_xy: [i32; 2],

    /// Origin of `target_xy`.
    pub provenance: TargetProvenance,

    /// Blob area, `0` when the target is not measured.
    pub target_size: f32,

    /// Infrared intensities.
    pub ir: IrReadings,

    /// Commanded wheel velocities `[left, right]`.
    pub wheel_velocity: [f32; 2],

    /// Channels of `ir` exported by [`RoboboObs::to_features`].
    pub ir_layout: IrLayout,
}

impl RoboboObs {
    /// Returns `true` if the target was measured in this step.
    pub fn is_target_visible(&self) -> bool {
        self.provenance == TargetProvenance::Measured
    }

    /// Flattens the observation.
    ///
    /// The layout is `[x, y, size, ir..., v_left, v_right, provenance]`, where
    /// `ir` holds the channels of the infrared layout in [`IrChannel::ALL`]
    /// order.
    pub fn to_features(&self) -> Vec<f32> {
        let mut v = Vec::with_capacity(self.len());
        v.push(self.target_xy[0] as f32);
        v.push(self.target_xy[1] as f32);
        v.push(self.target_size);
        v.extend(self.ir_layout.channels().iter().map(|ch| self.ir.get(*ch) as f32));
        v.extend_from_slice(&self.wheel_velocity);
        v.push(self.provenance.code());
        v
    }
}

impl Obs for RoboboObs {
    fn len(&self) -> usize {
        3 + self.ir_layout.channels().len() + 2 + 1
    }
}
